//! Conditional request integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn put_hello(client: &aws_sdk_s3::Client, bucket: &str) -> String {
        let put = client
            .put_object()
            .bucket(bucket)
            .key("hello")
            .body(ByteStream::from_static(b"hi"))
            .send()
            .await
            .expect("put");
        put.e_tag().expect("etag").to_owned()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_honor_if_match() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "ifmatch").await;
        let etag = put_hello(&client, &bucket).await;

        client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .if_match(&etag)
            .send()
            .await
            .expect("matching If-Match");

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .if_match("\"0000000000000000000000000000dead\"")
            .send()
            .await
            .expect_err("stale If-Match");
        // 412 Precondition Failed.
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(412)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_304_for_if_none_match() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "inm").await;
        let etag = put_hello(&client, &bucket).await;

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .if_none_match(&etag)
            .send()
            .await
            .expect_err("unchanged object");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(304)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_304_for_if_modified_since_in_future() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "ims").await;
        put_hello(&client, &bucket).await;

        let future =
            aws_sdk_s3::primitives::DateTime::from_secs(chrono_now_secs() + 3600);
        let err = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .if_modified_since(future)
            .send()
            .await
            .expect_err("not modified since the future");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(304)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    fn chrono_now_secs() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}
