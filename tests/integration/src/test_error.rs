//! Error envelope integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_no_such_bucket() {
        let client = s3_client();
        let missing = test_bucket_name("missing");
        let err = client
            .get_object()
            .bucket(&missing)
            .key("anything")
            .send()
            .await
            .expect_err("missing bucket");
        assert!(err.into_service_error().to_string().contains("NoSuchBucket"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_no_such_key() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "nokey").await;

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("absent")
            .send()
            .await
            .expect_err("missing key");
        assert!(err.into_service_error().is_no_such_key());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_416_for_unsatisfiable_range() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "badrange").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("short")
            .body(ByteStream::from_static(b"xy"))
            .send()
            .await
            .expect("put");

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("short")
            .range("bytes=100-200")
            .send()
            .await
            .expect_err("unsatisfiable range");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(416)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_kms_key() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "kms").await;

        let err = client
            .put_object()
            .bucket(&bucket)
            .key("secret")
            .body(ByteStream::from_static(b"x"))
            .server_side_encryption(aws_sdk_s3::types::ServerSideEncryption::AwsKms)
            .ssekms_key_id("key-that-does-not-exist")
            .send()
            .await
            .expect_err("unknown KMS key");
        let service_err = err.into_service_error();
        assert!(
            service_err.to_string().contains("KMS.NotFoundException")
                || service_err
                    .meta()
                    .code()
                    .is_some_and(|c| c == "KMS.NotFoundException"),
            "unexpected error: {service_err}"
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_bad_content_md5() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "digest").await;

        // MD5 of a different body.
        let err = client
            .put_object()
            .bucket(&bucket)
            .key("mismatch")
            .body(ByteStream::from_static(b"actual body"))
            .content_md5("rL0Y20zC+Fzt72VPzMSk2A==")
            .send()
            .await
            .expect_err("digest mismatch");
        assert!(err.into_service_error().to_string().contains("BadDigest"));

        cleanup_bucket(&client, &bucket).await;
    }
}
