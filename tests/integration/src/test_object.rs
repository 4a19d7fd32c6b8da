//! Object CRUD integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, md5_hex, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_object_with_md5_etag() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "obj").await;

        let put = client
            .put_object()
            .bucket(&bucket)
            .key("hello")
            .body(ByteStream::from_static(b"hi"))
            .send()
            .await
            .expect("put");
        assert_eq!(
            put.e_tag().map(|t| t.trim_matches('"')),
            Some("49f68a5c8493ec2c0bf489821c21fc3b")
        );

        let got = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .send()
            .await
            .expect("get");
        let data = got.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"hi");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_single_byte_range() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "range").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("hello")
            .body(ByteStream::from_static(b"hi"))
            .send()
            .await
            .expect("put");

        let got = client
            .get_object()
            .bucket(&bucket)
            .key("hello")
            .range("bytes=0-0")
            .send()
            .await
            .expect("ranged get");
        assert_eq!(got.content_range(), Some("bytes 0-0/2"));
        let data = got.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"h");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_user_metadata_and_tags() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "meta").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("tagged")
            .body(ByteStream::from_static(b"x"))
            .metadata("purpose", "integration")
            .tagging("team=storage")
            .content_type("text/plain")
            .send()
            .await
            .expect("put");

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("tagged")
            .send()
            .await
            .expect("head");
        assert_eq!(
            head.metadata().and_then(|m| m.get("purpose")).map(String::as_str),
            Some("integration")
        );
        assert_eq!(head.content_type(), Some("text/plain"));

        let tags = client
            .get_object_tagging()
            .bucket(&bucket)
            .key("tagged")
            .send()
            .await
            .expect("tagging");
        assert_eq!(tags.tag_set().len(), 1);
        assert_eq!(tags.tag_set()[0].key(), "team");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_object_between_keys() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "copy").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("src")
            .body(ByteStream::from_static(b"payload"))
            .send()
            .await
            .expect("put");

        let copy = client
            .copy_object()
            .bucket(&bucket)
            .key("dst")
            .copy_source(format!("{bucket}/src"))
            .send()
            .await
            .expect("copy");
        assert_eq!(
            copy.copy_object_result()
                .and_then(|r| r.e_tag())
                .map(|t| t.trim_matches('"').to_owned()),
            Some(md5_hex(b"payload"))
        );

        let got = client
            .get_object()
            .bucket(&bucket)
            .key("dst")
            .send()
            .await
            .expect("get copy");
        let data = got.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"payload");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_missing_key_without_error() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "del").await;

        // DeleteObject on a missing key answers 204 every time.
        for _ in 0..2 {
            client
                .delete_object()
                .bucket(&bucket)
                .key("never-existed")
                .send()
                .await
                .expect("delete");
        }

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_store_keys_with_awkward_characters() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "keys").await;

        let key = "dir with spaces/uni\u{00e7}ode \u{1F980}/file?.txt";
        client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .body(ByteStream::from_static(b"ok"))
            .send()
            .await
            .expect("put");

        let got = client
            .get_object()
            .bucket(&bucket)
            .key(key)
            .send()
            .await
            .expect("get");
        let data = got.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"ok");

        cleanup_bucket(&client, &bucket).await;
    }
}
