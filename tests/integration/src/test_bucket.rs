//! Bucket lifecycle integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_list_and_delete_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "lifecycle").await;

        let listing = client.list_buckets().send().await.expect("list");
        assert!(
            listing.buckets().iter().any(|b| b.name() == Some(&bucket)),
            "created bucket must appear in ListBuckets"
        );

        client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete");

        let listing = client.list_buckets().send().await.expect("list");
        assert!(
            !listing.buckets().iter().any(|b| b.name() == Some(&bucket)),
            "deleted bucket must disappear from ListBuckets"
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_bucket_name() {
        let client = s3_client();
        let err = client
            .create_bucket()
            .bucket("UPPER_CASE")
            .send()
            .await
            .expect_err("invalid name");
        let service_err = err.into_service_error();
        assert!(service_err.to_string().contains("InvalidBucketName"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_deleting_bucket_with_objects() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "full").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("blocker")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put");

        let err = client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("bucket not empty");
        assert!(err.into_service_error().to_string().contains("BucketNotEmpty"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_bucket_on_head() {
        let client = s3_client();
        let missing = test_bucket_name("ghost");
        let err = client
            .head_bucket()
            .bucket(&missing)
            .send()
            .await
            .expect_err("missing bucket");
        assert_eq!(
            err.into_service_error().meta().code(),
            None, // HEAD has no body; the SDK reports only the 404 status.
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_bucket_tagging() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "btags").await;

        let tagging = aws_sdk_s3::types::Tagging::builder()
            .tag_set(
                aws_sdk_s3::types::Tag::builder()
                    .key("env")
                    .value("test")
                    .build()
                    .expect("tag"),
            )
            .build()
            .expect("tagging");
        client
            .put_bucket_tagging()
            .bucket(&bucket)
            .tagging(tagging)
            .send()
            .await
            .expect("put tagging");

        let got = client
            .get_bucket_tagging()
            .bucket(&bucket)
            .send()
            .await
            .expect("get tagging");
        assert_eq!(got.tag_set().len(), 1);
        assert_eq!(got.tag_set()[0].key(), "env");

        cleanup_bucket(&client, &bucket).await;
    }
}
