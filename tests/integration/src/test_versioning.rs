//! Versioning integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::{BucketVersioningStatus, VersioningConfiguration};

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn enable_versioning(client: &aws_sdk_s3::Client, bucket: &str) {
        client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .expect("enable versioning");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_keep_old_versions_and_insert_delete_marker() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "ver").await;
        enable_versioning(&client, &bucket).await;

        let v1 = client
            .put_object()
            .bucket(&bucket)
            .key("k")
            .body(ByteStream::from_static(b"A"))
            .send()
            .await
            .expect("put A")
            .version_id()
            .expect("version id")
            .to_owned();
        client
            .put_object()
            .bucket(&bucket)
            .key("k")
            .body(ByteStream::from_static(b"B"))
            .send()
            .await
            .expect("put B");

        // Current read returns the second body.
        let current = client
            .get_object()
            .bucket(&bucket)
            .key("k")
            .send()
            .await
            .expect("get current");
        let data = current.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"B");

        // Delete inserts a marker; the current read now 404s.
        let deleted = client
            .delete_object()
            .bucket(&bucket)
            .key("k")
            .send()
            .await
            .expect("delete");
        assert_eq!(deleted.delete_marker(), Some(true));

        let err = client
            .get_object()
            .bucket(&bucket)
            .key("k")
            .send()
            .await
            .expect_err("current is deleted");
        assert!(err.into_service_error().is_no_such_key());

        // The first version is still reachable by id.
        let old = client
            .get_object()
            .bucket(&bucket)
            .key("k")
            .version_id(&v1)
            .send()
            .await
            .expect("get v1");
        let data = old.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"A");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_versions_newest_first() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "vlist").await;
        enable_versioning(&client, &bucket).await;

        let mut ids = Vec::new();
        for body in [&b"one"[..], b"two", b"three"] {
            let put = client
                .put_object()
                .bucket(&bucket)
                .key("k")
                .body(ByteStream::from(body.to_vec()))
                .send()
                .await
                .expect("put");
            ids.push(put.version_id().expect("version id").to_owned());
        }

        let listing = client
            .list_object_versions()
            .bucket(&bucket)
            .send()
            .await
            .expect("list versions");
        let listed: Vec<_> = listing
            .versions()
            .iter()
            .filter_map(|v| v.version_id())
            .map(ToOwned::to_owned)
            .collect();
        let expected: Vec<_> = ids.iter().rev().cloned().collect();
        assert_eq!(listed, expected);
        assert_eq!(listing.versions()[0].is_latest(), Some(true));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_versioning_status_round_trip() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "vstatus").await;

        let before = client
            .get_bucket_versioning()
            .bucket(&bucket)
            .send()
            .await
            .expect("get");
        assert!(before.status().is_none());

        enable_versioning(&client, &bucket).await;
        let after = client
            .get_bucket_versioning()
            .bucket(&bucket)
            .send()
            .await
            .expect("get");
        assert_eq!(after.status(), Some(&BucketVersioningStatus::Enabled));

        cleanup_bucket(&client, &bucket).await;
    }
}
