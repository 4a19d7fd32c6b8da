//! Listing and pagination integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn put_keys(client: &aws_sdk_s3::Client, bucket: &str, keys: &[&str]) {
        for key in keys {
            client
                .put_object()
                .bucket(bucket)
                .key(*key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .unwrap_or_else(|e| panic!("put {key}: {e}"));
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_collapse_common_prefixes_with_delimiter() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delim").await;
        put_keys(&client, &bucket, &["a/b/c.txt"]).await;

        let listing = client
            .list_objects_v2()
            .bucket(&bucket)
            .prefix("a/")
            .delimiter("/")
            .send()
            .await
            .expect("list");
        assert!(listing.contents().is_empty());
        let prefixes: Vec<_> = listing
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .collect();
        assert_eq!(prefixes, ["a/b/"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_page_through_v2_listing_without_overlap() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "pages").await;
        let keys: Vec<String> = (0..7).map(|i| format!("k-{i:02}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        put_keys(&client, &bucket, &refs).await;

        let mut collected = Vec::new();
        let mut token = None;
        loop {
            let mut req = client.list_objects_v2().bucket(&bucket).max_keys(3);
            if let Some(t) = token.take() {
                req = req.continuation_token(t);
            }
            let page = req.send().await.expect("page");
            assert!(page.contents().len() <= 3);
            collected.extend(
                page.contents()
                    .iter()
                    .filter_map(|o| o.key())
                    .map(ToOwned::to_owned),
            );
            if page.is_truncated() == Some(true) {
                token = page.next_continuation_token().map(ToOwned::to_owned);
                assert!(token.is_some(), "truncated page must carry a token");
            } else {
                break;
            }
        }
        assert_eq!(collected, keys, "no overlap, no gap, byte order");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_v1_with_marker() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "v1").await;
        put_keys(&client, &bucket, &["a", "b", "c"]).await;

        let listing = client
            .list_objects()
            .bucket(&bucket)
            .marker("a")
            .send()
            .await
            .expect("list");
        let keys: Vec<_> = listing.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, ["b", "c"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_key_count_including_prefixes() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "count").await;
        put_keys(&client, &bucket, &["dir/x", "dir/y", "top"]).await;

        let listing = client
            .list_objects_v2()
            .bucket(&bucket)
            .delimiter("/")
            .send()
            .await
            .expect("list");
        // One common prefix (dir/) plus one object (top).
        assert_eq!(listing.key_count(), Some(2));

        cleanup_bucket(&client, &bucket).await;
    }
}
