//! Listings: ListObjects (V1), ListObjectsV2, ListObjectVersions,
//! plus the shared prefix/delimiter/marker pagination.
//!
//! Results are ordered by UTF-8 byte order on the key. When a delimiter is
//! supplied, keys sharing a prefix up to the first delimiter occurrence past
//! the requested prefix collapse into one `CommonPrefix` entry; common
//! prefixes count toward `max-keys` just like objects do. Listings take no
//! per-key locks; they see whatever one directory scan sees.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use mocks3_model::output::{ListObjectVersionsOutput, ListObjectsOutput, ListObjectsV2Output};
use mocks3_model::types::{ObjectEntry, ObjectVersionEntry};

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::store::meta::ObjectVersionMeta;

use super::S3Service;

/// The default and maximum page size.
const MAX_KEYS_CAP: i32 = 1000;

/// Parameters shared by the object listings.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Key prefix filter.
    pub prefix: Option<String>,
    /// Delimiter for common-prefix rollup.
    pub delimiter: Option<String>,
    /// Requested page size.
    pub max_keys: Option<i32>,
}

impl S3Service {
    /// ListObjects (V1).
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `InvalidArgument` for a negative `max-keys`.
    pub async fn list_objects(
        &self,
        bucket: &str,
        params: &ListParams,
        marker: Option<&str>,
    ) -> S3ServiceResult<ListObjectsOutput> {
        self.buckets.load(bucket).await?;
        let max_keys = effective_max_keys(params.max_keys)?;
        let metas = self.current_objects(bucket).await?;

        let page = paginate(
            metas.iter(),
            params.prefix.as_deref().unwrap_or(""),
            params.delimiter.as_deref().unwrap_or(""),
            marker.unwrap_or(""),
            max_keys,
        );

        Ok(ListObjectsOutput {
            name: bucket.to_owned(),
            prefix: params.prefix.clone(),
            marker: marker.map(ToOwned::to_owned),
            delimiter: params.delimiter.clone(),
            max_keys: max_keys as i32,
            is_truncated: page.is_truncated,
            // V1 emits NextMarker only when a delimiter was supplied; without
            // one, clients continue from the last key of the page.
            next_marker: params
                .delimiter
                .is_some()
                .then(|| page.next_marker.clone())
                .flatten(),
            contents: page
                .objects
                .into_iter()
                .map(|meta| object_entry(meta, true))
                .collect(),
            common_prefixes: page.common_prefixes,
        })
    }

    /// ListObjectsV2.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `InvalidArgument` for a negative `max-keys` or an
    /// undecodable continuation token.
    pub async fn list_objects_v2(
        &self,
        bucket: &str,
        params: &ListParams,
        start_after: Option<&str>,
        continuation_token: Option<&str>,
        fetch_owner: bool,
    ) -> S3ServiceResult<ListObjectsV2Output> {
        self.buckets.load(bucket).await?;
        let max_keys = effective_max_keys(params.max_keys)?;
        let metas = self.current_objects(bucket).await?;

        // The continuation token (an encoded key) wins over start-after.
        let decoded_token = continuation_token.map(decode_token).transpose()?;
        let marker = decoded_token
            .as_deref()
            .or(start_after)
            .unwrap_or("")
            .to_owned();

        let page = paginate(
            metas.iter(),
            params.prefix.as_deref().unwrap_or(""),
            params.delimiter.as_deref().unwrap_or(""),
            &marker,
            max_keys,
        );

        let key_count = (page.objects.len() + page.common_prefixes.len()) as i32;
        Ok(ListObjectsV2Output {
            name: bucket.to_owned(),
            prefix: params.prefix.clone(),
            delimiter: params.delimiter.clone(),
            max_keys: max_keys as i32,
            key_count,
            is_truncated: page.is_truncated,
            continuation_token: continuation_token.map(ToOwned::to_owned),
            next_continuation_token: page.next_marker.as_deref().map(encode_token),
            start_after: start_after.map(ToOwned::to_owned),
            contents: page
                .objects
                .into_iter()
                .map(|meta| object_entry(meta, fetch_owner))
                .collect(),
            common_prefixes: page.common_prefixes,
        })
    }

    /// ListObjectVersions.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `InvalidArgument` for a negative `max-keys`.
    pub async fn list_object_versions(
        &self,
        bucket: &str,
        params: &ListParams,
        key_marker: Option<&str>,
        version_id_marker: Option<&str>,
    ) -> S3ServiceResult<ListObjectVersionsOutput> {
        self.buckets.load(bucket).await?;
        let max_keys = effective_max_keys(params.max_keys)?;
        let all = self.objects.list_all_versions(bucket).await?;

        let prefix = params.prefix.as_deref().unwrap_or("");
        let delimiter = params.delimiter.as_deref().unwrap_or("");
        let key_marker_str = key_marker.unwrap_or("");
        let version_marker_str = version_id_marker.unwrap_or("");

        let mut versions = Vec::new();
        let mut common_prefixes = Vec::new();
        let mut seen_prefixes = std::collections::HashSet::new();
        let mut is_truncated = false;
        let mut next_key_marker = None;
        let mut next_version_id_marker = None;
        // With only a key-marker, everything up to and including that key is
        // skipped; a version-id-marker resumes inside the marker key.
        let mut skipping_versions =
            !key_marker_str.is_empty() && !version_marker_str.is_empty();

        for (meta, is_latest) in &all {
            if !key_marker_str.is_empty() {
                if meta.key.as_str() < key_marker_str {
                    continue;
                }
                if meta.key.as_str() == key_marker_str {
                    if version_marker_str.is_empty() {
                        continue;
                    }
                    if skipping_versions {
                        if meta.version_id == version_marker_str {
                            skipping_versions = false;
                        }
                        continue;
                    }
                }
            }

            if !prefix.is_empty() && !meta.key.starts_with(prefix) {
                continue;
            }

            if !delimiter.is_empty() {
                let rest = &meta.key[prefix.len()..];
                if let Some(pos) = rest.find(delimiter) {
                    let cp = format!("{prefix}{}{delimiter}", &rest[..pos]);
                    if cp.as_str() <= key_marker_str {
                        continue;
                    }
                    if !seen_prefixes.insert(cp.clone()) {
                        continue;
                    }
                    if versions.len() + common_prefixes.len() >= max_keys {
                        is_truncated = true;
                        break;
                    }
                    common_prefixes.push(cp);
                    continue;
                }
            }

            if versions.len() + common_prefixes.len() >= max_keys {
                is_truncated = true;
                break;
            }
            next_key_marker = Some(meta.key.clone());
            next_version_id_marker = Some(meta.version_id.clone());
            versions.push(version_entry(meta, *is_latest));
        }

        Ok(ListObjectVersionsOutput {
            name: bucket.to_owned(),
            prefix: params.prefix.clone(),
            delimiter: params.delimiter.clone(),
            key_marker: key_marker.map(ToOwned::to_owned),
            version_id_marker: version_id_marker.map(ToOwned::to_owned),
            next_key_marker: is_truncated.then_some(next_key_marker).flatten(),
            next_version_id_marker: is_truncated.then_some(next_version_id_marker).flatten(),
            max_keys: max_keys as i32,
            is_truncated,
            versions,
            common_prefixes,
        })
    }

    /// Current, non-delete-marker objects of a bucket, sorted by key.
    async fn current_objects(&self, bucket: &str) -> S3ServiceResult<Vec<ObjectVersionMeta>> {
        Ok(self
            .objects
            .list_current(bucket)
            .await?
            .into_iter()
            .filter(|meta| !meta.delete_marker)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

struct Page {
    objects: Vec<ObjectVersionMeta>,
    common_prefixes: Vec<String>,
    is_truncated: bool,
    /// The key or common prefix the next page starts after.
    next_marker: Option<String>,
}

/// Walk sorted metas applying marker, prefix, delimiter, and max-keys.
fn paginate<'a>(
    metas: impl Iterator<Item = &'a ObjectVersionMeta>,
    prefix: &str,
    delimiter: &str,
    marker: &str,
    max_keys: usize,
) -> Page {
    let mut objects: Vec<ObjectVersionMeta> = Vec::new();
    let mut common_prefixes: Vec<String> = Vec::new();
    let mut seen_prefixes = std::collections::HashSet::new();
    let mut is_truncated = false;
    let mut last_entry: Option<String> = None;

    for meta in metas {
        if !marker.is_empty() && meta.key.as_str() <= marker {
            continue;
        }
        if !prefix.is_empty() && !meta.key.starts_with(prefix) {
            continue;
        }

        if !delimiter.is_empty() {
            let rest = &meta.key[prefix.len()..];
            if let Some(pos) = rest.find(delimiter) {
                let cp = format!("{prefix}{}{delimiter}", &rest[..pos]);
                // A marker equal to (or past) the rolled-up prefix means the
                // whole group was already delivered.
                if !marker.is_empty() && cp.as_str() <= marker {
                    continue;
                }
                if !seen_prefixes.insert(cp.clone()) {
                    continue;
                }
                if objects.len() + common_prefixes.len() >= max_keys {
                    is_truncated = true;
                    break;
                }
                last_entry = Some(cp.clone());
                common_prefixes.push(cp);
                continue;
            }
        }

        if objects.len() + common_prefixes.len() >= max_keys {
            is_truncated = true;
            break;
        }
        last_entry = Some(meta.key.clone());
        objects.push(meta.clone());
    }

    Page {
        objects,
        common_prefixes,
        is_truncated,
        next_marker: is_truncated.then_some(last_entry).flatten(),
    }
}

/// Clamp `max-keys` to `0..=1000`, defaulting to 1000.
fn effective_max_keys(requested: Option<i32>) -> S3ServiceResult<usize> {
    match requested {
        None => Ok(MAX_KEYS_CAP as usize),
        Some(n) if n < 0 => Err(S3ServiceError::InvalidArgument {
            message: "max-keys must be non-negative".to_owned(),
        }),
        Some(n) => Ok(n.min(MAX_KEYS_CAP) as usize),
    }
}

fn encode_token(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

fn decode_token(token: &str) -> S3ServiceResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| S3ServiceError::InvalidArgument {
            message: "The continuation token provided is incorrect".to_owned(),
        })?;
    String::from_utf8(bytes).map_err(|_| S3ServiceError::InvalidArgument {
        message: "The continuation token provided is incorrect".to_owned(),
    })
}

fn object_entry(meta: ObjectVersionMeta, with_owner: bool) -> ObjectEntry {
    ObjectEntry {
        key: meta.key,
        last_modified: meta.last_modified,
        etag: meta.etag,
        size: meta.size,
        storage_class: meta.storage_class,
        owner: with_owner.then_some(meta.owner),
    }
}

fn version_entry(meta: &ObjectVersionMeta, is_latest: bool) -> ObjectVersionEntry {
    ObjectVersionEntry {
        key: meta.key.clone(),
        version_id: meta.version_id.clone(),
        is_latest,
        last_modified: meta.last_modified,
        etag: meta.etag.clone(),
        size: meta.size,
        storage_class: meta.storage_class.clone(),
        owner: meta.owner.clone(),
        is_delete_marker: meta.delete_marker,
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use mocks3_model::types::{BucketVersioningStatus, VersioningConfiguration};

    use super::super::PutObjectOptions;
    use super::*;
    use crate::kms::KmsKeyRegistry;

    async fn service_with_keys(keys: &[&str]) -> (tempfile::TempDir, S3Service) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = S3Service::new(dir.path(), "us-east-1", KmsKeyRegistry::default());
        service
            .create_bucket("b1", None, None, None, false)
            .await
            .expect("create bucket");
        for key in keys {
            service
                .put_object(
                    "b1",
                    key,
                    stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))]),
                    PutObjectOptions::default(),
                )
                .await
                .expect("put");
        }
        (dir, service)
    }

    #[tokio::test]
    async fn test_should_order_keys_by_utf8_bytes() {
        let (_dir, service) = service_with_keys(&["b", "a!", "a/x", "A"]).await;
        let listing = service
            .list_objects("b1", &ListParams::default(), None)
            .await
            .expect("list");
        let keys: Vec<_> = listing.contents.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["A", "a!", "a/x", "b"]);
    }

    #[tokio::test]
    async fn test_should_roll_up_common_prefixes() {
        let (_dir, service) =
            service_with_keys(&["a/b/c.txt", "a/b/d.txt", "a/e.txt", "top.txt"]).await;

        let params = ListParams {
            prefix: Some("a/".to_owned()),
            delimiter: Some("/".to_owned()),
            max_keys: None,
        };
        let listing = service
            .list_objects("b1", &params, None)
            .await
            .expect("list");
        assert_eq!(listing.common_prefixes, vec!["a/b/".to_owned()]);
        let keys: Vec<_> = listing.contents.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["a/e.txt"]);
    }

    #[tokio::test]
    async fn test_should_list_scenario_prefix_delimiter() {
        // PUT a/b/c.txt then list with prefix=a/ delimiter=/ yields the
        // common prefix a/b/.
        let (_dir, service) = service_with_keys(&["a/b/c.txt"]).await;
        let params = ListParams {
            prefix: Some("a/".to_owned()),
            delimiter: Some("/".to_owned()),
            max_keys: None,
        };
        let listing = service
            .list_objects("b1", &params, None)
            .await
            .expect("list");
        assert!(listing.contents.is_empty());
        assert_eq!(listing.common_prefixes, vec!["a/b/".to_owned()]);
    }

    #[tokio::test]
    async fn test_should_paginate_v2_without_overlap_or_gap() {
        let keys: Vec<String> = (0..10).map(|i| format!("key-{i:02}")).collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let (_dir, service) = service_with_keys(&key_refs).await;

        let params = ListParams {
            max_keys: Some(3),
            ..Default::default()
        };
        let mut collected = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = service
                .list_objects_v2("b1", &params, None, token.as_deref(), false)
                .await
                .expect("page");
            assert!(page.contents.len() <= 3);
            assert_eq!(
                page.key_count as usize,
                page.contents.len() + page.common_prefixes.len()
            );
            collected.extend(page.contents.iter().map(|o| o.key.clone()));
            if page.is_truncated {
                token = Some(page.next_continuation_token.expect("token when truncated"));
            } else {
                assert!(page.next_continuation_token.is_none());
                break;
            }
        }
        assert_eq!(collected, keys);
    }

    #[tokio::test]
    async fn test_should_return_empty_page_for_zero_max_keys() {
        let (_dir, service) = service_with_keys(&["a", "b"]).await;
        let params = ListParams {
            max_keys: Some(0),
            ..Default::default()
        };
        let listing = service
            .list_objects_v2("b1", &params, None, None, false)
            .await
            .expect("list");
        assert!(listing.contents.is_empty());
        assert!(!listing.is_truncated);
    }

    #[tokio::test]
    async fn test_should_reject_negative_max_keys() {
        let (_dir, service) = service_with_keys(&["a"]).await;
        let params = ListParams {
            max_keys: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            service.list_objects("b1", &params, None).await,
            Err(S3ServiceError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_respect_start_after() {
        let (_dir, service) = service_with_keys(&["a", "b", "c"]).await;
        let listing = service
            .list_objects_v2("b1", &ListParams::default(), Some("a"), None, false)
            .await
            .expect("list");
        let keys: Vec<_> = listing.contents.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["b", "c"]);
    }

    #[tokio::test]
    async fn test_should_list_versions_newest_first_per_key() {
        let (_dir, service) = service_with_keys(&[]).await;
        service
            .put_bucket_versioning(
                "b1",
                VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                },
            )
            .await
            .expect("enable versioning");

        let mut version_ids = Vec::new();
        for _ in 0..3 {
            let put = service
                .put_object(
                    "b1",
                    "k",
                    stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))]),
                    PutObjectOptions::default(),
                )
                .await
                .expect("put");
            version_ids.push(put.version_id.expect("version id"));
        }

        let listing = service
            .list_object_versions("b1", &ListParams::default(), None, None)
            .await
            .expect("list");
        let listed: Vec<_> = listing
            .versions
            .iter()
            .map(|v| v.version_id.clone())
            .collect();
        let expected: Vec<_> = version_ids.iter().rev().cloned().collect();
        assert_eq!(listed, expected, "newest first");
        assert!(listing.versions[0].is_latest);
        assert!(!listing.versions[1].is_latest);
    }

    #[tokio::test]
    async fn test_should_include_delete_markers_in_version_listing() {
        let (_dir, service) = service_with_keys(&[]).await;
        service
            .put_bucket_versioning(
                "b1",
                VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                },
            )
            .await
            .expect("enable versioning");
        service
            .put_object(
                "b1",
                "k",
                stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))]),
                PutObjectOptions::default(),
            )
            .await
            .expect("put");
        service.delete_object("b1", "k", None).await.expect("delete");

        let listing = service
            .list_object_versions("b1", &ListParams::default(), None, None)
            .await
            .expect("list");
        assert_eq!(listing.versions.len(), 2);
        assert!(listing.versions[0].is_delete_marker);
        assert!(listing.versions[0].is_latest);

        // The versioned key no longer appears in object listings.
        let objects = service
            .list_objects("b1", &ListParams::default(), None)
            .await
            .expect("list objects");
        assert!(objects.contents.is_empty());
    }

    #[tokio::test]
    async fn test_should_paginate_version_listing_with_markers() {
        let (_dir, service) = service_with_keys(&[]).await;
        service
            .put_bucket_versioning(
                "b1",
                VersioningConfiguration {
                    status: Some(BucketVersioningStatus::Enabled),
                },
            )
            .await
            .expect("enable versioning");
        for key in ["a", "b"] {
            for _ in 0..2 {
                service
                    .put_object(
                        "b1",
                        key,
                        stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))]),
                        PutObjectOptions::default(),
                    )
                    .await
                    .expect("put");
            }
        }

        let params = ListParams {
            max_keys: Some(3),
            ..Default::default()
        };
        let page1 = service
            .list_object_versions("b1", &params, None, None)
            .await
            .expect("page 1");
        assert_eq!(page1.versions.len(), 3);
        assert!(page1.is_truncated);

        let page2 = service
            .list_object_versions(
                "b1",
                &params,
                page1.next_key_marker.as_deref(),
                page1.next_version_id_marker.as_deref(),
            )
            .await
            .expect("page 2");
        assert_eq!(page2.versions.len(), 1);
        assert!(!page2.is_truncated);

        let mut all: Vec<_> = page1
            .versions
            .iter()
            .chain(page2.versions.iter())
            .map(|v| (v.key.clone(), v.version_id.clone()))
            .collect();
        let before = all.len();
        all.dedup();
        assert_eq!(before, all.len(), "no overlap between pages");
        assert_eq!(before, 4, "no gap between pages");
    }
}
