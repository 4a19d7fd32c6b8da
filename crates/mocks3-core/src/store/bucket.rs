//! The bucket store: one directory per bucket plus a JSON sidecar.
//!
//! The set of directories under the root IS the bucket listing; there is no
//! global index to keep consistent.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::paths::BUCKET_METADATA_FILE;

use super::meta::{BucketMetadata, read_json, write_json_atomic};

/// Filesystem-backed bucket store.
#[derive(Debug, Clone)]
pub struct BucketStore {
    root: PathBuf,
}

impl BucketStore {
    /// Create a store over `root` (which must already exist).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a bucket.
    #[must_use]
    pub fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn sidecar_path(&self, bucket: &str) -> PathBuf {
        self.bucket_path(bucket).join(BUCKET_METADATA_FILE)
    }

    /// Whether the bucket exists.
    #[must_use]
    pub fn exists(&self, bucket: &str) -> bool {
        self.sidecar_path(bucket).is_file()
    }

    /// Create a bucket directory and its sidecar.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::BucketAlreadyOwnedByYou`] when the directory exists
    /// (mocks3 is single-owner, so an existing bucket is always "yours").
    pub async fn create(&self, meta: &BucketMetadata) -> S3ServiceResult<()> {
        let path = self.bucket_path(&meta.name);
        match tokio::fs::create_dir(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(S3ServiceError::BucketAlreadyOwnedByYou {
                    bucket: meta.name.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        write_json_atomic(&self.sidecar_path(&meta.name), meta).await?;
        debug!(bucket = %meta.name, "created bucket");
        Ok(())
    }

    /// Load a bucket's metadata.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchBucket`] when the bucket does not exist.
    pub async fn load(&self, bucket: &str) -> S3ServiceResult<BucketMetadata> {
        if !self.exists(bucket) {
            return Err(S3ServiceError::NoSuchBucket {
                bucket: bucket.to_owned(),
            });
        }
        read_json(&self.sidecar_path(bucket)).await
    }

    /// Persist updated bucket metadata.
    ///
    /// # Errors
    ///
    /// Propagates sidecar I/O failures.
    pub async fn save(&self, meta: &BucketMetadata) -> S3ServiceResult<()> {
        write_json_atomic(&self.sidecar_path(&meta.name), meta).await
    }

    /// List all buckets, sorted by name.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures. Directories without a readable
    /// sidecar (e.g. mid-creation) are skipped.
    pub async fn list(&self) -> S3ServiceResult<Vec<BucketMetadata>> {
        let mut buckets = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match read_json::<BucketMetadata>(&self.sidecar_path(&name)).await {
                Ok(meta) => buckets.push(meta),
                Err(_) => debug!(bucket = %name, "skipping directory without bucket sidecar"),
            }
        }
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    /// Remove a bucket and everything under it. The caller is responsible
    /// for the emptiness check.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchBucket`] when the bucket does not exist.
    pub async fn delete(&self, bucket: &str) -> S3ServiceResult<()> {
        if !self.exists(bucket) {
            return Err(S3ServiceError::NoSuchBucket {
                bucket: bucket.to_owned(),
            });
        }
        tokio::fs::remove_dir_all(self.bucket_path(bucket)).await?;
        debug!(bucket, "deleted bucket");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mocks3_model::types::Owner;

    use super::*;

    fn store() -> (tempfile::TempDir, BucketStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BucketStore::new(dir.path());
        (dir, store)
    }

    fn meta(name: &str) -> BucketMetadata {
        BucketMetadata::new(name, None, Owner::default())
    }

    #[tokio::test]
    async fn test_should_create_and_load_bucket() {
        let (_dir, store) = store();
        store.create(&meta("bucket-a")).await.expect("create");

        assert!(store.exists("bucket-a"));
        let loaded = store.load("bucket-a").await.expect("load");
        assert_eq!(loaded.name, "bucket-a");
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_creation() {
        let (_dir, store) = store();
        store.create(&meta("bucket-a")).await.expect("create");

        let err = store.create(&meta("bucket-a")).await.expect_err("duplicate");
        assert!(matches!(err, S3ServiceError::BucketAlreadyOwnedByYou { .. }));
    }

    #[tokio::test]
    async fn test_should_return_no_such_bucket_for_missing() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("ghost").await,
            Err(S3ServiceError::NoSuchBucket { .. })
        ));
        assert!(matches!(
            store.delete("ghost").await,
            Err(S3ServiceError::NoSuchBucket { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_list_buckets_sorted() {
        let (_dir, store) = store();
        for name in ["zebra", "alpha", "middle"] {
            store.create(&meta(name)).await.expect("create");
        }
        let names: Vec<_> = store
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["alpha", "middle", "zebra"]);
    }

    #[tokio::test]
    async fn test_should_delete_bucket_directory() {
        let (_dir, store) = store();
        store.create(&meta("bucket-a")).await.expect("create");
        store.delete("bucket-a").await.expect("delete");
        assert!(!store.exists("bucket-a"));
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_should_persist_config_updates() {
        let (_dir, store) = store();
        let mut m = meta("bucket-a");
        store.create(&m).await.expect("create");

        m.policy = Some(r#"{"Version":"2012-10-17"}"#.to_owned());
        m.versioning = super::super::meta::VersioningState::Enabled;
        store.save(&m).await.expect("save");

        let loaded = store.load("bucket-a").await.expect("load");
        assert_eq!(loaded.policy, m.policy);
        assert_eq!(loaded.versioning, super::super::meta::VersioningState::Enabled);
    }
}
