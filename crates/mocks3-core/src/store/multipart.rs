//! The multipart staging store.
//!
//! Parts live under `<key>/uploads/<uploadId>/parts/` as raw files plus a
//! hex-MD5 sidecar per part. Assembly concatenates the staged parts into a
//! destination version's data file; the composite ETag is computed from the
//! recorded part MD5s, not by re-hashing the bytes.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use mocks3_model::types::PartEntry;

use crate::checksums::ChecksumAlgorithm;
use crate::error::{S3ServiceError, S3ServiceResult};
use crate::paths::{BINARY_DATA_FILE, UPLOAD_METADATA_FILE, UPLOADS_DIR, key_segment};

use super::meta::{UploadMetadata, read_json, tmp_sibling, write_json_atomic};
use super::object::{IntegrityChecks, ObjectStore, WriteOutcome};

/// Filesystem-backed multipart staging store.
#[derive(Debug, Clone)]
pub struct MultipartStore {
    root: PathBuf,
}

impl MultipartStore {
    /// Create a store over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    /// Staging directory of one upload.
    #[must_use]
    pub fn staging_path(&self, bucket: &str, key: &str, upload_id: &str) -> PathBuf {
        self.root
            .join(bucket)
            .join(key_segment(key))
            .join(UPLOADS_DIR)
            .join(upload_id)
    }

    fn parts_path(&self, bucket: &str, key: &str, upload_id: &str) -> PathBuf {
        self.staging_path(bucket, key, upload_id).join("parts")
    }

    fn part_path(&self, bucket: &str, key: &str, upload_id: &str, part_number: u32) -> PathBuf {
        self.parts_path(bucket, key, upload_id)
            .join(part_number.to_string())
    }

    fn part_md5_path(&self, bucket: &str, key: &str, upload_id: &str, part_number: u32) -> PathBuf {
        self.parts_path(bucket, key, upload_id)
            .join(format!("{part_number}.md5"))
    }

    fn meta_path(&self, bucket: &str, key: &str, upload_id: &str) -> PathBuf {
        self.staging_path(bucket, key, upload_id)
            .join(UPLOAD_METADATA_FILE)
    }

    // -----------------------------------------------------------------------
    // Upload lifecycle
    // -----------------------------------------------------------------------

    /// Create the staging directory for a new upload.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub async fn create(&self, bucket: &str, upload: &UploadMetadata) -> S3ServiceResult<()> {
        let parts = self.parts_path(bucket, &upload.key, &upload.upload_id);
        tokio::fs::create_dir_all(&parts).await?;
        write_json_atomic(&self.meta_path(bucket, &upload.key, &upload.upload_id), upload).await?;
        debug!(bucket, key = %upload.key, upload_id = %upload.upload_id, "created multipart upload");
        Ok(())
    }

    /// Load an upload's metadata.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchUpload`] when the staging directory is gone
    /// (never created, aborted, or already completed).
    pub async fn load(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> S3ServiceResult<UploadMetadata> {
        let path = self.meta_path(bucket, key, upload_id);
        if !path.is_file() {
            return Err(S3ServiceError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            });
        }
        read_json(&path).await
    }

    /// Remove an upload's staging directory.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchUpload`] when there is nothing to remove.
    pub async fn remove(&self, bucket: &str, key: &str, upload_id: &str) -> S3ServiceResult<()> {
        let path = self.staging_path(bucket, key, upload_id);
        if !path.is_dir() {
            return Err(S3ServiceError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            });
        }
        tokio::fs::remove_dir_all(&path).await?;
        self.prune_uploads_dir(bucket, key).await;
        debug!(bucket, key, upload_id, "removed multipart staging");
        Ok(())
    }

    /// Retire empty `uploads/` (and key) directories after an upload ends so
    /// key listings do not see ghost keys.
    async fn prune_uploads_dir(&self, bucket: &str, key: &str) {
        let key_dir = self.root.join(bucket).join(key_segment(key));
        let uploads = key_dir.join(UPLOADS_DIR);
        // remove_dir only succeeds on empty directories, which is the point.
        if tokio::fs::remove_dir(&uploads).await.is_ok() {
            tokio::fs::remove_dir(&key_dir).await.ok();
        }
    }

    // -----------------------------------------------------------------------
    // Parts
    // -----------------------------------------------------------------------

    /// Stage one part, overwriting any previous part with the same number.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchUpload`] when the upload is gone;
    /// [`S3ServiceError::BadDigest`] on integrity mismatch.
    pub async fn write_part<S>(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: S,
        algorithm: Option<ChecksumAlgorithm>,
        checks: &IntegrityChecks,
    ) -> S3ServiceResult<WriteOutcome>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send,
    {
        // Re-check staging existence under the caller's lock: the upload may
        // have been aborted while this request was in flight.
        if !self.meta_path(bucket, key, upload_id).is_file() {
            return Err(S3ServiceError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            });
        }

        let part_path = self.part_path(bucket, key, upload_id, part_number);
        let tmp = tmp_sibling(&part_path);

        let outcome =
            write_part_file(&tmp, &part_path, body, algorithm, checks).await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tokio::fs::remove_file(&tmp).await.ok();
                return Err(e);
            }
        };

        tokio::fs::write(
            self.part_md5_path(bucket, key, upload_id, part_number),
            outcome.md5_hex.as_bytes(),
        )
        .await?;

        debug!(bucket, key, upload_id, part_number, size = outcome.size, "staged part");
        Ok(outcome)
    }

    /// The recorded hex MD5 of a staged part, if the part exists.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures other than not-found.
    pub async fn part_md5(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
    ) -> S3ServiceResult<Option<String>> {
        match tokio::fs::read_to_string(self.part_md5_path(bucket, key, upload_id, part_number))
            .await
        {
            Ok(contents) => Ok(Some(contents.trim().to_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List staged parts as listing entries, ascending by part number.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchUpload`] when the upload is gone.
    pub async fn list_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> S3ServiceResult<Vec<PartEntry>> {
        if !self.meta_path(bucket, key, upload_id).is_file() {
            return Err(S3ServiceError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            });
        }

        let mut parts = Vec::new();
        let mut entries = tokio::fs::read_dir(self.parts_path(bucket, key, upload_id)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(part_number) = name.parse::<u32>() else {
                continue; // skip .md5 sidecars
            };
            let metadata = entry.metadata().await?;
            let md5 = self
                .part_md5(bucket, key, upload_id, part_number)
                .await?
                .unwrap_or_default();
            let last_modified: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());
            parts.push(PartEntry {
                part_number,
                last_modified,
                etag: format!("\"{md5}\""),
                size: metadata.len(),
            });
        }
        parts.sort_by_key(|p| p.part_number);
        Ok(parts)
    }

    /// Size of a staged part in bytes, if it exists.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures other than not-found.
    pub async fn part_size(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
    ) -> S3ServiceResult<Option<u64>> {
        match tokio::fs::metadata(self.part_path(bucket, key, upload_id, part_number)).await {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Enumerate all in-progress uploads for a bucket, ordered by key then
    /// upload id.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures.
    pub async fn list_uploads(
        &self,
        bucket: &str,
        objects: &ObjectStore,
    ) -> S3ServiceResult<Vec<UploadMetadata>> {
        let mut uploads = Vec::new();
        for key_dir in objects.key_dirs(bucket).await? {
            let uploads_dir = key_dir.join(UPLOADS_DIR);
            let mut entries = match tokio::fs::read_dir(&uploads_dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                if let Ok(meta) =
                    read_json::<UploadMetadata>(&entry.path().join(UPLOAD_METADATA_FILE)).await
                {
                    uploads.push(meta);
                }
            }
        }
        uploads.sort_by(|a, b| {
            a.key
                .as_bytes()
                .cmp(b.key.as_bytes())
                .then_with(|| a.upload_id.cmp(&b.upload_id))
        });
        Ok(uploads)
    }

    /// Whether the bucket has any in-progress uploads.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures.
    pub async fn bucket_has_uploads(
        &self,
        bucket: &str,
        objects: &ObjectStore,
    ) -> S3ServiceResult<bool> {
        Ok(!self.list_uploads(bucket, objects).await?.is_empty())
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Concatenate staged parts (in the supplied order) into the destination
    /// version's data file. Returns the total size.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::InvalidPart`] when a part file is missing; I/O
    /// failures surface as `Internal` after the temp file is removed.
    pub async fn assemble(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_numbers: &[u32],
        objects: &ObjectStore,
        dest_version_id: &str,
    ) -> S3ServiceResult<u64> {
        let dest_dir = objects.version_path(bucket, key, dest_version_id);
        tokio::fs::create_dir_all(&dest_dir).await?;
        let dest_path = dest_dir.join(BINARY_DATA_FILE);
        let tmp = tmp_sibling(&dest_path);

        let result = self
            .concat_parts(bucket, key, upload_id, part_numbers, &tmp)
            .await;
        let total = match result {
            Ok(total) => total,
            Err(e) => {
                tokio::fs::remove_file(&tmp).await.ok();
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&tmp, &dest_path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        debug!(bucket, key, upload_id, parts = part_numbers.len(), total, "assembled multipart object");
        Ok(total)
    }

    async fn concat_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_numbers: &[u32],
        dest: &std::path::Path,
    ) -> S3ServiceResult<u64> {
        let mut out = tokio::fs::File::create(dest).await?;
        let mut total = 0_u64;
        for &part_number in part_numbers {
            let path = self.part_path(bucket, key, upload_id, part_number);
            let mut part = match tokio::fs::File::open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(S3ServiceError::InvalidPart);
                }
                Err(e) => return Err(e.into()),
            };
            total += tokio::io::copy(&mut part, &mut out).await?;
        }
        out.flush().await?;
        Ok(total)
    }
}

/// Stream a part body to a temp file, verify integrity, rename into place.
async fn write_part_file<S>(
    tmp: &std::path::Path,
    part_path: &std::path::Path,
    body: S,
    algorithm: Option<ChecksumAlgorithm>,
    checks: &IntegrityChecks,
) -> S3ServiceResult<WriteOutcome>
where
    S: Stream<Item = std::io::Result<Bytes>> + Send,
{
    use futures_util::{StreamExt, pin_mut};

    use crate::checksums::StreamingHasher;

    let mut file = tokio::fs::File::create(tmp).await?;
    let mut hasher = StreamingHasher::new(algorithm);
    pin_mut!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    let result = hasher.finalize();
    if let Some(expected) = &checks.content_md5_hex {
        if *expected != result.md5_hex {
            return Err(S3ServiceError::BadDigest);
        }
    }
    if let Some(expected) = &checks.expected_checksum {
        if result.checksum.as_ref().map(|c| c.value.as_str()) != Some(expected.as_str()) {
            return Err(S3ServiceError::BadDigest);
        }
    }

    tokio::fs::rename(tmp, part_path).await?;
    Ok(WriteOutcome {
        etag: result.etag(),
        md5_hex: result.md5_hex.clone(),
        size: result.size,
        checksum: result.checksum,
    })
}
