//! The object store: version directories, data files, and sidecars.
//!
//! Each key directory holds one subdirectory per version (`binaryData` +
//! `objectMetadata.json`) and a `currentVersion` file naming the live
//! version. Bytes stream to a temp file while MD5 and any requested
//! checksum are computed in the same pass; the temp file is renamed into
//! place only after all integrity checks hold and is unlinked on any
//! failure, so a version directory never exposes partial data.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, StreamExt, pin_mut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace};

use crate::checksums::{ChecksumAlgorithm, ChecksumValue, StreamingHasher};
use crate::error::{S3ServiceError, S3ServiceResult};
use crate::paths::{
    BINARY_DATA_FILE, CURRENT_VERSION_FILE, OBJECT_METADATA_FILE, UPLOADS_DIR, key_segment,
};

use super::meta::{ObjectVersionMeta, read_json, tmp_sibling, write_atomic, write_json_atomic};

/// Result of writing version data.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The quoted ETag (hex MD5).
    pub etag: String,
    /// The unquoted hex MD5.
    pub md5_hex: String,
    /// Bytes written.
    pub size: u64,
    /// The additional checksum, when one was requested.
    pub checksum: Option<ChecksumValue>,
}

/// Integrity expectations supplied by the client.
#[derive(Debug, Clone, Default)]
pub struct IntegrityChecks {
    /// Hex MD5 decoded from a `Content-MD5` header.
    pub content_md5_hex: Option<String>,
    /// Base64 value from an `x-amz-checksum-*` header, matched against the
    /// computed checksum of the same algorithm.
    pub expected_checksum: Option<String>,
}

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Create a store over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    /// Directory of a key within a bucket.
    #[must_use]
    pub fn key_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key_segment(key))
    }

    /// Directory of one version of a key.
    #[must_use]
    pub fn version_path(&self, bucket: &str, key: &str, version_id: &str) -> PathBuf {
        self.key_path(bucket, key).join(version_id)
    }

    /// Path of a version's data file.
    #[must_use]
    pub fn data_path(&self, bucket: &str, key: &str, version_id: &str) -> PathBuf {
        self.version_path(bucket, key, version_id).join(BINARY_DATA_FILE)
    }

    fn meta_path(&self, bucket: &str, key: &str, version_id: &str) -> PathBuf {
        self.version_path(bucket, key, version_id)
            .join(OBJECT_METADATA_FILE)
    }

    fn current_version_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.key_path(bucket, key).join(CURRENT_VERSION_FILE)
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Stream `body` into a version's `binaryData`, hashing as it goes.
    ///
    /// The bytes land in a temp file first; integrity checks run before the
    /// rename, and any failure removes the temp file.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::BadDigest`] on an MD5/checksum mismatch; I/O
    /// failures surface as `Internal`.
    pub async fn write_version_data<S>(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
        body: S,
        algorithm: Option<ChecksumAlgorithm>,
        checks: &IntegrityChecks,
    ) -> S3ServiceResult<WriteOutcome>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send,
    {
        let dir = self.version_path(bucket, key, version_id);
        tokio::fs::create_dir_all(&dir).await?;

        let data_path = dir.join(BINARY_DATA_FILE);
        let tmp = tmp_sibling(&data_path);

        let write_result = write_stream_hashed(&tmp, body, algorithm).await;
        let result = match write_result {
            Ok(result) => result,
            Err(e) => {
                tokio::fs::remove_file(&tmp).await.ok();
                return Err(e);
            }
        };

        if let Some(expected_md5) = &checks.content_md5_hex {
            if *expected_md5 != result.md5_hex {
                tokio::fs::remove_file(&tmp).await.ok();
                return Err(S3ServiceError::BadDigest);
            }
        }
        if let Some(expected) = &checks.expected_checksum {
            let computed = result.checksum.as_ref().map(|c| c.value.as_str());
            if computed != Some(expected.as_str()) {
                tokio::fs::remove_file(&tmp).await.ok();
                return Err(S3ServiceError::BadDigest);
            }
        }

        if let Err(e) = tokio::fs::rename(&tmp, &data_path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }

        trace!(bucket, key, version_id, size = result.size, "wrote version data");
        Ok(WriteOutcome {
            etag: format!("\"{}\"", result.md5_hex),
            md5_hex: result.md5_hex,
            size: result.size,
            checksum: result.checksum,
        })
    }

    /// Open a version's data file for reading.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchKey`] when the data file is missing.
    pub async fn open_data(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<tokio::fs::File> {
        match tokio::fs::File::open(self.data_path(bucket, key, version_id)).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(S3ServiceError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Sidecars and current-version tracking
    // -----------------------------------------------------------------------

    /// Persist a version's metadata sidecar.
    ///
    /// # Errors
    ///
    /// Propagates sidecar I/O failures.
    pub async fn save_meta(
        &self,
        bucket: &str,
        key: &str,
        meta: &ObjectVersionMeta,
    ) -> S3ServiceResult<()> {
        write_json_atomic(&self.meta_path(bucket, key, &meta.version_id), meta).await
    }

    /// Load a version's metadata sidecar.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchVersion`] when the version directory or its
    /// sidecar is missing.
    pub async fn load_meta(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<ObjectVersionMeta> {
        let path = self.meta_path(bucket, key, version_id);
        if !path.is_file() {
            return Err(S3ServiceError::NoSuchVersion {
                key: key.to_owned(),
                version_id: version_id.to_owned(),
            });
        }
        read_json(&path).await
    }

    /// Record `version_id` as the key's current version.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub async fn set_current_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<()> {
        write_atomic(
            &self.current_version_path(bucket, key),
            version_id.as_bytes(),
        )
        .await
    }

    /// Read the key's current version id, if the key exists.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures other than not-found.
    pub async fn current_version(
        &self,
        bucket: &str,
        key: &str,
    ) -> S3ServiceResult<Option<String>> {
        match tokio::fs::read_to_string(self.current_version_path(bucket, key)).await {
            Ok(contents) => Ok(Some(contents.trim().to_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the metadata of the key's current version, if any.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub async fn load_current(
        &self,
        bucket: &str,
        key: &str,
    ) -> S3ServiceResult<Option<ObjectVersionMeta>> {
        match self.current_version(bucket, key).await? {
            None => Ok(None),
            Some(version_id) => match self.load_meta(bucket, key, &version_id).await {
                Ok(meta) => Ok(Some(meta)),
                Err(S3ServiceError::NoSuchVersion { .. }) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Listing scans
    // -----------------------------------------------------------------------

    /// Metadata of every key's current version (delete markers included;
    /// callers filter). Sorted by key in UTF-8 byte order.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures. Keys that vanish mid-scan are
    /// skipped, per the snapshot-only-within-one-scan contract.
    pub async fn list_current(&self, bucket: &str) -> S3ServiceResult<Vec<ObjectVersionMeta>> {
        let mut result = Vec::new();
        for key_dir in self.key_dirs(bucket).await? {
            if let Some(meta) = self.load_current_in_dir(&key_dir).await {
                result.push(meta);
            }
        }
        result.sort_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));
        Ok(result)
    }

    /// Every version of every key: `(meta, is_latest)`, sorted by key in
    /// byte order and newest-first within a key.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures.
    pub async fn list_all_versions(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<Vec<(ObjectVersionMeta, bool)>> {
        let mut result = Vec::new();
        for key_dir in self.key_dirs(bucket).await? {
            let current = read_current_in_dir(&key_dir).await;
            let mut versions = load_versions_in_dir(&key_dir).await?;
            // Newest first: later creation instants (and ids) sort first.
            versions.sort_by(|a, b| {
                (b.last_modified, b.version_id.as_str())
                    .cmp(&(a.last_modified, a.version_id.as_str()))
            });
            for meta in versions {
                let is_latest = current.as_deref() == Some(meta.version_id.as_str());
                result.push((meta, is_latest));
            }
        }
        result.sort_by(|a, b| {
            a.0.key
                .as_bytes()
                .cmp(b.0.key.as_bytes())
                .then_with(|| {
                    (b.0.last_modified, b.0.version_id.as_str())
                        .cmp(&(a.0.last_modified, a.0.version_id.as_str()))
                })
        });
        Ok(result)
    }

    /// Whether the bucket holds at least one current, non-delete-marker
    /// object.
    ///
    /// # Errors
    ///
    /// Propagates directory-scan failures.
    pub async fn has_current_objects(&self, bucket: &str) -> S3ServiceResult<bool> {
        for key_dir in self.key_dirs(bucket).await? {
            if let Some(meta) = self.load_current_in_dir(&key_dir).await {
                if !meta.delete_marker {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// All key directories of a bucket.
    pub(crate) async fn key_dirs(&self, bucket: &str) -> S3ServiceResult<Vec<PathBuf>> {
        let bucket_path = self.root.join(bucket);
        let mut dirs = Vec::new();
        let mut entries = match tokio::fs::read_dir(&bucket_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(dirs),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }

    async fn load_current_in_dir(&self, key_dir: &Path) -> Option<ObjectVersionMeta> {
        let current = read_current_in_dir(key_dir).await?;
        read_json(&key_dir.join(current).join(OBJECT_METADATA_FILE))
            .await
            .ok()
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove one version. When it was the current version the next-newest
    /// survivor becomes current; when nothing survives the key directory is
    /// retired (staging subdirectories are preserved).
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchVersion`] when the version does not exist.
    pub async fn remove_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<ObjectVersionMeta> {
        let meta = self.load_meta(bucket, key, version_id).await?;
        tokio::fs::remove_dir_all(self.version_path(bucket, key, version_id)).await?;

        if self.current_version(bucket, key).await?.as_deref() == Some(version_id) {
            let key_dir = self.key_path(bucket, key);
            let mut survivors = load_versions_in_dir(&key_dir).await?;
            survivors.sort_by(|a, b| {
                (b.last_modified, b.version_id.as_str())
                    .cmp(&(a.last_modified, a.version_id.as_str()))
            });
            match survivors.first() {
                Some(newest) => {
                    self.set_current_version(bucket, key, &newest.version_id)
                        .await?;
                }
                None => self.remove_key(bucket, key).await?,
            }
        }

        debug!(bucket, key, version_id, "removed object version");
        Ok(meta)
    }

    /// Remove all version data for a key (the un-versioned delete path).
    /// In-progress multipart staging under the same key survives.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub async fn remove_key(&self, bucket: &str, key: &str) -> S3ServiceResult<()> {
        let key_dir = self.key_path(bucket, key);
        let mut entries = match tokio::fs::read_dir(&key_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let mut keep_dir = false;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name == UPLOADS_DIR {
                keep_dir = true;
                continue;
            }
            if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(entry.path()).await?;
            } else {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        if !keep_dir {
            tokio::fs::remove_dir(&key_dir).await.ok();
        }
        debug!(bucket, key, "removed key data");
        Ok(())
    }
}

/// Read a key directory's `currentVersion` file.
async fn read_current_in_dir(key_dir: &Path) -> Option<String> {
    tokio::fs::read_to_string(key_dir.join(CURRENT_VERSION_FILE))
        .await
        .ok()
        .map(|s| s.trim().to_owned())
}

/// Load every version sidecar in a key directory.
async fn load_versions_in_dir(key_dir: &Path) -> S3ServiceResult<Vec<ObjectVersionMeta>> {
    let mut versions = Vec::new();
    let mut entries = match tokio::fs::read_dir(key_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(versions),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() || entry.file_name() == UPLOADS_DIR {
            continue;
        }
        if let Ok(meta) =
            read_json::<ObjectVersionMeta>(&entry.path().join(OBJECT_METADATA_FILE)).await
        {
            versions.push(meta);
        }
    }
    Ok(versions)
}

struct HashedWrite {
    md5_hex: String,
    size: u64,
    checksum: Option<ChecksumValue>,
}

/// Stream chunks into `path` while hashing them.
async fn write_stream_hashed<S>(
    path: &Path,
    body: S,
    algorithm: Option<ChecksumAlgorithm>,
) -> S3ServiceResult<HashedWrite>
where
    S: Stream<Item = std::io::Result<Bytes>> + Send,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut hasher = StreamingHasher::new(algorithm);

    pin_mut!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    let result = hasher.finalize();
    Ok(HashedWrite {
        md5_hex: result.md5_hex,
        size: result.size,
        checksum: result.checksum,
    })
}

/// Expose an open file as a chunk stream (used by copy operations and
/// multipart assembly).
pub fn file_stream(
    file: tokio::fs::File,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    futures_util::stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0_u8; 64 * 1024];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            buf.truncate(n);
            Ok(Some((Bytes::from(buf), file)))
        }
    })
}

/// Expose `length` bytes of an open file as a chunk stream, starting at the
/// file's current position (used by ranged part copies).
pub fn file_range_stream(
    file: tokio::fs::File,
    length: u64,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    futures_util::stream::try_unfold((file, length), |(mut file, remaining)| async move {
        if remaining == 0 {
            return Ok(None);
        }
        let chunk_len = remaining.min(64 * 1024) as usize;
        let mut buf = vec![0_u8; chunk_len];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some((Bytes::from(buf), (file, remaining - n as u64))))
    })
}
