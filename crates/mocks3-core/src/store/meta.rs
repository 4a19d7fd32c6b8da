//! Metadata sidecar schemas and JSON helpers.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use mocks3_model::types::{
    AccessControlPolicy, BucketLifecycleConfiguration, BucketVersioningStatus, CorsConfiguration,
    LegalHoldStatus, ObjectLockConfiguration, ObjectLockRetention, ObjectOwnership, Owner,
    ServerSideEncryption, ServerSideEncryptionConfiguration, Tag,
};

use crate::checksums::{ChecksumAlgorithm, ChecksumValue};
use crate::error::S3ServiceResult;

/// The storage class mocks3 reports for everything.
pub const STORAGE_CLASS_STANDARD: &str = "STANDARD";

// ---------------------------------------------------------------------------
// Versioning state
// ---------------------------------------------------------------------------

/// A bucket's versioning state. Unlike the wire document, the store
/// distinguishes "never configured" from "suspended".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersioningState {
    /// Versioning has never been configured; exactly one `null` version per
    /// key.
    #[default]
    Unversioned,
    /// Every PUT allocates a fresh version id.
    Enabled,
    /// Prior version ids survive, but new PUTs overwrite the `null` version.
    Suspended,
}

impl VersioningState {
    /// Whether PUTs should allocate fresh version ids.
    #[must_use]
    pub fn allocates_version_ids(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// The wire representation (absent for `Unversioned`).
    #[must_use]
    pub fn to_wire(self) -> Option<BucketVersioningStatus> {
        match self {
            Self::Unversioned => None,
            Self::Enabled => Some(BucketVersioningStatus::Enabled),
            Self::Suspended => Some(BucketVersioningStatus::Suspended),
        }
    }

    /// Convert from the wire representation.
    #[must_use]
    pub fn from_wire(status: BucketVersioningStatus) -> Self {
        match status {
            BucketVersioningStatus::Enabled => Self::Enabled,
            BucketVersioningStatus::Suspended => Self::Suspended,
        }
    }
}

// ---------------------------------------------------------------------------
// Bucket sidecar
// ---------------------------------------------------------------------------

/// Everything persisted about a bucket, stored in `bucketMetadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetadata {
    /// The bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
    /// The region label advertised in LocationConstraint responses.
    pub region: Option<String>,
    /// The versioning state.
    #[serde(default)]
    pub versioning: VersioningState,
    /// Object lock configuration, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock: Option<ObjectLockConfiguration>,
    /// Lifecycle rules (stored and returned, never executed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<BucketLifecycleConfiguration>,
    /// The bucket policy as an opaque JSON blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// CORS configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsConfiguration>,
    /// Bucket tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// The bucket ACL.
    pub acl: AccessControlPolicy,
    /// Ownership setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<ObjectOwnership>,
    /// Default encryption configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<ServerSideEncryptionConfiguration>,
}

impl BucketMetadata {
    /// A fresh bucket owned by `owner`.
    #[must_use]
    pub fn new(name: impl Into<String>, region: Option<String>, owner: Owner) -> Self {
        Self {
            name: name.into(),
            creation_date: Utc::now(),
            region,
            versioning: VersioningState::default(),
            object_lock: None,
            lifecycle: None,
            policy: None,
            cors: None,
            tags: Vec::new(),
            acl: AccessControlPolicy::private(owner),
            ownership: None,
            encryption: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Object sidecar
// ---------------------------------------------------------------------------

/// Server-side encryption bookkeeping. No key material is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseInfo {
    /// The SSE algorithm marker.
    pub algorithm: ServerSideEncryption,
    /// The symbolic KMS key id, for `aws:kms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// The standard content headers persisted with an object version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetadata {
    /// `Content-Type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// `Content-Encoding`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// `Content-Language`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    /// `Content-Disposition`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// `Cache-Control`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// `Expires`, verbatim as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Everything persisted about one object version except its bytes, stored
/// in `objectMetadata.json` next to `binaryData`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectVersionMeta {
    /// The object key (authoritative; directory names may be hashed).
    pub key: String,
    /// The version id (`null` when versioning is off or suspended).
    pub version_id: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last-modified instant.
    pub last_modified: DateTime<Utc>,
    /// The quoted ETag.
    pub etag: String,
    /// Whether this version is a delete marker.
    #[serde(default)]
    pub delete_marker: bool,
    /// Standard content headers.
    #[serde(default)]
    pub system: SystemMetadata,
    /// User metadata from `x-amz-meta-*` headers.
    #[serde(default)]
    pub user_metadata: HashMap<String, String>,
    /// Object tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// The object ACL.
    pub acl: AccessControlPolicy,
    /// Legal hold flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_hold: Option<LegalHoldStatus>,
    /// Retention mode and expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<ObjectLockRetention>,
    /// SSE bookkeeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse: Option<SseInfo>,
    /// The recorded additional checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumValue>,
    /// The storage class (always `STANDARD`).
    pub storage_class: String,
    /// Part count for multipart completions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_count: Option<u32>,
    /// The version owner.
    pub owner: Owner,
}

// ---------------------------------------------------------------------------
// Upload sidecar
// ---------------------------------------------------------------------------

/// Metadata captured at CreateMultipartUpload and applied to the assembled
/// object, stored in `uploadMetadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    /// The upload id.
    pub upload_id: String,
    /// The destination key.
    pub key: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
    /// The upload owner (also the initiator).
    pub owner: Owner,
    /// Target storage class.
    pub storage_class: String,
    /// Content headers for the final object.
    #[serde(default)]
    pub system: SystemMetadata,
    /// User metadata for the final object.
    #[serde(default)]
    pub user_metadata: HashMap<String, String>,
    /// Tags for the final object.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// ACL for the final object.
    pub acl: AccessControlPolicy,
    /// SSE bookkeeping for the final object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse: Option<SseInfo>,
    /// Checksum algorithm requested for the upload's parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Read and parse a JSON sidecar.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> S3ServiceResult<T> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        anyhow::anyhow!("corrupt metadata sidecar {}: {e}", path.display()).into()
    })
}

/// Serialize a value to a temp file and atomically rename it into place.
pub(crate) async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> S3ServiceResult<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| anyhow::anyhow!("failed to serialize sidecar: {e}"))?;
    write_atomic(path, &json).await
}

/// Write bytes to a temp file next to `path` and rename it into place.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> S3ServiceResult<()> {
    let tmp = tmp_sibling(path);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(e.into());
    }
    Ok(())
}

/// A unique temp-file path in the same directory as `path` (renames across
/// filesystems are not atomic, siblings always are).
pub(crate) fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{file_name}.tmp.{}",
        uuid::Uuid::new_v4().simple()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_bucket_metadata_json() {
        let meta = BucketMetadata::new("bucket", Some("eu-west-1".to_owned()), Owner::default());
        let json = serde_json::to_string(&meta).expect("serialize");
        let parsed: BucketMetadata = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.name, "bucket");
        assert_eq!(parsed.region.as_deref(), Some("eu-west-1"));
        assert_eq!(parsed.versioning, VersioningState::Unversioned);
    }

    #[test]
    fn test_should_default_missing_optional_sidecar_fields() {
        // Sidecars written by older runs may lack newer fields.
        let json = r#"{
            "name": "b",
            "creationDate": "2024-01-01T00:00:00Z",
            "region": null,
            "acl": {"owner": {"id": "i", "displayName": "d"}, "grants": []}
        }"#;
        let parsed: BucketMetadata = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.versioning, VersioningState::Unversioned);
        assert!(parsed.tags.is_empty());
        assert!(parsed.policy.is_none());
    }

    #[test]
    fn test_should_map_versioning_state_to_wire() {
        assert_eq!(VersioningState::Unversioned.to_wire(), None);
        assert_eq!(
            VersioningState::Enabled.to_wire(),
            Some(BucketVersioningStatus::Enabled)
        );
        assert!(VersioningState::Enabled.allocates_version_ids());
        assert!(!VersioningState::Suspended.allocates_version_ids());
    }

    #[tokio::test]
    async fn test_should_write_sidecars_atomically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meta.json");
        write_json_atomic(&path, &SystemMetadata::default())
            .await
            .expect("write");
        let parsed: SystemMetadata = read_json(&path).await.expect("read");
        assert_eq!(parsed, SystemMetadata::default());

        // No temp litter left behind.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
