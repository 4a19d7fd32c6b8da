//! Operation orchestration.
//!
//! [`S3Service`] owns the stores, the KMS registry, and the lock registry,
//! and exposes one method per S3 operation. Methods validate their inputs,
//! acquire the locks mandated by the concurrency model (reads share, writes
//! exclude, per bucket and per key), evaluate preconditions, drive the
//! stores, and build response DTOs. The HTTP layer above does header and
//! XML plumbing only; the stores below do filesystem work only.

mod bucket;
mod bucket_config;
mod list;
mod multipart;
mod object;
mod object_config;

use std::collections::HashMap;
use std::path::PathBuf;

use mocks3_model::types::{CannedAcl, LegalHoldStatus, ObjectLockRetention, Owner, Tag};

use crate::checksums::ChecksumAlgorithm;
use crate::kms::KmsKeyRegistry;
use crate::locks::LockRegistry;
use crate::store::meta::SystemMetadata;
use crate::store::{BucketStore, MultipartStore, ObjectStore, SseInfo};

pub use list::ListParams;
pub use multipart::{CompleteResult, UploadPartResult};
pub use object::{CopyDestination, CopyResult, DeleteObjectResult, GetObjectResult, PutObjectResult};

/// The S3 service facade.
#[derive(Debug)]
pub struct S3Service {
    pub(crate) buckets: BucketStore,
    pub(crate) objects: ObjectStore,
    pub(crate) multiparts: MultipartStore,
    pub(crate) kms: KmsKeyRegistry,
    pub(crate) locks: LockRegistry,
    pub(crate) region: String,
    pub(crate) owner: Owner,
}

impl S3Service {
    /// Create a service over an existing root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, region: impl Into<String>, kms: KmsKeyRegistry) -> Self {
        let root = root.into();
        Self {
            buckets: BucketStore::new(&root),
            objects: ObjectStore::new(&root),
            multiparts: MultipartStore::new(&root),
            kms,
            locks: LockRegistry::new(),
            region: region.into(),
            owner: Owner::default(),
        }
    }

    /// The configured region label.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The account owner all resources belong to.
    #[must_use]
    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

/// Attributes a write request may attach to the object it creates. Shared
/// by PutObject, CopyObject (REPLACE mode), and CreateMultipartUpload.
#[derive(Debug, Clone, Default)]
pub struct PutObjectOptions {
    /// Standard content headers.
    pub system: SystemMetadata,
    /// `x-amz-meta-*` metadata.
    pub user_metadata: HashMap<String, String>,
    /// Tags from the `x-amz-tagging` header.
    pub tags: Vec<Tag>,
    /// Canned ACL from `x-amz-acl`.
    pub canned_acl: Option<CannedAcl>,
    /// SSE marker from the `x-amz-server-side-encryption*` headers.
    pub sse: Option<SseInfo>,
    /// Algorithm from `x-amz-sdk-checksum-algorithm`.
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
    /// Raw `Content-MD5` header (base64).
    pub content_md5: Option<String>,
    /// Expected value from the matching `x-amz-checksum-*` header.
    pub expected_checksum: Option<String>,
    /// Legal hold from `x-amz-object-lock-legal-hold`.
    pub legal_hold: Option<LegalHoldStatus>,
    /// Retention from the `x-amz-object-lock-mode`/`-retain-until-date`
    /// headers.
    pub retention: Option<ObjectLockRetention>,
}
