//! Shared S3 types used by requests, responses, and metadata sidecars.
//!
//! Types here appear in the XML wire format and, for a subset, in the JSON
//! metadata sidecars on disk (those derive `Serialize`/`Deserialize`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Owner / ACL
// ---------------------------------------------------------------------------

/// The owner of an S3 object or bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// The canonical user ID of the owner.
    pub id: String,
    /// The display name of the owner.
    pub display_name: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            id: "79a59df900b949e55d96a1e698fbacedfd6e09d98eacf8f8d5218e7cd47ef2be".to_owned(),
            display_name: "mocks3".to_owned(),
        }
    }
}

/// A grantee in an ACL grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Grantee {
    /// A canonical user identified by an account ID.
    CanonicalUser {
        /// The canonical user ID.
        id: String,
        /// The display name for the user.
        display_name: String,
    },
    /// A predefined Amazon S3 group, identified by URI.
    Group {
        /// The group URI (e.g. `http://acs.amazonaws.com/groups/global/AllUsers`).
        uri: String,
    },
}

/// URI of the `AllUsers` group used by public canned ACLs.
pub const ALL_USERS_GROUP: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// URI of the `AuthenticatedUsers` group.
pub const AUTHENTICATED_USERS_GROUP: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";

/// A permission that can be granted to a grantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Grants full control (READ, WRITE, READ_ACP, WRITE_ACP).
    FullControl,
    /// List objects in the bucket or read the object data.
    Read,
    /// Create objects in the bucket.
    Write,
    /// Read the bucket/object ACL.
    ReadAcp,
    /// Write the bucket/object ACL.
    WriteAcp,
}

impl Permission {
    /// Return the wire representation (`FULL_CONTROL`, `READ`, ...).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_CONTROL" => Ok(Self::FullControl),
            "READ" => Ok(Self::Read),
            "WRITE" => Ok(Self::Write),
            "READ_ACP" => Ok(Self::ReadAcp),
            "WRITE_ACP" => Ok(Self::WriteAcp),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

/// An ACL grant pairing a grantee with a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// The entity receiving the permission.
    pub grantee: Grantee,
    /// The permission granted.
    pub permission: Permission,
}

/// A full access control policy: owner plus grant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlPolicy {
    /// The resource owner.
    pub owner: Owner,
    /// The grants attached to the resource.
    pub grants: Vec<Grant>,
}

impl AccessControlPolicy {
    /// The policy produced by the `private` canned ACL for `owner`.
    #[must_use]
    pub fn private(owner: Owner) -> Self {
        let grants = vec![Grant {
            grantee: Grantee::CanonicalUser {
                id: owner.id.clone(),
                display_name: owner.display_name.clone(),
            },
            permission: Permission::FullControl,
        }];
        Self { owner, grants }
    }
}

/// Predefined (canned) ACLs accepted in the `x-amz-acl` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`; nobody else has access (default).
    #[default]
    Private,
    /// Owner gets `FULL_CONTROL`; `AllUsers` gets `READ`.
    PublicRead,
    /// Owner gets `FULL_CONTROL`; `AllUsers` gets `READ` and `WRITE`.
    PublicReadWrite,
    /// Owner gets `FULL_CONTROL`; `AuthenticatedUsers` gets `READ`.
    AuthenticatedRead,
    /// Object owner gets `FULL_CONTROL`; bucket owner gets `READ`.
    BucketOwnerRead,
    /// Object owner and bucket owner both get `FULL_CONTROL`.
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// Return the header representation of the canned ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }

    /// Expand this canned ACL into a concrete policy for `owner`.
    #[must_use]
    pub fn to_policy(self, owner: Owner) -> AccessControlPolicy {
        let mut policy = AccessControlPolicy::private(owner);
        match self {
            Self::Private | Self::BucketOwnerRead | Self::BucketOwnerFullControl => {}
            Self::PublicRead => policy.grants.push(Grant {
                grantee: Grantee::Group {
                    uri: ALL_USERS_GROUP.to_owned(),
                },
                permission: Permission::Read,
            }),
            Self::PublicReadWrite => {
                for permission in [Permission::Read, Permission::Write] {
                    policy.grants.push(Grant {
                        grantee: Grantee::Group {
                            uri: ALL_USERS_GROUP.to_owned(),
                        },
                        permission,
                    });
                }
            }
            Self::AuthenticatedRead => policy.grants.push(Grant {
                grantee: Grantee::Group {
                    uri: AUTHENTICATED_USERS_GROUP.to_owned(),
                },
                permission: Permission::Read,
            }),
        }
        policy
    }
}

impl FromStr for CannedAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            "public-read-write" => Ok(Self::PublicReadWrite),
            "authenticated-read" => Ok(Self::AuthenticatedRead),
            "bucket-owner-read" => Ok(Self::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(Self::BucketOwnerFullControl),
            other => Err(format!("unknown canned ACL: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tagging
// ---------------------------------------------------------------------------

/// A single key/value tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// The tag key (unique within a tag set).
    pub key: String,
    /// The tag value.
    pub value: String,
}

/// A set of tags, as carried by the `?tagging` subresource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tagging {
    /// The tags in the set.
    pub tag_set: Vec<Tag>,
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Bucket versioning status as carried on the wire. Absent means the bucket
/// has never had versioning configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketVersioningStatus {
    /// Versioning is enabled: each PUT creates a new version.
    Enabled,
    /// Versioning is suspended: new PUTs overwrite the `null` version.
    Suspended,
}

impl BucketVersioningStatus {
    /// Return the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Suspended => "Suspended",
        }
    }
}

impl FromStr for BucketVersioningStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(Self::Enabled),
            "Suspended" => Ok(Self::Suspended),
            other => Err(format!("unknown versioning status: {other}")),
        }
    }
}

/// The `VersioningConfiguration` document (request and response body).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningConfiguration {
    /// The versioning status; omitted when never configured.
    pub status: Option<BucketVersioningStatus>,
}

// ---------------------------------------------------------------------------
// Object lock / retention / legal hold
// ---------------------------------------------------------------------------

/// Retention mode for object lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectLockRetentionMode {
    /// Governance mode: privileged users may shorten or remove retention.
    Governance,
    /// Compliance mode: retention can never be shortened before expiry.
    Compliance,
}

impl ObjectLockRetentionMode {
    /// Return the wire representation (`GOVERNANCE` / `COMPLIANCE`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Governance => "GOVERNANCE",
            Self::Compliance => "COMPLIANCE",
        }
    }
}

impl FromStr for ObjectLockRetentionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOVERNANCE" => Ok(Self::Governance),
            "COMPLIANCE" => Ok(Self::Compliance),
            other => Err(format!("unknown retention mode: {other}")),
        }
    }
}

/// Per-object retention: mode plus retain-until instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockRetention {
    /// The retention mode.
    pub mode: ObjectLockRetentionMode,
    /// The instant until which the object version is locked.
    pub retain_until_date: DateTime<Utc>,
}

/// Legal hold status for an object version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegalHoldStatus {
    /// The legal hold is in effect.
    On,
    /// No legal hold.
    Off,
}

impl LegalHoldStatus {
    /// Return the wire representation (`ON` / `OFF`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl FromStr for LegalHoldStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            other => Err(format!("unknown legal hold status: {other}")),
        }
    }
}

/// The `LegalHold` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockLegalHold {
    /// The legal hold status.
    pub status: LegalHoldStatus,
}

/// Default retention applied to new objects by a bucket's object lock config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRetention {
    /// The retention mode for new objects.
    pub mode: ObjectLockRetentionMode,
    /// Retention period in days (mutually exclusive with `years`).
    pub days: Option<i32>,
    /// Retention period in years (mutually exclusive with `days`).
    pub years: Option<i32>,
}

/// The bucket-level `ObjectLockConfiguration` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockConfiguration {
    /// `Enabled` when object lock is active for the bucket.
    pub object_lock_enabled: Option<String>,
    /// Optional default retention rule.
    pub default_retention: Option<DefaultRetention>,
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Bucket object-ownership setting from `x-amz-object-ownership`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectOwnership {
    /// Bucket owner owns new objects written with `bucket-owner-full-control`.
    BucketOwnerPreferred,
    /// The writing account owns its objects.
    ObjectWriter,
    /// ACLs are disabled; the bucket owner owns everything.
    BucketOwnerEnforced,
}

impl ObjectOwnership {
    /// Return the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BucketOwnerPreferred => "BucketOwnerPreferred",
            Self::ObjectWriter => "ObjectWriter",
            Self::BucketOwnerEnforced => "BucketOwnerEnforced",
        }
    }
}

impl FromStr for ObjectOwnership {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BucketOwnerPreferred" => Ok(Self::BucketOwnerPreferred),
            "ObjectWriter" => Ok(Self::ObjectWriter),
            "BucketOwnerEnforced" => Ok(Self::BucketOwnerEnforced),
            other => Err(format!("unknown object ownership: {other}")),
        }
    }
}

/// The `OwnershipControls` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipControls {
    /// The ownership rules (S3 allows exactly one).
    pub rules: Vec<ObjectOwnership>,
}

// ---------------------------------------------------------------------------
// Server-side encryption
// ---------------------------------------------------------------------------

/// Server-side encryption algorithm markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerSideEncryption {
    /// SSE-S3 (`AES256`).
    Aes256,
    /// SSE-KMS (`aws:kms`).
    AwsKms,
}

impl ServerSideEncryption {
    /// Return the wire representation (`AES256` / `aws:kms`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256 => "AES256",
            Self::AwsKms => "aws:kms",
        }
    }
}

impl FromStr for ServerSideEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES256" => Ok(Self::Aes256),
            "aws:kms" => Ok(Self::AwsKms),
            other => Err(format!("unknown SSE algorithm: {other}")),
        }
    }
}

/// Default encryption applied by a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionByDefault {
    /// The default SSE algorithm.
    pub sse_algorithm: ServerSideEncryption,
    /// KMS key id when the algorithm is `aws:kms`.
    pub kms_master_key_id: Option<String>,
}

/// The `ServerSideEncryptionConfiguration` document (single-rule form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionConfiguration {
    /// The default encryption rule.
    pub rule: ServerSideEncryptionByDefault,
    /// Whether S3 bucket keys are enabled.
    pub bucket_key_enabled: Option<bool>,
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

/// One CORS rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsRule {
    /// Optional rule identifier.
    pub id: Option<String>,
    /// Origins the rule applies to.
    pub allowed_origins: Vec<String>,
    /// Methods the rule allows.
    pub allowed_methods: Vec<String>,
    /// Request headers the rule allows.
    pub allowed_headers: Vec<String>,
    /// Response headers exposed to the browser.
    pub expose_headers: Vec<String>,
    /// Preflight cache lifetime in seconds.
    pub max_age_seconds: Option<i32>,
}

/// The `CORSConfiguration` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfiguration {
    /// The rules in evaluation order.
    pub rules: Vec<CorsRule>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Whether a lifecycle rule is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpirationStatus {
    /// The rule applies.
    Enabled,
    /// The rule is retained but not applied.
    Disabled,
}

impl ExpirationStatus {
    /// Return the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }
}

impl FromStr for ExpirationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(Self::Enabled),
            "Disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown rule status: {other}")),
        }
    }
}

/// Expiration action of a lifecycle rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleExpiration {
    /// Expire after this many days.
    pub days: Option<i32>,
    /// Expire at this instant.
    pub date: Option<DateTime<Utc>>,
}

/// A single lifecycle rule (prefix-filtered expiration only; mocks3 stores
/// and returns rules but never executes them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRule {
    /// Rule identifier.
    pub id: Option<String>,
    /// Key prefix the rule applies to.
    pub prefix: Option<String>,
    /// Whether the rule is in effect.
    pub status: ExpirationStatus,
    /// The expiration action.
    pub expiration: Option<LifecycleExpiration>,
    /// Days after which noncurrent versions expire.
    pub noncurrent_days: Option<i32>,
}

/// The `LifecycleConfiguration` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketLifecycleConfiguration {
    /// The lifecycle rules.
    pub rules: Vec<LifecycleRule>,
}

// ---------------------------------------------------------------------------
// Listing entries
// ---------------------------------------------------------------------------

/// One bucket in a `ListBuckets` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry {
    /// The bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// One object in a `ListObjects(V2)` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// The object key.
    pub key: String,
    /// Last modification instant of the current version.
    pub last_modified: DateTime<Utc>,
    /// The quoted ETag.
    pub etag: String,
    /// Size in bytes.
    pub size: u64,
    /// The storage class (always `STANDARD`).
    pub storage_class: String,
    /// The object owner.
    pub owner: Option<Owner>,
}

/// One object version in a `ListObjectVersions` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersionEntry {
    /// The object key.
    pub key: String,
    /// The version id.
    pub version_id: String,
    /// Whether this is the latest version for its key.
    pub is_latest: bool,
    /// Last modification instant.
    pub last_modified: DateTime<Utc>,
    /// The quoted ETag (empty for delete markers).
    pub etag: String,
    /// Size in bytes (zero for delete markers).
    pub size: u64,
    /// The storage class.
    pub storage_class: String,
    /// The version owner.
    pub owner: Owner,
    /// Whether this entry is a delete marker.
    pub is_delete_marker: bool,
}

/// One in-progress upload in a `ListMultipartUploads` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUploadEntry {
    /// The destination key.
    pub key: String,
    /// The upload id.
    pub upload_id: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
    /// The storage class for the final object.
    pub storage_class: String,
    /// The upload owner.
    pub owner: Owner,
    /// The upload initiator (same as owner in mocks3).
    pub initiator: Owner,
}

/// One part in a `ListParts` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEntry {
    /// The part number (1-based).
    pub part_number: u32,
    /// When the part was uploaded.
    pub last_modified: DateTime<Utc>,
    /// The quoted ETag (hex MD5 of the part).
    pub etag: String,
    /// Part size in bytes.
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Multipart / batch-delete request bodies
// ---------------------------------------------------------------------------

/// One `(part number, ETag)` pair in a `CompleteMultipartUpload` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// The part number.
    pub part_number: u32,
    /// The ETag returned when the part was uploaded.
    pub etag: String,
}

/// The `CompleteMultipartUpload` request document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedMultipartUpload {
    /// The parts in the order they should be assembled.
    pub parts: Vec<CompletedPart>,
}

/// One object to remove in a batch `DeleteObjects` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentifier {
    /// The object key.
    pub key: String,
    /// Optional version id to remove.
    pub version_id: Option<String>,
}

/// The `Delete` request document of `DeleteObjects`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delete {
    /// The objects to remove.
    pub objects: Vec<ObjectIdentifier>,
    /// Quiet mode suppresses per-key success entries in the response.
    pub quiet: bool,
}

/// A successfully deleted object in a `DeleteResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedObject {
    /// The object key.
    pub key: String,
    /// The version id that was removed, if any.
    pub version_id: Option<String>,
    /// Whether the deletion created (or removed) a delete marker.
    pub delete_marker: Option<bool>,
    /// Version id of the delete marker, if one was created.
    pub delete_marker_version_id: Option<String>,
}

/// A per-key failure in a `DeleteResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteError {
    /// The object key.
    pub key: String,
    /// The S3 error code.
    pub code: String,
    /// The error message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// CreateBucket request body
// ---------------------------------------------------------------------------

/// The optional `CreateBucketConfiguration` request document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketConfiguration {
    /// The requested region.
    pub location_constraint: Option<String>,
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_expand_public_read_canned_acl() {
        let policy = CannedAcl::PublicRead.to_policy(Owner::default());
        assert_eq!(policy.grants.len(), 2);
        assert!(matches!(
            policy.grants[0].grantee,
            Grantee::CanonicalUser { .. }
        ));
        assert!(matches!(
            &policy.grants[1].grantee,
            Grantee::Group { uri } if uri == ALL_USERS_GROUP
        ));
        assert_eq!(policy.grants[1].permission, Permission::Read);
    }

    #[test]
    fn test_should_expand_private_canned_acl_to_owner_only() {
        let policy = CannedAcl::Private.to_policy(Owner::default());
        assert_eq!(policy.grants.len(), 1);
        assert_eq!(policy.grants[0].permission, Permission::FullControl);
    }

    #[test]
    fn test_should_parse_canned_acl_strings() {
        assert_eq!(
            "public-read-write".parse::<CannedAcl>(),
            Ok(CannedAcl::PublicReadWrite)
        );
        assert!("PUBLIC-READ".parse::<CannedAcl>().is_err());
    }

    #[test]
    fn test_should_round_trip_versioning_status_strings() {
        for status in [
            BucketVersioningStatus::Enabled,
            BucketVersioningStatus::Suspended,
        ] {
            assert_eq!(status.as_str().parse::<BucketVersioningStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_should_parse_retention_mode() {
        assert_eq!(
            "COMPLIANCE".parse::<ObjectLockRetentionMode>(),
            Ok(ObjectLockRetentionMode::Compliance)
        );
        assert!("compliance".parse::<ObjectLockRetentionMode>().is_err());
    }

    #[test]
    fn test_should_render_sse_algorithms() {
        assert_eq!(ServerSideEncryption::Aes256.as_str(), "AES256");
        assert_eq!(ServerSideEncryption::AwsKms.as_str(), "aws:kms");
    }
}
