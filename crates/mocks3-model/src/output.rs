//! Response DTOs for operations that return an XML body.
//!
//! Header-only responses (PutObject, DeleteObject, ...) do not have DTOs
//! here; the HTTP layer builds them directly from store results.

use chrono::{DateTime, Utc};

use crate::types::{
    BucketEntry, DeleteError, DeletedObject, MultipartUploadEntry, ObjectEntry,
    ObjectVersionEntry, Owner, PartEntry,
};

/// `ListAllMyBucketsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketsOutput {
    /// The account owner.
    pub owner: Option<Owner>,
    /// All buckets, sorted by name.
    pub buckets: Vec<BucketEntry>,
}

/// `LocationConstraint` response of GetBucketLocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBucketLocationOutput {
    /// The advertised region; empty for `us-east-1` per S3 convention.
    pub location_constraint: Option<String>,
}

/// `ListBucketResult` for ListObjects (V1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsOutput {
    /// The bucket name.
    pub name: String,
    /// The requested prefix.
    pub prefix: Option<String>,
    /// The requested marker.
    pub marker: Option<String>,
    /// The requested delimiter.
    pub delimiter: Option<String>,
    /// The effective max-keys.
    pub max_keys: i32,
    /// Whether more keys remain.
    pub is_truncated: bool,
    /// Marker for the next page (only when truncated and a delimiter is set).
    pub next_marker: Option<String>,
    /// The objects on this page.
    pub contents: Vec<ObjectEntry>,
    /// Collapsed common prefixes.
    pub common_prefixes: Vec<String>,
}

/// `ListBucketResult` for ListObjectsV2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsV2Output {
    /// The bucket name.
    pub name: String,
    /// The requested prefix.
    pub prefix: Option<String>,
    /// The requested delimiter.
    pub delimiter: Option<String>,
    /// The effective max-keys.
    pub max_keys: i32,
    /// Keys plus common prefixes on this page.
    pub key_count: i32,
    /// Whether more keys remain.
    pub is_truncated: bool,
    /// The continuation token this page was requested with.
    pub continuation_token: Option<String>,
    /// Opaque token for the next page.
    pub next_continuation_token: Option<String>,
    /// The requested start-after key.
    pub start_after: Option<String>,
    /// The objects on this page.
    pub contents: Vec<ObjectEntry>,
    /// Collapsed common prefixes.
    pub common_prefixes: Vec<String>,
}

/// `ListVersionsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectVersionsOutput {
    /// The bucket name.
    pub name: String,
    /// The requested prefix.
    pub prefix: Option<String>,
    /// The requested delimiter.
    pub delimiter: Option<String>,
    /// The requested key marker.
    pub key_marker: Option<String>,
    /// The requested version-id marker.
    pub version_id_marker: Option<String>,
    /// Key marker for the next page.
    pub next_key_marker: Option<String>,
    /// Version-id marker for the next page.
    pub next_version_id_marker: Option<String>,
    /// The effective max-keys.
    pub max_keys: i32,
    /// Whether more entries remain.
    pub is_truncated: bool,
    /// Object versions and delete markers, newest first per key.
    pub versions: Vec<ObjectVersionEntry>,
    /// Collapsed common prefixes.
    pub common_prefixes: Vec<String>,
}

/// `ListMultipartUploadsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMultipartUploadsOutput {
    /// The bucket name.
    pub bucket: String,
    /// The requested key marker.
    pub key_marker: Option<String>,
    /// The requested upload-id marker.
    pub upload_id_marker: Option<String>,
    /// Key marker for the next page.
    pub next_key_marker: Option<String>,
    /// Upload-id marker for the next page.
    pub next_upload_id_marker: Option<String>,
    /// The effective max-uploads.
    pub max_uploads: i32,
    /// Whether more uploads remain.
    pub is_truncated: bool,
    /// The in-progress uploads.
    pub uploads: Vec<MultipartUploadEntry>,
}

/// `ListPartsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPartsOutput {
    /// The bucket name.
    pub bucket: String,
    /// The destination key.
    pub key: String,
    /// The upload id.
    pub upload_id: String,
    /// The requested part-number marker.
    pub part_number_marker: Option<u32>,
    /// Part-number marker for the next page.
    pub next_part_number_marker: Option<u32>,
    /// The effective max-parts.
    pub max_parts: i32,
    /// Whether more parts remain.
    pub is_truncated: bool,
    /// The parts on this page, ascending by part number.
    pub parts: Vec<PartEntry>,
    /// The upload initiator.
    pub initiator: Option<Owner>,
    /// The upload owner.
    pub owner: Option<Owner>,
    /// The storage class for the final object.
    pub storage_class: String,
}

/// `InitiateMultipartUploadResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateMultipartUploadOutput {
    /// The bucket name.
    pub bucket: String,
    /// The destination key.
    pub key: String,
    /// The allocated upload id.
    pub upload_id: String,
}

/// `CompleteMultipartUploadResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUploadOutput {
    /// Location URL of the assembled object.
    pub location: String,
    /// The bucket name.
    pub bucket: String,
    /// The object key.
    pub key: String,
    /// The composite ETag (`"<md5-of-md5s>-<partCount>"`).
    pub etag: String,
}

/// `CopyObjectResult` (also used as `CopyPartResult`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectResult {
    /// ETag of the new object or part.
    pub etag: String,
    /// Last-modified instant of the new object or part.
    pub last_modified: DateTime<Utc>,
}

/// `DeleteResult` of the batch DeleteObjects operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectsOutput {
    /// Successfully removed objects (empty in quiet mode).
    pub deleted: Vec<DeletedObject>,
    /// Per-key failures.
    pub errors: Vec<DeleteError>,
}
