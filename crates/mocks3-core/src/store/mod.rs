//! Filesystem-backed stores.
//!
//! On-disk layout, everything under a single root directory owned by the
//! process:
//!
//! ```text
//! <root>/
//!   <bucket>/
//!     bucketMetadata.json
//!     <key-segment>/
//!       currentVersion
//!       <versionId>/
//!         binaryData
//!         objectMetadata.json
//!       uploads/
//!         <uploadId>/
//!           uploadMetadata.json
//!           parts/<partNumber>
//!           parts/<partNumber>.md5
//! ```
//!
//! Sidecars are JSON; every sidecar and data write goes through a temp file
//! followed by an atomic rename, so concurrent readers never observe a
//! partially-written file.

pub mod bucket;
pub mod meta;
pub mod multipart;
pub mod object;

pub use bucket::BucketStore;
pub use meta::{
    BucketMetadata, ObjectVersionMeta, SseInfo, SystemMetadata, UploadMetadata, VersioningState,
};
pub use multipart::MultipartStore;
pub use object::{IntegrityChecks, ObjectStore, WriteOutcome};
