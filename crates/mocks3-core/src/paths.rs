//! Mapping object keys and version ids onto the filesystem.
//!
//! Keys may contain any byte, including `/`, so each key becomes a single
//! percent-encoded path segment. Keys whose encoding would exceed common
//! filename limits fall back to a digest-based segment; the true key is
//! always recoverable from the version's metadata sidecar, so segment names
//! never need to be decoded.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

/// Everything except unreserved characters is encoded, so a segment is a
/// valid single filename on any platform.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Longest encoded segment stored verbatim. Chosen comfortably below the
/// 255-byte filename limit of common filesystems.
const MAX_SEGMENT_LEN: usize = 180;

/// Name of the staging directory inside a key directory.
pub const UPLOADS_DIR: &str = "uploads";

/// Name of the file recording the current version id of a key.
pub const CURRENT_VERSION_FILE: &str = "currentVersion";

/// Name of the object-bytes file inside a version directory.
pub const BINARY_DATA_FILE: &str = "binaryData";

/// Name of the object metadata sidecar inside a version directory.
pub const OBJECT_METADATA_FILE: &str = "objectMetadata.json";

/// Name of the bucket metadata sidecar inside a bucket directory.
pub const BUCKET_METADATA_FILE: &str = "bucketMetadata.json";

/// Name of the upload metadata sidecar inside a staging directory.
pub const UPLOAD_METADATA_FILE: &str = "uploadMetadata.json";

/// The sentinel version id used when versioning is off or suspended.
pub const NULL_VERSION_ID: &str = "null";

/// Encode an object key as a single directory name.
///
/// Deterministic: the same key always maps to the same segment. Overlong
/// keys hash to `long~<sha256-hex>`.
///
/// # Examples
///
/// ```
/// use mocks3_core::paths::key_segment;
///
/// assert_eq!(key_segment("a/b c"), "a%2Fb%20c");
/// ```
#[must_use]
pub fn key_segment(key: &str) -> String {
    let encoded = utf8_percent_encode(key, KEY_SEGMENT).to_string();
    if encoded.len() <= MAX_SEGMENT_LEN {
        encoded
    } else {
        format!("long~{}", hex::encode(Sha256::digest(key.as_bytes())))
    }
}

/// Allocate a fresh version id: 12 hex digits of epoch-millis followed by
/// 8 random hex digits. Sorting ids descending yields newest-first order.
#[must_use]
pub fn new_version_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let entropy = u32::from_be_bytes(
        uuid::Uuid::new_v4().as_bytes()[..4]
            .try_into()
            .unwrap_or_default(),
    );
    format!("{millis:012x}{entropy:08x}")
}

/// Allocate a fresh upload id.
#[must_use]
pub fn new_upload_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_encode_slashes_and_spaces_into_one_segment() {
        let segment = key_segment("photos/2024/img 1.jpg");
        assert!(!segment.contains('/'));
        assert!(!segment.contains(' '));
        assert_eq!(segment, "photos%2F2024%2Fimg%201.jpg");
    }

    #[test]
    fn test_should_keep_unreserved_characters_verbatim() {
        assert_eq!(key_segment("simple-key_1.txt~bak"), "simple-key_1.txt~bak");
    }

    #[test]
    fn test_should_hash_overlong_keys_deterministically() {
        let key = "k".repeat(1024);
        let segment = key_segment(&key);
        assert!(segment.starts_with("long~"));
        assert!(segment.len() < 255);
        assert_eq!(segment, key_segment(&key));
        assert_ne!(segment, key_segment(&"j".repeat(1024)));
    }

    #[test]
    fn test_should_generate_time_sortable_version_ids() {
        let v1 = new_version_id();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let v2 = new_version_id();
        assert!(v2 > v1, "later id must sort after earlier: {v1} vs {v2}");
        assert_eq!(v1.len(), 20);
    }

    #[test]
    fn test_should_generate_unique_upload_ids() {
        assert_ne!(new_upload_id(), new_upload_id());
    }
}
