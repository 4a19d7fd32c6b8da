//! Request-shape validation: bucket names, keys, tags, user metadata.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use mocks3_model::types::Tag;

use crate::error::S3ServiceError;

/// Maximum number of tags on a single object or bucket.
const MAX_TAGS: usize = 10;

/// Maximum tag key length in characters.
const MAX_TAG_KEY_LEN: usize = 128;

/// Maximum tag value length in characters.
const MAX_TAG_VALUE_LEN: usize = 256;

/// Maximum total size in bytes of user metadata keys and values.
const MAX_METADATA_SIZE: usize = 2048;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Bucket name length bounds.
const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate an S3 bucket name.
///
/// Rules: 3-63 characters; lowercase letters, digits, hyphens, and dots
/// only; starts and ends with a letter or digit; no adjacent dots; not
/// shaped like an IPv4 address.
///
/// # Errors
///
/// Returns [`S3ServiceError::InvalidBucketName`] naming the violated rule.
///
/// # Examples
///
/// ```
/// use mocks3_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-bucket.v2").is_ok());
/// assert!(validate_bucket_name("No").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), S3ServiceError> {
    let invalid = |reason: String| S3ServiceError::InvalidBucketName {
        name: name.to_owned(),
        reason,
    };

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&name.len()) {
        return Err(invalid(format!(
            "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
        )));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            "bucket name must only contain lowercase letters, digits, hyphens, and dots"
                .to_owned(),
        ));
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[name.len() - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(invalid(
            "bucket name must start and end with a letter or digit".to_owned(),
        ));
    }

    if name.contains("..") {
        return Err(invalid("bucket name must not contain adjacent dots".to_owned()));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid(
            "bucket name must not be formatted as an IP address".to_owned(),
        ));
    }

    Ok(())
}

/// Validate an object key: 1-1024 bytes of UTF-8 (any characters,
/// including `/` and other non-URI-safe bytes).
///
/// # Errors
///
/// Returns `InvalidArgument` for empty keys and `KeyTooLong` past 1024
/// bytes.
pub fn validate_object_key(key: &str) -> Result<(), S3ServiceError> {
    if key.is_empty() {
        return Err(S3ServiceError::InvalidArgument {
            message: "object key must not be empty".to_owned(),
        });
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(S3ServiceError::KeyTooLong);
    }
    Ok(())
}

/// Validate a tag set: at most 10 tags, unique keys, key 1-128 chars,
/// value 0-256 chars.
///
/// # Errors
///
/// Returns [`S3ServiceError::InvalidTag`] naming the violated rule.
pub fn validate_tags(tags: &[Tag]) -> Result<(), S3ServiceError> {
    let invalid = |message: String| S3ServiceError::InvalidTag { message };

    if tags.len() > MAX_TAGS {
        return Err(invalid(format!(
            "a tag set may contain at most {MAX_TAGS} tags, got {}",
            tags.len()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for tag in tags {
        if tag.key.is_empty() {
            return Err(invalid("tag key must not be empty".to_owned()));
        }
        if tag.key.chars().count() > MAX_TAG_KEY_LEN {
            return Err(invalid(format!(
                "tag key must not exceed {MAX_TAG_KEY_LEN} characters"
            )));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(invalid(format!(
                "tag value must not exceed {MAX_TAG_VALUE_LEN} characters"
            )));
        }
        if !seen.insert(tag.key.as_str()) {
            return Err(invalid(format!("duplicate tag key: {}", tag.key)));
        }
    }
    Ok(())
}

/// Validate user metadata: total size of keys plus values at most 2 KiB.
///
/// # Errors
///
/// Returns [`S3ServiceError::MetadataTooLarge`] when over budget.
pub fn validate_user_metadata(metadata: &HashMap<String, String>) -> Result<(), S3ServiceError> {
    let total: usize = metadata.iter().map(|(k, v)| k.len() + v.len()).sum();
    if total > MAX_METADATA_SIZE {
        return Err(S3ServiceError::MetadataTooLarge);
    }
    Ok(())
}
