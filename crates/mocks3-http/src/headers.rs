//! Converters for structured S3 request headers.
//!
//! Malformed header values map to `InvalidRequest` with a descriptive
//! message; a well-formed but unsatisfiable `Range` maps to `InvalidRange`
//! so the caller can answer 416.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

use mocks3_model::error::S3Error;
use mocks3_model::s3_error;
use mocks3_model::types::{CannedAcl, ObjectOwnership, Tag};

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A satisfiable byte range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive), clamped to the object size.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether the range is empty (cannot happen for a parsed range).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Render the `Content-Range` header value for an object of `total` bytes.
    #[must_use]
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// Parse a `Range` header against an object of `size` bytes.
///
/// Supports the `bytes=a-b`, `bytes=a-`, and `bytes=-n` forms. Multi-range
/// requests are not supported and are rejected as malformed.
///
/// # Errors
///
/// - `InvalidRequest` when the header does not parse;
/// - `InvalidRange` when the range is syntactically fine but unsatisfiable
///   for the given size.
pub fn parse_range(header: &str, size: u64) -> Result<ByteRange, S3Error> {
    let spec = header
        .strip_prefix("bytes=")
        .ok_or_else(|| S3Error::invalid_request(format!("Unsupported Range unit: {header}")))?;

    if spec.contains(',') {
        return Err(S3Error::invalid_request(
            "Multiple byte ranges are not supported",
        ));
    }

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| S3Error::invalid_request(format!("Malformed Range: {header}")))?;

    let parse_bound = |s: &str| -> Result<u64, S3Error> {
        s.parse()
            .map_err(|_| S3Error::invalid_request(format!("Malformed Range: {header}")))
    };

    let range = match (start_str.is_empty(), end_str.is_empty()) {
        // bytes=-n : final n bytes.
        (true, false) => {
            let suffix_len = parse_bound(end_str)?;
            if suffix_len == 0 || size == 0 {
                return Err(s3_error!(InvalidRange));
            }
            let start = size.saturating_sub(suffix_len);
            ByteRange {
                start,
                end: size - 1,
            }
        }
        // bytes=a- : from a to the end.
        (false, true) => {
            let start = parse_bound(start_str)?;
            if start >= size {
                return Err(s3_error!(InvalidRange));
            }
            ByteRange {
                start,
                end: size - 1,
            }
        }
        // bytes=a-b.
        (false, false) => {
            let start = parse_bound(start_str)?;
            let end = parse_bound(end_str)?;
            if start > end {
                return Err(S3Error::invalid_request(format!("Malformed Range: {header}")));
            }
            if start >= size {
                return Err(s3_error!(InvalidRange));
            }
            ByteRange {
                start,
                end: end.min(size - 1),
            }
        }
        (true, true) => {
            return Err(S3Error::invalid_request(format!("Malformed Range: {header}")));
        }
    };

    Ok(range)
}

// ---------------------------------------------------------------------------
// x-amz-tagging
// ---------------------------------------------------------------------------

/// Parse the URL-encoded `x-amz-tagging` header (`k1=v1&k2=v2`).
///
/// Structural limits (pair count, key/value length, duplicate keys) are
/// enforced by the store's validation layer; this only decodes the format.
///
/// # Errors
///
/// Returns `InvalidRequest` if a pair cannot be decoded.
pub fn parse_tagging_header(header: &str) -> Result<Vec<Tag>, S3Error> {
    let mut tags = Vec::new();
    for pair in header.split('&').filter(|s| !s.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = percent_decode_str(raw_key)
            .decode_utf8()
            .map_err(|_| S3Error::invalid_request("Tag key is not valid UTF-8"))?
            .into_owned();
        let value = percent_decode_str(raw_value)
            .decode_utf8()
            .map_err(|_| S3Error::invalid_request("Tag value is not valid UTF-8"))?
            .into_owned();
        if key.is_empty() {
            return Err(S3Error::invalid_request("Tag key must not be empty"));
        }
        tags.push(Tag { key, value });
    }
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Canned ACL / ownership
// ---------------------------------------------------------------------------

/// Parse the `x-amz-acl` header.
///
/// # Errors
///
/// Returns `InvalidRequest` for unknown canned ACL names.
pub fn parse_canned_acl(header: &str) -> Result<CannedAcl, S3Error> {
    CannedAcl::from_str(header)
        .map_err(|_| S3Error::invalid_request(format!("Unknown canned ACL: {header}")))
}

/// Parse the `x-amz-object-ownership` header.
///
/// # Errors
///
/// Returns `InvalidRequest` for unknown ownership values.
pub fn parse_object_ownership(header: &str) -> Result<ObjectOwnership, S3Error> {
    ObjectOwnership::from_str(header)
        .map_err(|_| S3Error::invalid_request(format!("Unknown object ownership: {header}")))
}

// ---------------------------------------------------------------------------
// Copy source
// ---------------------------------------------------------------------------

/// A parsed `x-amz-copy-source` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    /// The source bucket.
    pub bucket: String,
    /// The source key.
    pub key: String,
    /// Optional source version id.
    pub version_id: Option<String>,
}

/// Parse `x-amz-copy-source`: `[/]bucket/key[?versionId=id]`.
///
/// # Errors
///
/// Returns `InvalidRequest` when the value has no key component.
pub fn parse_copy_source(header: &str) -> Result<CopySource, S3Error> {
    let (path, version_id) = match header.split_once('?') {
        Some((path, query)) => {
            let version_id = query
                .split('&')
                .find_map(|p| p.strip_prefix("versionId="))
                .map(|v| decode(v));
            (path, version_id)
        }
        None => (header, None),
    };

    let path = path.strip_prefix('/').unwrap_or(path);
    let (bucket, key) = path.split_once('/').ok_or_else(|| {
        S3Error::invalid_request(format!("Invalid copy source: {header}"))
    })?;
    if bucket.is_empty() || key.is_empty() {
        return Err(S3Error::invalid_request(format!(
            "Invalid copy source: {header}"
        )));
    }

    Ok(CopySource {
        bucket: decode(bucket),
        key: decode(key),
        version_id,
    })
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Metadata / tagging directives
// ---------------------------------------------------------------------------

/// The `x-amz-metadata-directive` / `x-amz-tagging-directive` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Directive {
    /// Copy the attribute set from the source object.
    #[default]
    Copy,
    /// Take the attribute set from the copy request's own headers.
    Replace,
}

impl FromStr for Directive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COPY" => Ok(Self::Copy),
            "REPLACE" => Ok(Self::Replace),
            other => Err(format!("unknown directive: {other}")),
        }
    }
}

/// Parse a directive header, defaulting to `COPY` when absent.
///
/// # Errors
///
/// Returns `InvalidRequest` for values other than `COPY`/`REPLACE`.
pub fn parse_directive(header: Option<&str>) -> Result<Directive, S3Error> {
    match header {
        None => Ok(Directive::Copy),
        Some(value) => Directive::from_str(value)
            .map_err(|_| S3Error::invalid_request(format!("Invalid directive: {value}"))),
    }
}

// ---------------------------------------------------------------------------
// HTTP dates
// ---------------------------------------------------------------------------

/// Parse an HTTP date in any of the formats S3 clients send.
#[must_use]
pub fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT")
        .ok()
        .map(|n| n.and_utc())
}

/// Render a `DateTime` as an HTTP date header value.
#[must_use]
pub fn format_http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use mocks3_model::error::S3ErrorCode;

    use super::*;

    // --- Range ---

    #[test]
    fn test_should_parse_closed_range() {
        let range = parse_range("bytes=0-0", 2).expect("parse");
        assert_eq!(range, ByteRange { start: 0, end: 0 });
        assert_eq!(range.len(), 1);
        assert_eq!(range.content_range(2), "bytes 0-0/2");
    }

    #[test]
    fn test_should_clamp_range_end_to_object_size() {
        let range = parse_range("bytes=5-999", 10).expect("parse");
        assert_eq!(range, ByteRange { start: 5, end: 9 });
    }

    #[test]
    fn test_should_parse_open_and_suffix_ranges() {
        assert_eq!(
            parse_range("bytes=3-", 10).expect("parse"),
            ByteRange { start: 3, end: 9 }
        );
        assert_eq!(
            parse_range("bytes=-4", 10).expect("parse"),
            ByteRange { start: 6, end: 9 }
        );
        // A suffix longer than the object covers the whole object.
        assert_eq!(
            parse_range("bytes=-100", 10).expect("parse"),
            ByteRange { start: 0, end: 9 }
        );
    }

    #[test]
    fn test_should_reject_unsatisfiable_range_with_416_code() {
        let err = parse_range("bytes=10-20", 10).expect_err("should fail");
        assert_eq!(err.code, S3ErrorCode::InvalidRange);
        let err = parse_range("bytes=0-", 0).expect_err("empty object");
        assert_eq!(err.code, S3ErrorCode::InvalidRange);
    }

    #[test]
    fn test_should_reject_malformed_range_as_invalid_request() {
        for header in ["bytes=", "bytes=a-b", "bytes=5-2", "items=0-1", "bytes=1-2,4-5"] {
            let err = parse_range(header, 10).expect_err(header);
            assert_eq!(err.code, S3ErrorCode::InvalidRequest, "header {header}");
        }
    }

    // --- Tagging ---

    #[test]
    fn test_should_parse_tagging_header_pairs() {
        let tags = parse_tagging_header("env=prod&team=storage%20infra").expect("parse");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].value, "storage infra");
    }

    #[test]
    fn test_should_reject_empty_tag_key() {
        assert!(parse_tagging_header("=value").is_err());
    }

    // --- Copy source ---

    #[test]
    fn test_should_parse_copy_source_with_version() {
        let src = parse_copy_source("/src-bucket/a%2Fb?versionId=v7").expect("parse");
        assert_eq!(src.bucket, "src-bucket");
        assert_eq!(src.key, "a/b");
        assert_eq!(src.version_id.as_deref(), Some("v7"));
    }

    #[test]
    fn test_should_parse_copy_source_without_leading_slash() {
        let src = parse_copy_source("bucket/deep/key").expect("parse");
        assert_eq!(src.bucket, "bucket");
        assert_eq!(src.key, "deep/key");
        assert!(src.version_id.is_none());
    }

    #[test]
    fn test_should_reject_copy_source_without_key() {
        assert!(parse_copy_source("/bucket-only").is_err());
    }

    // --- Directives / enums ---

    #[test]
    fn test_should_default_directive_to_copy() {
        assert_eq!(parse_directive(None).expect("parse"), Directive::Copy);
        assert_eq!(
            parse_directive(Some("REPLACE")).expect("parse"),
            Directive::Replace
        );
        assert!(parse_directive(Some("replace")).is_err());
    }

    #[test]
    fn test_should_parse_canned_acl_and_ownership() {
        assert_eq!(
            parse_canned_acl("public-read").expect("parse"),
            CannedAcl::PublicRead
        );
        assert!(parse_canned_acl("shared").is_err());
        assert_eq!(
            parse_object_ownership("BucketOwnerEnforced").expect("parse"),
            ObjectOwnership::BucketOwnerEnforced
        );
    }

    // --- Dates ---

    #[test]
    fn test_should_parse_rfc2822_http_date() {
        let dt = parse_http_date("Sat, 01 Feb 2025 10:30:00 GMT").expect("parse");
        assert_eq!(format_http_date(&dt), "Sat, 01 Feb 2025 10:30:00 GMT");
    }
}
