//! Checksum computation for objects and multipart parts.
//!
//! MD5 is always computed (it is the ETag); the `x-amz-sdk-checksum-algorithm`
//! header may additionally request CRC32, CRC32C, SHA-1, or SHA-256, recorded
//! base64-encoded on the object version.
//!
//! Bodies are hashed while they stream to disk, so [`StreamingHasher`] is the
//! primary interface; the whole-buffer functions exist for small inputs and
//! tests.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use digest::Digest;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChecksumAlgorithm
// ---------------------------------------------------------------------------

/// The additional checksum algorithms S3 supports (MD5 excluded; it is
/// always computed for the ETag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    /// CRC-32 (IEEE 802.3).
    Crc32,
    /// CRC-32C (Castagnoli).
    Crc32c,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl ChecksumAlgorithm {
    /// The canonical header representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "CRC32",
            Self::Crc32c => "CRC32C",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }

    /// The `x-amz-checksum-*` response header name for this algorithm.
    #[must_use]
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Crc32 => "x-amz-checksum-crc32",
            Self::Crc32c => "x-amz-checksum-crc32c",
            Self::Sha1 => "x-amz-checksum-sha1",
            Self::Sha256 => "x-amz-checksum-sha256",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`ChecksumAlgorithm`] fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown checksum algorithm: {0}")]
pub struct ParseChecksumAlgorithmError(String);

impl FromStr for ChecksumAlgorithm {
    type Err = ParseChecksumAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CRC32" => Ok(Self::Crc32),
            "CRC32C" => Ok(Self::Crc32c),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            _ => Err(ParseChecksumAlgorithmError(s.to_owned())),
        }
    }
}

/// A base64-encoded checksum paired with its algorithm, as stored on an
/// object version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumValue {
    /// The algorithm that produced the value.
    pub algorithm: ChecksumAlgorithm,
    /// The base64-encoded checksum.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Whole-buffer helpers
// ---------------------------------------------------------------------------

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use mocks3_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hi"), "49f68a5c8493ec2c0bf489821c21fc3b");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

/// Compute the quoted ETag for a single-part object.
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Compute a multipart composite ETag from the parts' unquoted hex MD5s:
/// `"hex(md5(concat(md5_bytes(part_i))))-<partCount>"`.
#[must_use]
pub fn compute_multipart_etag(part_md5_hexes: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_md5_hexes.len() * 16);
    for hex_str in part_md5_hexes {
        if let Ok(bytes) = hex::decode(hex_str.as_ref().trim_matches('"')) {
            combined.extend_from_slice(&bytes);
        }
    }
    let digest = hex::encode(md5::Md5::digest(&combined));
    format!("\"{digest}-{}\"", part_md5_hexes.len())
}

/// Compute a base64-encoded checksum of `data` with the given algorithm.
#[must_use]
pub fn compute_checksum(algorithm: ChecksumAlgorithm, data: &[u8]) -> String {
    let mut hasher = StreamingHasher::new(Some(algorithm));
    hasher.update(data);
    hasher
        .finalize()
        .checksum
        .map(|c| c.value)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// StreamingHasher
// ---------------------------------------------------------------------------

/// State of one of the optional checksum algorithms.
enum ChecksumState {
    Crc32(crc32fast::Hasher),
    Crc32c(u32),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
}

/// Incremental hasher computing MD5 plus at most one additional checksum in
/// a single pass over the streamed bytes.
pub struct StreamingHasher {
    md5: md5::Md5,
    size: u64,
    checksum: Option<(ChecksumAlgorithm, ChecksumState)>,
}

/// The digests produced by a [`StreamingHasher`].
#[derive(Debug, Clone)]
pub struct HasherResult {
    /// Unquoted hex MD5 of the bytes.
    pub md5_hex: String,
    /// Total number of bytes hashed.
    pub size: u64,
    /// The requested additional checksum, if any.
    pub checksum: Option<ChecksumValue>,
}

impl HasherResult {
    /// The quoted ETag for the hashed bytes.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.md5_hex)
    }
}

impl StreamingHasher {
    /// Create a hasher, optionally tracking an additional algorithm.
    #[must_use]
    pub fn new(algorithm: Option<ChecksumAlgorithm>) -> Self {
        let checksum = algorithm.map(|alg| {
            let state = match alg {
                ChecksumAlgorithm::Crc32 => ChecksumState::Crc32(crc32fast::Hasher::new()),
                ChecksumAlgorithm::Crc32c => ChecksumState::Crc32c(0),
                ChecksumAlgorithm::Sha1 => ChecksumState::Sha1(sha1::Sha1::new()),
                ChecksumAlgorithm::Sha256 => ChecksumState::Sha256(sha2::Sha256::new()),
            };
            (alg, state)
        });
        Self {
            md5: md5::Md5::new(),
            size: 0,
            checksum,
        }
    }

    /// Feed a chunk of data.
    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.size += data.len() as u64;
        if let Some((_, state)) = &mut self.checksum {
            match state {
                ChecksumState::Crc32(hasher) => hasher.update(data),
                ChecksumState::Crc32c(crc) => *crc = crc32c::crc32c_append(*crc, data),
                ChecksumState::Sha1(hasher) => hasher.update(data),
                ChecksumState::Sha256(hasher) => hasher.update(data),
            }
        }
    }

    /// Finish hashing and return all digests.
    #[must_use]
    pub fn finalize(self) -> HasherResult {
        let md5_hex = hex::encode(self.md5.finalize());
        let checksum = self.checksum.map(|(algorithm, state)| {
            let value = match state {
                ChecksumState::Crc32(hasher) => {
                    BASE64_STANDARD.encode(hasher.finalize().to_be_bytes())
                }
                ChecksumState::Crc32c(crc) => BASE64_STANDARD.encode(crc.to_be_bytes()),
                ChecksumState::Sha1(hasher) => BASE64_STANDARD.encode(hasher.finalize()),
                ChecksumState::Sha256(hasher) => BASE64_STANDARD.encode(hasher.finalize()),
            };
            ChecksumValue { algorithm, value }
        });
        HasherResult {
            md5_hex,
            size: self.size,
            checksum,
        }
    }
}

/// Decode a `Content-MD5` header (base64 of the 16 MD5 bytes) into hex.
///
/// # Errors
///
/// Returns `None` when the value is not base64 or not 16 bytes long; the
/// caller maps that to `InvalidDigest`.
#[must_use]
pub fn content_md5_to_hex(header: &str) -> Option<String> {
    let bytes = BASE64_STANDARD.decode(header).ok()?;
    if bytes.len() != 16 {
        return None;
    }
    Some(hex::encode(bytes))
}
