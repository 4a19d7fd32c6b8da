//! The S3 wire-level error model.
//!
//! [`S3Error`] is what ultimately crosses the HTTP boundary: an error code,
//! a human-readable message, the resource that caused it, and the HTTP status
//! to respond with. Domain layers construct these directly or convert their
//! own error enums into them; the XML envelope rendering lives in
//! `mocks3-xml`.

use std::fmt;

/// Well-known S3 error codes produced by mocks3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// AccessDenied error.
    AccessDenied,
    /// BadDigest error.
    BadDigest,
    /// BucketAlreadyExists error.
    BucketAlreadyExists,
    /// BucketAlreadyOwnedByYou error.
    BucketAlreadyOwnedByYou,
    /// BucketNotEmpty error.
    BucketNotEmpty,
    /// EntityTooSmall error.
    EntityTooSmall,
    /// InternalError error.
    InternalError,
    /// InvalidArgument error.
    InvalidArgument,
    /// InvalidBucketName error.
    InvalidBucketName,
    /// InvalidDigest error.
    InvalidDigest,
    /// InvalidPart error.
    InvalidPart,
    /// InvalidPartOrder error.
    InvalidPartOrder,
    /// InvalidRange error.
    InvalidRange,
    /// InvalidRequest error.
    InvalidRequest,
    /// InvalidTag error.
    InvalidTag,
    /// KeyTooLongError error.
    KeyTooLongError,
    /// KMS key lookup failure (`KMS.NotFoundException`).
    KmsNotFound,
    /// MalformedXML error.
    MalformedXML,
    /// MetadataTooLarge error.
    MetadataTooLarge,
    /// MethodNotAllowed error.
    MethodNotAllowed,
    /// NoSuchBucket error.
    NoSuchBucket,
    /// NoSuchBucketPolicy error.
    NoSuchBucketPolicy,
    /// NoSuchCORSConfiguration error.
    NoSuchCORSConfiguration,
    /// NoSuchKey error.
    NoSuchKey,
    /// NoSuchLifecycleConfiguration error.
    NoSuchLifecycleConfiguration,
    /// NoSuchObjectLockConfiguration error.
    NoSuchObjectLockConfiguration,
    /// NoSuchTagSet error.
    NoSuchTagSet,
    /// NoSuchUpload error.
    NoSuchUpload,
    /// NoSuchVersion error.
    NoSuchVersion,
    /// NotImplemented error.
    NotImplemented,
    /// NotModified pseudo-error (HTTP 304, empty body).
    NotModified,
    /// OwnershipControlsNotFoundError error.
    OwnershipControlsNotFoundError,
    /// PreconditionFailed error.
    PreconditionFailed,
    /// ServerSideEncryptionConfigurationNotFoundError error.
    ServerSideEncryptionConfigurationNotFoundError,
}

impl S3ErrorCode {
    /// Returns the error code as it appears in the `<Code>` element.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::BadDigest => "BadDigest",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::EntityTooSmall => "EntityTooSmall",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidDigest => "InvalidDigest",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidPartOrder => "InvalidPartOrder",
            Self::InvalidRange => "InvalidRange",
            Self::InvalidRequest => "InvalidRequest",
            Self::InvalidTag => "InvalidTag",
            Self::KeyTooLongError => "KeyTooLongError",
            Self::KmsNotFound => "KMS.NotFoundException",
            Self::MalformedXML => "MalformedXML",
            Self::MetadataTooLarge => "MetadataTooLarge",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::NoSuchCORSConfiguration => "NoSuchCORSConfiguration",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchLifecycleConfiguration => "NoSuchLifecycleConfiguration",
            Self::NoSuchObjectLockConfiguration => "NoSuchObjectLockConfiguration",
            Self::NoSuchTagSet => "NoSuchTagSet",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NoSuchVersion => "NoSuchVersion",
            Self::NotImplemented => "NotImplemented",
            Self::NotModified => "NotModified",
            Self::OwnershipControlsNotFoundError => "OwnershipControlsNotFoundError",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::ServerSideEncryptionConfigurationNotFoundError => {
                "ServerSideEncryptionConfigurationNotFoundError"
            }
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::NotModified => http::StatusCode::NOT_MODIFIED,
            Self::BadDigest
            | Self::EntityTooSmall
            | Self::InvalidArgument
            | Self::InvalidBucketName
            | Self::InvalidDigest
            | Self::InvalidPart
            | Self::InvalidPartOrder
            | Self::InvalidRequest
            | Self::InvalidTag
            | Self::KeyTooLongError
            | Self::KmsNotFound
            | Self::MalformedXML
            | Self::MetadataTooLarge
            | Self::ServerSideEncryptionConfigurationNotFoundError => {
                http::StatusCode::BAD_REQUEST
            }
            Self::AccessDenied => http::StatusCode::FORBIDDEN,
            Self::NoSuchBucket
            | Self::NoSuchBucketPolicy
            | Self::NoSuchCORSConfiguration
            | Self::NoSuchKey
            | Self::NoSuchLifecycleConfiguration
            | Self::NoSuchObjectLockConfiguration
            | Self::NoSuchTagSet
            | Self::NoSuchUpload
            | Self::NoSuchVersion
            | Self::OwnershipControlsNotFoundError => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyExists | Self::BucketAlreadyOwnedByYou | Self::BucketNotEmpty => {
                http::StatusCode::CONFLICT
            }
            Self::PreconditionFailed => http::StatusCode::PRECONDITION_FAILED,
            Self::InvalidRange => http::StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => http::StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AccessDenied => "Access Denied",
            Self::BadDigest => "The Content-MD5 you specified did not match what we received",
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::BucketAlreadyOwnedByYou => "The bucket is already owned by you",
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::EntityTooSmall => {
                "Your proposed upload is smaller than the minimum allowed object size"
            }
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::InvalidArgument => "Invalid Argument",
            Self::InvalidBucketName => "The specified bucket is not valid",
            Self::InvalidDigest => "The Content-MD5 you specified is not valid",
            Self::InvalidPart => "One or more of the specified parts could not be found",
            Self::InvalidPartOrder => "The list of parts was not in ascending order",
            Self::InvalidRange => "The requested range is not satisfiable",
            Self::InvalidRequest => "Invalid Request",
            Self::InvalidTag => "The tag provided was not a valid tag",
            Self::KeyTooLongError => "Your key is too long",
            Self::KmsNotFound => "Key does not exist",
            Self::MalformedXML => "The XML you provided was not well-formed",
            Self::MetadataTooLarge => {
                "Your metadata headers exceed the maximum allowed metadata size"
            }
            Self::MethodNotAllowed => "The specified method is not allowed against this resource",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchBucketPolicy => "The specified bucket does not have a bucket policy",
            Self::NoSuchCORSConfiguration => "The CORS configuration does not exist",
            Self::NoSuchKey => "The specified key does not exist",
            Self::NoSuchLifecycleConfiguration => "The lifecycle configuration does not exist",
            Self::NoSuchObjectLockConfiguration => {
                "Object Lock configuration does not exist for this bucket"
            }
            Self::NoSuchTagSet => "The TagSet does not exist",
            Self::NoSuchUpload => "The specified multipart upload does not exist",
            Self::NoSuchVersion => "The specified version does not exist",
            Self::NotImplemented => "A header you provided implies functionality that is not implemented",
            Self::NotModified => "Not Modified",
            Self::OwnershipControlsNotFoundError => "The bucket ownership controls were not found",
            Self::PreconditionFailed => {
                "At least one of the preconditions you specified did not hold"
            }
            Self::ServerSideEncryptionConfigurationNotFoundError => {
                "The server-side encryption configuration was not found"
            }
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug)]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The request ID, filled in at the HTTP edge.
    pub request_id: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
}

impl fmt::Display for S3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for S3Error {}

impl From<std::io::Error> for S3Error {
    fn from(_err: std::io::Error) -> Self {
        // Transport failures (e.g. a client dropping mid-body) surface as
        // the generic internal error.
        Self::new(S3ErrorCode::InternalError)
    }
}

impl S3Error {
    /// Create a new error from a code, with the code's default message.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.default_message().to_owned(),
            code,
            resource: None,
            request_id: None,
        }
    }

    /// Create a new error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            resource: None,
            request_id: None,
        }
    }

    /// Set the resource that caused this error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Create an InternalError with a custom message.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// Create an InvalidRequest error with a descriptive message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidRequest, message)
    }

    /// Create a MethodNotAllowed error naming the rejected method.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::MethodNotAllowed).with_resource(method)
    }

    /// Create a MalformedXML error with detail.
    #[must_use]
    pub fn malformed_xml(detail: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::MalformedXML).with_resource(detail)
    }

    /// Create a NotImplemented error naming the missing functionality.
    #[must_use]
    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NotImplemented).with_resource(detail)
    }
}

/// Construct an [`S3Error`] from an error code, optionally with a message.
///
/// # Examples
///
/// ```
/// use mocks3_model::s3_error;
/// use mocks3_model::error::S3ErrorCode;
///
/// let err = s3_error!(NoSuchBucket);
/// assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
///
/// let err = s3_error!(NoSuchKey, "The specified key does not exist: a/b");
/// assert!(err.message.contains("a/b"));
/// ```
#[macro_export]
macro_rules! s3_error {
    ($code:ident) => {
        $crate::error::S3Error::new($crate::error::S3ErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::S3Error::with_message($crate::error::S3ErrorCode::$code, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_status_codes_match_s3() {
        assert_eq!(
            S3ErrorCode::NoSuchBucket.default_status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            S3ErrorCode::BucketNotEmpty.default_status_code(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            S3ErrorCode::InvalidRange.default_status_code(),
            http::StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            S3ErrorCode::PreconditionFailed.default_status_code(),
            http::StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            S3ErrorCode::KmsNotFound.default_status_code(),
            http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_should_render_kms_code_with_dotted_name() {
        assert_eq!(S3ErrorCode::KmsNotFound.as_str(), "KMS.NotFoundException");
    }

    #[test]
    fn test_should_build_error_with_resource_and_request_id() {
        let err = s3_error!(NoSuchKey)
            .with_resource("/bucket/key")
            .with_request_id("req-1");
        assert_eq!(err.resource.as_deref(), Some("/bucket/key"));
        assert_eq!(err.request_id.as_deref(), Some("req-1"));
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_keep_custom_message() {
        let err = s3_error!(InvalidArgument, "max-keys must be non-negative");
        assert_eq!(err.message, "max-keys must be non-negative");
    }
}
