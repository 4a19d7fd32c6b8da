//! The domain error type for store and operation failures.
//!
//! [`S3ServiceError`] is what the ops layer and the stores speak. The HTTP
//! edge converts it into the wire-level [`mocks3_model::S3Error`] (code +
//! status + message) through the [`From`] impl at the bottom of this module;
//! unexpected failures collapse into `Internal`, whose details are logged
//! but never sent to the client.

use mocks3_model::error::{S3Error, S3ErrorCode};

/// S3 domain error.
#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    // -----------------------------------------------------------------------
    // Bucket errors
    // -----------------------------------------------------------------------
    /// The specified bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The bucket already exists and is owned by the caller (mocks3 is
    /// single-owner, so every existing bucket is "owned by you").
    #[error("The bucket already exists and is owned by you: {bucket}")]
    BucketAlreadyOwnedByYou {
        /// The bucket name.
        bucket: String,
    },

    /// The bucket is not empty and cannot be deleted.
    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket name.
        bucket: String,
    },

    /// The bucket name violates the S3 naming rules.
    #[error("Invalid bucket name {name}: {reason}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
        /// Which rule was violated.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Object errors
    // -----------------------------------------------------------------------
    /// The specified key does not exist.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// The key that was not found.
        key: String,
    },

    /// The specified version does not exist.
    #[error("The specified version does not exist: key={key}, version_id={version_id}")]
    NoSuchVersion {
        /// The key.
        key: String,
        /// The version id that was not found.
        version_id: String,
    },

    /// The object key is longer than 1024 bytes.
    #[error("Your key is too long")]
    KeyTooLong,

    /// The requested range is not satisfiable.
    #[error("The requested range is not satisfiable")]
    InvalidRange,

    /// A read precondition did not hold.
    #[error("At least one of the preconditions you specified did not hold")]
    PreconditionFailed,

    /// The resource has not been modified (HTTP 304 on conditional GET).
    #[error("Not Modified")]
    NotModified,

    /// A supplied Content-MD5 or checksum did not match the received bytes.
    #[error("The Content-MD5 you specified did not match what we received")]
    BadDigest,

    /// The supplied Content-MD5 header could not be decoded.
    #[error("The Content-MD5 you specified is not valid")]
    InvalidDigest,

    /// A tag key or value is invalid.
    #[error("Invalid tag: {message}")]
    InvalidTag {
        /// What was wrong with the tag set.
        message: String,
    },

    /// The tag set was requested but the object carries none.
    #[error("The TagSet does not exist")]
    NoSuchTagSet,

    /// User metadata exceeds the 2 KiB budget.
    #[error("Your metadata headers exceed the maximum allowed metadata size")]
    MetadataTooLarge,

    /// The operation is forbidden by object lock (retention or legal hold).
    #[error("Access Denied: {reason}")]
    AccessDenied {
        /// Why access was denied.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Multipart errors
    // -----------------------------------------------------------------------
    /// The specified multipart upload does not exist.
    #[error("The specified upload does not exist: {upload_id}")]
    NoSuchUpload {
        /// The upload id that was not found.
        upload_id: String,
    },

    /// A part in CompleteMultipartUpload was missing or had the wrong ETag.
    #[error("One or more of the specified parts could not be found")]
    InvalidPart,

    /// Part numbers in CompleteMultipartUpload were not strictly increasing.
    #[error("The list of parts was not in ascending order")]
    InvalidPartOrder,

    /// A non-final part was smaller than 5 MiB.
    #[error("Your proposed upload is smaller than the minimum allowed object size")]
    EntityTooSmall,

    // -----------------------------------------------------------------------
    // Request shape errors
    // -----------------------------------------------------------------------
    /// An argument is syntactically valid but semantically wrong.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad argument.
        message: String,
    },

    /// The request is malformed in a way that has no more specific code.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// The XML request body could not be parsed.
    #[error("The XML you provided was not well-formed")]
    MalformedXml,

    // -----------------------------------------------------------------------
    // Configuration-not-found errors
    // -----------------------------------------------------------------------
    /// The bucket has no policy.
    #[error("The specified bucket does not have a bucket policy")]
    NoSuchBucketPolicy,

    /// The bucket has no CORS configuration.
    #[error("The CORS configuration does not exist")]
    NoSuchCorsConfiguration,

    /// The bucket has no lifecycle configuration.
    #[error("The lifecycle configuration does not exist")]
    NoSuchLifecycleConfiguration,

    /// The bucket has no default encryption configuration.
    #[error("The server-side encryption configuration was not found")]
    EncryptionConfigurationNotFound,

    /// The bucket has no object lock configuration.
    #[error("Object Lock configuration does not exist for this bucket")]
    ObjectLockConfigurationNotFound,

    /// The bucket has no ownership controls.
    #[error("The bucket ownership controls were not found")]
    OwnershipControlsNotFound,

    // -----------------------------------------------------------------------
    // KMS
    // -----------------------------------------------------------------------
    /// The request referenced a KMS key id outside the allow-list.
    #[error("Key {key_id} does not exist")]
    KmsKeyNotFound {
        /// The unknown key id.
        key_id: String,
    },

    // -----------------------------------------------------------------------
    // Internal / catch-all
    // -----------------------------------------------------------------------
    /// Unexpected failure; details are logged, the client sees a generic
    /// message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<std::io::Error> for S3ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(anyhow::Error::new(err).context("filesystem I/O failed"))
    }
}

/// Convenience result type for store and ops code.
pub type S3ServiceResult<T> = Result<T, S3ServiceError>;

impl From<S3ServiceError> for S3Error {
    fn from(err: S3ServiceError) -> Self {
        let code = error_code(&err);
        if matches!(err, S3ServiceError::Internal(_)) {
            // Internal details never reach the wire.
            tracing::error!(error = ?err, "internal error");
            return S3Error::new(code);
        }
        S3Error::with_message(code, err.to_string())
    }
}

/// Map a domain error variant to its wire error code.
fn error_code(err: &S3ServiceError) -> S3ErrorCode {
    match err {
        S3ServiceError::NoSuchBucket { .. } => S3ErrorCode::NoSuchBucket,
        S3ServiceError::BucketAlreadyOwnedByYou { .. } => S3ErrorCode::BucketAlreadyOwnedByYou,
        S3ServiceError::BucketNotEmpty { .. } => S3ErrorCode::BucketNotEmpty,
        S3ServiceError::InvalidBucketName { .. } => S3ErrorCode::InvalidBucketName,
        S3ServiceError::NoSuchKey { .. } => S3ErrorCode::NoSuchKey,
        S3ServiceError::NoSuchVersion { .. } => S3ErrorCode::NoSuchVersion,
        S3ServiceError::KeyTooLong => S3ErrorCode::KeyTooLongError,
        S3ServiceError::InvalidRange => S3ErrorCode::InvalidRange,
        S3ServiceError::PreconditionFailed => S3ErrorCode::PreconditionFailed,
        S3ServiceError::NotModified => S3ErrorCode::NotModified,
        S3ServiceError::BadDigest => S3ErrorCode::BadDigest,
        S3ServiceError::InvalidDigest => S3ErrorCode::InvalidDigest,
        S3ServiceError::InvalidTag { .. } => S3ErrorCode::InvalidTag,
        S3ServiceError::NoSuchTagSet => S3ErrorCode::NoSuchTagSet,
        S3ServiceError::MetadataTooLarge => S3ErrorCode::MetadataTooLarge,
        S3ServiceError::AccessDenied { .. } => S3ErrorCode::AccessDenied,
        S3ServiceError::NoSuchUpload { .. } => S3ErrorCode::NoSuchUpload,
        S3ServiceError::InvalidPart => S3ErrorCode::InvalidPart,
        S3ServiceError::InvalidPartOrder => S3ErrorCode::InvalidPartOrder,
        S3ServiceError::EntityTooSmall => S3ErrorCode::EntityTooSmall,
        S3ServiceError::InvalidArgument { .. } => S3ErrorCode::InvalidArgument,
        S3ServiceError::InvalidRequest { .. } => S3ErrorCode::InvalidRequest,
        S3ServiceError::MalformedXml => S3ErrorCode::MalformedXML,
        S3ServiceError::NoSuchBucketPolicy => S3ErrorCode::NoSuchBucketPolicy,
        S3ServiceError::NoSuchCorsConfiguration => S3ErrorCode::NoSuchCORSConfiguration,
        S3ServiceError::NoSuchLifecycleConfiguration => S3ErrorCode::NoSuchLifecycleConfiguration,
        S3ServiceError::EncryptionConfigurationNotFound => {
            S3ErrorCode::ServerSideEncryptionConfigurationNotFoundError
        }
        S3ServiceError::ObjectLockConfigurationNotFound => {
            S3ErrorCode::NoSuchObjectLockConfiguration
        }
        S3ServiceError::OwnershipControlsNotFound => S3ErrorCode::OwnershipControlsNotFoundError,
        S3ServiceError::KmsKeyNotFound { .. } => S3ErrorCode::KmsNotFound,
        S3ServiceError::Internal(_) => S3ErrorCode::InternalError,
    }
}
