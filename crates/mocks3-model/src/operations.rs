//! The set of S3 operations mocks3 serves.

/// All supported S3 operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    /// The ListBuckets operation.
    ListBuckets,
    /// The CreateBucket operation.
    CreateBucket,
    /// The DeleteBucket operation.
    DeleteBucket,
    /// The HeadBucket operation.
    HeadBucket,
    /// The GetBucketLocation operation.
    GetBucketLocation,
    /// The GetBucketVersioning operation.
    GetBucketVersioning,
    /// The PutBucketVersioning operation.
    PutBucketVersioning,
    /// The GetBucketTagging operation.
    GetBucketTagging,
    /// The PutBucketTagging operation.
    PutBucketTagging,
    /// The DeleteBucketTagging operation.
    DeleteBucketTagging,
    /// The GetBucketAcl operation.
    GetBucketAcl,
    /// The PutBucketAcl operation.
    PutBucketAcl,
    /// The GetBucketPolicy operation.
    GetBucketPolicy,
    /// The PutBucketPolicy operation.
    PutBucketPolicy,
    /// The DeleteBucketPolicy operation.
    DeleteBucketPolicy,
    /// The GetBucketCors operation.
    GetBucketCors,
    /// The PutBucketCors operation.
    PutBucketCors,
    /// The DeleteBucketCors operation.
    DeleteBucketCors,
    /// The GetBucketLifecycleConfiguration operation.
    GetBucketLifecycleConfiguration,
    /// The PutBucketLifecycleConfiguration operation.
    PutBucketLifecycleConfiguration,
    /// The DeleteBucketLifecycle operation.
    DeleteBucketLifecycle,
    /// The GetBucketEncryption operation.
    GetBucketEncryption,
    /// The PutBucketEncryption operation.
    PutBucketEncryption,
    /// The DeleteBucketEncryption operation.
    DeleteBucketEncryption,
    /// The GetObjectLockConfiguration operation.
    GetObjectLockConfiguration,
    /// The PutObjectLockConfiguration operation.
    PutObjectLockConfiguration,
    /// The GetBucketOwnershipControls operation.
    GetBucketOwnershipControls,
    /// The PutBucketOwnershipControls operation.
    PutBucketOwnershipControls,
    /// The ListObjects (V1) operation.
    ListObjects,
    /// The ListObjectsV2 operation.
    ListObjectsV2,
    /// The ListObjectVersions operation.
    ListObjectVersions,
    /// The ListMultipartUploads operation.
    ListMultipartUploads,
    /// The PutObject operation.
    PutObject,
    /// The GetObject operation.
    GetObject,
    /// The HeadObject operation.
    HeadObject,
    /// The DeleteObject operation.
    DeleteObject,
    /// The DeleteObjects (batch) operation.
    DeleteObjects,
    /// The CopyObject operation.
    CopyObject,
    /// The GetObjectTagging operation.
    GetObjectTagging,
    /// The PutObjectTagging operation.
    PutObjectTagging,
    /// The DeleteObjectTagging operation.
    DeleteObjectTagging,
    /// The GetObjectAcl operation.
    GetObjectAcl,
    /// The PutObjectAcl operation.
    PutObjectAcl,
    /// The GetObjectRetention operation.
    GetObjectRetention,
    /// The PutObjectRetention operation.
    PutObjectRetention,
    /// The GetObjectLegalHold operation.
    GetObjectLegalHold,
    /// The PutObjectLegalHold operation.
    PutObjectLegalHold,
    /// The CreateMultipartUpload operation.
    CreateMultipartUpload,
    /// The UploadPart operation.
    UploadPart,
    /// The UploadPartCopy operation.
    UploadPartCopy,
    /// The ListParts operation.
    ListParts,
    /// The CompleteMultipartUpload operation.
    CompleteMultipartUpload,
    /// The AbortMultipartUpload operation.
    AbortMultipartUpload,
}

impl S3Operation {
    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket => "CreateBucket",
            Self::DeleteBucket => "DeleteBucket",
            Self::HeadBucket => "HeadBucket",
            Self::GetBucketLocation => "GetBucketLocation",
            Self::GetBucketVersioning => "GetBucketVersioning",
            Self::PutBucketVersioning => "PutBucketVersioning",
            Self::GetBucketTagging => "GetBucketTagging",
            Self::PutBucketTagging => "PutBucketTagging",
            Self::DeleteBucketTagging => "DeleteBucketTagging",
            Self::GetBucketAcl => "GetBucketAcl",
            Self::PutBucketAcl => "PutBucketAcl",
            Self::GetBucketPolicy => "GetBucketPolicy",
            Self::PutBucketPolicy => "PutBucketPolicy",
            Self::DeleteBucketPolicy => "DeleteBucketPolicy",
            Self::GetBucketCors => "GetBucketCors",
            Self::PutBucketCors => "PutBucketCors",
            Self::DeleteBucketCors => "DeleteBucketCors",
            Self::GetBucketLifecycleConfiguration => "GetBucketLifecycleConfiguration",
            Self::PutBucketLifecycleConfiguration => "PutBucketLifecycleConfiguration",
            Self::DeleteBucketLifecycle => "DeleteBucketLifecycle",
            Self::GetBucketEncryption => "GetBucketEncryption",
            Self::PutBucketEncryption => "PutBucketEncryption",
            Self::DeleteBucketEncryption => "DeleteBucketEncryption",
            Self::GetObjectLockConfiguration => "GetObjectLockConfiguration",
            Self::PutObjectLockConfiguration => "PutObjectLockConfiguration",
            Self::GetBucketOwnershipControls => "GetBucketOwnershipControls",
            Self::PutBucketOwnershipControls => "PutBucketOwnershipControls",
            Self::ListObjects => "ListObjects",
            Self::ListObjectsV2 => "ListObjectsV2",
            Self::ListObjectVersions => "ListObjectVersions",
            Self::ListMultipartUploads => "ListMultipartUploads",
            Self::PutObject => "PutObject",
            Self::GetObject => "GetObject",
            Self::HeadObject => "HeadObject",
            Self::DeleteObject => "DeleteObject",
            Self::DeleteObjects => "DeleteObjects",
            Self::CopyObject => "CopyObject",
            Self::GetObjectTagging => "GetObjectTagging",
            Self::PutObjectTagging => "PutObjectTagging",
            Self::DeleteObjectTagging => "DeleteObjectTagging",
            Self::GetObjectAcl => "GetObjectAcl",
            Self::PutObjectAcl => "PutObjectAcl",
            Self::GetObjectRetention => "GetObjectRetention",
            Self::PutObjectRetention => "PutObjectRetention",
            Self::GetObjectLegalHold => "GetObjectLegalHold",
            Self::PutObjectLegalHold => "PutObjectLegalHold",
            Self::CreateMultipartUpload => "CreateMultipartUpload",
            Self::UploadPart => "UploadPart",
            Self::UploadPartCopy => "UploadPartCopy",
            Self::ListParts => "ListParts",
            Self::CompleteMultipartUpload => "CompleteMultipartUpload",
            Self::AbortMultipartUpload => "AbortMultipartUpload",
        }
    }
}

impl std::fmt::Display for S3Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
