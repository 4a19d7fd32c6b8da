//! Bucket configuration subresources: versioning, tagging, ACL, policy,
//! CORS, lifecycle, encryption, object lock, ownership controls.
//!
//! Getters take the bucket read lock; setters and deleters take the write
//! lock and persist through the bucket sidecar.

use mocks3_model::types::{
    AccessControlPolicy, BucketLifecycleConfiguration, CannedAcl, CorsConfiguration,
    ObjectLockConfiguration, OwnershipControls, ServerSideEncryption,
    ServerSideEncryptionConfiguration, Tagging, VersioningConfiguration,
};
use tracing::debug;

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::locks::bucket_key;
use crate::store::meta::{BucketMetadata, VersioningState};
use crate::validation::validate_tags;

use super::S3Service;

impl S3Service {
    // -----------------------------------------------------------------------
    // Versioning
    // -----------------------------------------------------------------------

    /// GetBucketVersioning.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn get_bucket_versioning(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<VersioningConfiguration> {
        let meta = self.load_shared(bucket).await?;
        Ok(VersioningConfiguration {
            status: meta.versioning.to_wire(),
        })
    }

    /// PutBucketVersioning.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `MalformedXml` when the document carries no status.
    pub async fn put_bucket_versioning(
        &self,
        bucket: &str,
        config: VersioningConfiguration,
    ) -> S3ServiceResult<()> {
        let status = config.status.ok_or(S3ServiceError::MalformedXml)?;
        self.update_bucket(bucket, |meta| {
            meta.versioning = VersioningState::from_wire(status);
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Tagging
    // -----------------------------------------------------------------------

    /// GetBucketTagging. An empty tag set reads as `NoSuchTagSet`, as on
    /// AWS.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchTagSet`.
    pub async fn get_bucket_tagging(&self, bucket: &str) -> S3ServiceResult<Tagging> {
        let meta = self.load_shared(bucket).await?;
        if meta.tags.is_empty() {
            return Err(S3ServiceError::NoSuchTagSet);
        }
        Ok(Tagging { tag_set: meta.tags })
    }

    /// PutBucketTagging.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `InvalidTag`.
    pub async fn put_bucket_tagging(&self, bucket: &str, tagging: Tagging) -> S3ServiceResult<()> {
        validate_tags(&tagging.tag_set)?;
        self.update_bucket(bucket, |meta| {
            meta.tags = tagging.tag_set;
            Ok(())
        })
        .await
    }

    /// DeleteBucketTagging. Idempotent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn delete_bucket_tagging(&self, bucket: &str) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.tags.clear();
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // ACL
    // -----------------------------------------------------------------------

    /// GetBucketAcl.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn get_bucket_acl(&self, bucket: &str) -> S3ServiceResult<AccessControlPolicy> {
        Ok(self.load_shared(bucket).await?.acl)
    }

    /// PutBucketAcl, from either a canned ACL header or a policy document.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `MalformedXml` when neither input is present.
    pub async fn put_bucket_acl(
        &self,
        bucket: &str,
        canned: Option<CannedAcl>,
        policy: Option<AccessControlPolicy>,
    ) -> S3ServiceResult<()> {
        let acl = match (canned, policy) {
            (Some(canned), _) => canned.to_policy(self.owner.clone()),
            (None, Some(policy)) => policy,
            (None, None) => return Err(S3ServiceError::MalformedXml),
        };
        self.update_bucket(bucket, |meta| {
            meta.acl = acl;
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Policy
    // -----------------------------------------------------------------------

    /// GetBucketPolicy, returned as the stored JSON blob.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchBucketPolicy`.
    pub async fn get_bucket_policy(&self, bucket: &str) -> S3ServiceResult<String> {
        self.load_shared(bucket)
            .await?
            .policy
            .ok_or(S3ServiceError::NoSuchBucketPolicy)
    }

    /// PutBucketPolicy. The policy is stored opaquely but must be valid
    /// JSON.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `InvalidArgument` for non-JSON payloads.
    pub async fn put_bucket_policy(&self, bucket: &str, policy: String) -> S3ServiceResult<()> {
        if serde_json::from_str::<serde_json::Value>(&policy).is_err() {
            return Err(S3ServiceError::InvalidArgument {
                message: "Policies must be valid JSON".to_owned(),
            });
        }
        self.update_bucket(bucket, |meta| {
            meta.policy = Some(policy);
            Ok(())
        })
        .await
    }

    /// DeleteBucketPolicy. Idempotent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn delete_bucket_policy(&self, bucket: &str) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.policy = None;
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // CORS
    // -----------------------------------------------------------------------

    /// GetBucketCors.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchCORSConfiguration`.
    pub async fn get_bucket_cors(&self, bucket: &str) -> S3ServiceResult<CorsConfiguration> {
        self.load_shared(bucket)
            .await?
            .cors
            .ok_or(S3ServiceError::NoSuchCorsConfiguration)
    }

    /// PutBucketCors.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn put_bucket_cors(
        &self,
        bucket: &str,
        config: CorsConfiguration,
    ) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.cors = Some(config);
            Ok(())
        })
        .await
    }

    /// DeleteBucketCors. Idempotent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn delete_bucket_cors(&self, bucket: &str) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.cors = None;
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// GetBucketLifecycleConfiguration.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchLifecycleConfiguration`.
    pub async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<BucketLifecycleConfiguration> {
        self.load_shared(bucket)
            .await?
            .lifecycle
            .ok_or(S3ServiceError::NoSuchLifecycleConfiguration)
    }

    /// PutBucketLifecycleConfiguration. Rules are stored and returned;
    /// mocks3 never expires anything.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `MalformedXml` for an empty rule list.
    pub async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        config: BucketLifecycleConfiguration,
    ) -> S3ServiceResult<()> {
        if config.rules.is_empty() {
            return Err(S3ServiceError::MalformedXml);
        }
        self.update_bucket(bucket, |meta| {
            meta.lifecycle = Some(config);
            Ok(())
        })
        .await
    }

    /// DeleteBucketLifecycle. Idempotent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn delete_bucket_lifecycle(&self, bucket: &str) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.lifecycle = None;
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Encryption
    // -----------------------------------------------------------------------

    /// GetBucketEncryption.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`,
    /// `ServerSideEncryptionConfigurationNotFoundError`.
    pub async fn get_bucket_encryption(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<ServerSideEncryptionConfiguration> {
        self.load_shared(bucket)
            .await?
            .encryption
            .ok_or(S3ServiceError::EncryptionConfigurationNotFound)
    }

    /// PutBucketEncryption. A KMS default key must be allow-listed.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `KMS.NotFoundException`.
    pub async fn put_bucket_encryption(
        &self,
        bucket: &str,
        config: ServerSideEncryptionConfiguration,
    ) -> S3ServiceResult<()> {
        if config.rule.sse_algorithm == ServerSideEncryption::AwsKms {
            self.kms.validate(config.rule.kms_master_key_id.as_deref())?;
        }
        self.update_bucket(bucket, |meta| {
            meta.encryption = Some(config);
            Ok(())
        })
        .await
    }

    /// DeleteBucketEncryption. Idempotent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn delete_bucket_encryption(&self, bucket: &str) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            meta.encryption = None;
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Object lock
    // -----------------------------------------------------------------------

    /// GetObjectLockConfiguration.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchObjectLockConfiguration`.
    pub async fn get_object_lock_configuration(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<ObjectLockConfiguration> {
        self.load_shared(bucket)
            .await?
            .object_lock
            .ok_or(S3ServiceError::ObjectLockConfigurationNotFound)
    }

    /// PutObjectLockConfiguration. Enabling object lock also enables
    /// versioning, matching bucket creation.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: ObjectLockConfiguration,
    ) -> S3ServiceResult<()> {
        self.update_bucket(bucket, |meta| {
            if config.object_lock_enabled.as_deref() == Some("Enabled") {
                meta.versioning = VersioningState::Enabled;
            }
            meta.object_lock = Some(config);
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Ownership controls
    // -----------------------------------------------------------------------

    /// GetBucketOwnershipControls.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `OwnershipControlsNotFoundError`.
    pub async fn get_bucket_ownership_controls(
        &self,
        bucket: &str,
    ) -> S3ServiceResult<OwnershipControls> {
        let meta = self.load_shared(bucket).await?;
        match meta.ownership {
            Some(ownership) => Ok(OwnershipControls {
                rules: vec![ownership],
            }),
            None => Err(S3ServiceError::OwnershipControlsNotFound),
        }
    }

    /// PutBucketOwnershipControls.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `MalformedXml` when the document carries no rule.
    pub async fn put_bucket_ownership_controls(
        &self,
        bucket: &str,
        controls: OwnershipControls,
    ) -> S3ServiceResult<()> {
        let ownership = *controls.rules.first().ok_or(S3ServiceError::MalformedXml)?;
        self.update_bucket(bucket, |meta| {
            meta.ownership = Some(ownership);
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Shared plumbing
    // -----------------------------------------------------------------------

    /// Load bucket metadata under the shared lock.
    async fn load_shared(&self, bucket: &str) -> S3ServiceResult<BucketMetadata> {
        let _guard = self.locks.read(bucket_key(bucket)).await;
        self.buckets.load(bucket).await
    }

    /// Load, mutate, and persist bucket metadata under the exclusive lock.
    async fn update_bucket(
        &self,
        bucket: &str,
        mutate: impl FnOnce(&mut BucketMetadata) -> S3ServiceResult<()>,
    ) -> S3ServiceResult<()> {
        let _guard = self.locks.write(bucket_key(bucket)).await;
        let mut meta = self.buckets.load(bucket).await?;
        mutate(&mut meta)?;
        self.buckets.save(&meta).await?;
        debug!(bucket, "bucket configuration updated");
        Ok(())
    }
}
