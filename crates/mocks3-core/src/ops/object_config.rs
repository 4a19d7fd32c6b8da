//! Object subresources: tagging, ACL, retention, legal hold.
//!
//! Each getter resolves the addressed version (current or explicit) under
//! the key's read lock; each setter rewrites the version's sidecar under
//! the write lock.

use chrono::Utc;
use mocks3_model::types::{
    AccessControlPolicy, CannedAcl, ObjectLockLegalHold, ObjectLockRetention,
    ObjectLockRetentionMode, Tagging,
};

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::locks::object_key;
use crate::store::meta::ObjectVersionMeta;
use crate::validation::validate_tags;

use super::S3Service;

impl S3Service {
    // -----------------------------------------------------------------------
    // Tagging
    // -----------------------------------------------------------------------

    /// GetObjectTagging. Unlike buckets, an object with no tags returns an
    /// empty set rather than an error.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`.
    pub async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<(String, Tagging)> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;
        let meta = self.resolve_version(bucket, key, version_id).await?;
        Ok((
            meta.version_id,
            Tagging { tag_set: meta.tags },
        ))
    }

    /// PutObjectTagging.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`, `InvalidTag`.
    pub async fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        tagging: Tagging,
    ) -> S3ServiceResult<String> {
        validate_tags(&tagging.tag_set)?;
        self.update_version(bucket, key, version_id, |meta| {
            meta.tags = tagging.tag_set;
            Ok(())
        })
        .await
    }

    /// DeleteObjectTagging.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`.
    pub async fn delete_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<String> {
        self.update_version(bucket, key, version_id, |meta| {
            meta.tags.clear();
            Ok(())
        })
        .await
    }

    // -----------------------------------------------------------------------
    // ACL
    // -----------------------------------------------------------------------

    /// GetObjectAcl.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`.
    pub async fn get_object_acl(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<AccessControlPolicy> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;
        Ok(self.resolve_version(bucket, key, version_id).await?.acl)
    }

    /// PutObjectAcl, from a canned ACL header or a policy document.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`; `MalformedXml` when
    /// neither input is present.
    pub async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        canned: Option<CannedAcl>,
        policy: Option<AccessControlPolicy>,
    ) -> S3ServiceResult<()> {
        let acl = match (canned, policy) {
            (Some(canned), _) => canned.to_policy(self.owner.clone()),
            (None, Some(policy)) => policy,
            (None, None) => return Err(S3ServiceError::MalformedXml),
        };
        self.update_version(bucket, key, version_id, |meta| {
            meta.acl = acl;
            Ok(())
        })
        .await
        .map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Retention
    // -----------------------------------------------------------------------

    /// GetObjectRetention.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`; `InvalidRequest` when
    /// the version carries no retention.
    pub async fn get_object_retention(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<ObjectLockRetention> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;
        self.resolve_version(bucket, key, version_id)
            .await?
            .retention
            .ok_or_else(|| S3ServiceError::InvalidRequest {
                message: "The specified object does not have a ObjectLock configuration"
                    .to_owned(),
            })
    }

    /// PutObjectRetention. Compliance-mode retention can never be shortened
    /// or weakened before it expires.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`, `AccessDenied`.
    pub async fn put_object_retention(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        retention: ObjectLockRetention,
    ) -> S3ServiceResult<()> {
        self.update_version(bucket, key, version_id, |meta| {
            if let Some(existing) = &meta.retention {
                let still_locked = existing.retain_until_date > Utc::now();
                let weakens = retention.retain_until_date < existing.retain_until_date
                    || retention.mode != ObjectLockRetentionMode::Compliance;
                if existing.mode == ObjectLockRetentionMode::Compliance && still_locked && weakens {
                    return Err(S3ServiceError::AccessDenied {
                        reason: "compliance-mode retention cannot be shortened or removed"
                            .to_owned(),
                    });
                }
            }
            meta.retention = Some(retention);
            Ok(())
        })
        .await
        .map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Legal hold
    // -----------------------------------------------------------------------

    /// GetObjectLegalHold.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`; `InvalidRequest` when
    /// no legal hold was ever set.
    pub async fn get_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<ObjectLockLegalHold> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;
        self.resolve_version(bucket, key, version_id)
            .await?
            .legal_hold
            .map(|status| ObjectLockLegalHold { status })
            .ok_or_else(|| S3ServiceError::InvalidRequest {
                message: "The specified object does not have a ObjectLock configuration"
                    .to_owned(),
            })
    }

    /// PutObjectLegalHold.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchVersion`.
    pub async fn put_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        hold: ObjectLockLegalHold,
    ) -> S3ServiceResult<()> {
        self.update_version(bucket, key, version_id, |meta| {
            meta.legal_hold = Some(hold.status);
            Ok(())
        })
        .await
        .map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Shared plumbing
    // -----------------------------------------------------------------------

    /// Resolve, mutate, and persist one version's sidecar under the write
    /// lock. Returns the affected version id.
    async fn update_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        mutate: impl FnOnce(&mut ObjectVersionMeta) -> S3ServiceResult<()>,
    ) -> S3ServiceResult<String> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.write(object_key(bucket, key)).await;
        let mut meta = self.resolve_version(bucket, key, version_id).await?;
        mutate(&mut meta)?;
        // Subresource writes deliberately leave last_modified untouched.
        self.objects.save_meta(bucket, key, &meta).await?;
        Ok(meta.version_id)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use mocks3_model::types::{LegalHoldStatus, Tag};

    use super::super::PutObjectOptions;
    use super::*;
    use crate::kms::KmsKeyRegistry;

    async fn service_with_object() -> (tempfile::TempDir, S3Service) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = S3Service::new(dir.path(), "us-east-1", KmsKeyRegistry::default());
        service
            .create_bucket("b1", None, None, None, false)
            .await
            .expect("create bucket");
        service
            .put_object(
                "b1",
                "obj",
                stream::iter(vec![Ok(bytes::Bytes::from_static(b"data"))]),
                PutObjectOptions::default(),
            )
            .await
            .expect("put object");
        (dir, service)
    }

    #[tokio::test]
    async fn test_should_round_trip_object_tagging() {
        let (_dir, service) = service_with_object().await;

        let (_, tagging) = service
            .get_object_tagging("b1", "obj", None)
            .await
            .expect("get");
        assert!(tagging.tag_set.is_empty());

        service
            .put_object_tagging(
                "b1",
                "obj",
                None,
                Tagging {
                    tag_set: vec![Tag {
                        key: "k".to_owned(),
                        value: "v".to_owned(),
                    }],
                },
            )
            .await
            .expect("put");
        let (_, tagging) = service
            .get_object_tagging("b1", "obj", None)
            .await
            .expect("get");
        assert_eq!(tagging.tag_set.len(), 1);

        service
            .delete_object_tagging("b1", "obj", None)
            .await
            .expect("delete");
        let (_, tagging) = service
            .get_object_tagging("b1", "obj", None)
            .await
            .expect("get");
        assert!(tagging.tag_set.is_empty());
    }

    #[tokio::test]
    async fn test_should_apply_canned_acl_to_object() {
        let (_dir, service) = service_with_object().await;
        service
            .put_object_acl("b1", "obj", None, Some(CannedAcl::PublicRead), None)
            .await
            .expect("put acl");
        let acl = service
            .get_object_acl("b1", "obj", None)
            .await
            .expect("get acl");
        assert_eq!(acl.grants.len(), 2);
    }

    #[tokio::test]
    async fn test_should_protect_compliance_retention() {
        let (_dir, service) = service_with_object().await;
        let until = Utc::now() + chrono::Duration::days(7);
        service
            .put_object_retention(
                "b1",
                "obj",
                None,
                ObjectLockRetention {
                    mode: ObjectLockRetentionMode::Compliance,
                    retain_until_date: until,
                },
            )
            .await
            .expect("set retention");

        // Shortening is refused.
        let err = service
            .put_object_retention(
                "b1",
                "obj",
                None,
                ObjectLockRetention {
                    mode: ObjectLockRetentionMode::Compliance,
                    retain_until_date: until - chrono::Duration::days(1),
                },
            )
            .await
            .expect_err("shorten");
        assert!(matches!(err, S3ServiceError::AccessDenied { .. }));

        // Downgrading to governance is refused too.
        let err = service
            .put_object_retention(
                "b1",
                "obj",
                None,
                ObjectLockRetention {
                    mode: ObjectLockRetentionMode::Governance,
                    retain_until_date: until + chrono::Duration::days(1),
                },
            )
            .await
            .expect_err("downgrade");
        assert!(matches!(err, S3ServiceError::AccessDenied { .. }));

        // Extending in compliance mode is allowed.
        service
            .put_object_retention(
                "b1",
                "obj",
                None,
                ObjectLockRetention {
                    mode: ObjectLockRetentionMode::Compliance,
                    retain_until_date: until + chrono::Duration::days(1),
                },
            )
            .await
            .expect("extend");
    }

    #[tokio::test]
    async fn test_should_round_trip_legal_hold() {
        let (_dir, service) = service_with_object().await;
        assert!(service.get_object_legal_hold("b1", "obj", None).await.is_err());

        service
            .put_object_legal_hold(
                "b1",
                "obj",
                None,
                ObjectLockLegalHold {
                    status: LegalHoldStatus::On,
                },
            )
            .await
            .expect("put");
        let hold = service
            .get_object_legal_hold("b1", "obj", None)
            .await
            .expect("get");
        assert_eq!(hold.status, LegalHoldStatus::On);
    }

    #[tokio::test]
    async fn test_should_report_missing_key_for_subresources() {
        let (_dir, service) = service_with_object().await;
        assert!(matches!(
            service.get_object_tagging("b1", "ghost", None).await,
            Err(S3ServiceError::NoSuchKey { .. })
        ));
        assert!(matches!(
            service.get_object_acl("b1", "ghost", None).await,
            Err(S3ServiceError::NoSuchKey { .. })
        ));
    }
}
