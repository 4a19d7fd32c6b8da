//! Object CRUD: put, get, head, delete, batch delete, copy.

use bytes::Bytes;
use chrono::Utc;
use futures_util::Stream;
use tracing::{debug, info};

use mocks3_model::output::{CopyObjectResult, DeleteObjectsOutput};
use mocks3_model::types::{
    AccessControlPolicy, Delete, DeleteError, DeletedObject, LegalHoldStatus, ServerSideEncryption,
};

use crate::checksums::{ChecksumValue, content_md5_to_hex};
use crate::conditional::Preconditions;
use crate::error::{S3ServiceError, S3ServiceResult};
use crate::locks::object_key;
use crate::paths::{NULL_VERSION_ID, new_version_id};
use crate::store::meta::{
    BucketMetadata, ObjectVersionMeta, STORAGE_CLASS_STANDARD, VersioningState,
};
use crate::store::object::file_stream;
use crate::store::{IntegrityChecks, SseInfo};
use crate::validation::{validate_object_key, validate_tags, validate_user_metadata};

use super::{PutObjectOptions, S3Service};

/// ETag of a zero-byte body, used for delete markers.
const EMPTY_ETAG: &str = "\"d41d8cd98f00b204e9800998ecf8427e\"";

/// Result of a PutObject.
#[derive(Debug, Clone)]
pub struct PutObjectResult {
    /// The quoted ETag.
    pub etag: String,
    /// The allocated version id, when versioning is enabled.
    pub version_id: Option<String>,
    /// The recorded checksum, when one was requested.
    pub checksum: Option<ChecksumValue>,
    /// The SSE marker applied to the version.
    pub sse: Option<SseInfo>,
}

/// Result of a GetObject/HeadObject.
#[derive(Debug)]
pub struct GetObjectResult {
    /// The version's metadata.
    pub meta: ObjectVersionMeta,
    /// The opened data file, positioned at offset zero.
    pub file: tokio::fs::File,
}

/// Result of a DeleteObject.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectResult {
    /// Whether the operation created or removed a delete marker.
    pub delete_marker: Option<bool>,
    /// The affected version id.
    pub version_id: Option<String>,
}

/// Destination of a copy, with the directives already resolved by the HTTP
/// layer into the effective attribute set.
#[derive(Debug, Clone)]
pub struct CopyDestination {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// `true` replaces metadata from the request, `false` copies it from the
    /// source.
    pub replace_metadata: bool,
    /// Same for tags.
    pub replace_tagging: bool,
    /// Attributes used in REPLACE mode (and for ACL/SSE in both modes).
    pub options: PutObjectOptions,
}

/// Result of CopyObject.
#[derive(Debug, Clone)]
pub struct CopyResult {
    /// The `CopyObjectResult` body.
    pub result: CopyObjectResult,
    /// Version id of the new destination version, when versioning is
    /// enabled there.
    pub version_id: Option<String>,
    /// Version id of the source version that was read.
    pub source_version_id: Option<String>,
}

impl S3Service {
    /// PutObject.
    ///
    /// Streams the body to disk, verifying `Content-MD5` and any requested
    /// checksum in the same pass. The write happens under the key's write
    /// lock; version id allocation follows the bucket's versioning state.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `KeyTooLong`, `InvalidDigest`/`BadDigest`,
    /// `InvalidTag`, `MetadataTooLarge`, `KMS.NotFoundException`.
    pub async fn put_object<S>(
        &self,
        bucket: &str,
        key: &str,
        body: S,
        options: PutObjectOptions,
    ) -> S3ServiceResult<PutObjectResult>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send,
    {
        validate_object_key(key)?;
        validate_tags(&options.tags)?;
        validate_user_metadata(&options.user_metadata)?;
        self.validate_sse(&options.sse)?;

        let bucket_meta = self.buckets.load(bucket).await?;
        let checks = integrity_checks(&options)?;

        let _guard = self.locks.write(object_key(bucket, key)).await;

        let version_id = if bucket_meta.versioning.allocates_version_ids() {
            new_version_id()
        } else {
            NULL_VERSION_ID.to_owned()
        };

        let outcome = self
            .objects
            .write_version_data(
                bucket,
                key,
                &version_id,
                body,
                options.checksum_algorithm,
                &checks,
            )
            .await?;

        let sse = self.effective_sse(&bucket_meta, options.sse.clone());
        let meta = ObjectVersionMeta {
            key: key.to_owned(),
            version_id: version_id.clone(),
            size: outcome.size,
            last_modified: Utc::now(),
            etag: outcome.etag.clone(),
            delete_marker: false,
            system: options.system,
            user_metadata: options.user_metadata,
            tags: options.tags,
            acl: self.acl_from_options(options.canned_acl),
            legal_hold: options.legal_hold,
            retention: options.retention,
            sse: sse.clone(),
            checksum: outcome.checksum.clone(),
            storage_class: STORAGE_CLASS_STANDARD.to_owned(),
            parts_count: None,
            owner: self.owner.clone(),
        };
        self.objects.save_meta(bucket, key, &meta).await?;
        self.objects
            .set_current_version(bucket, key, &version_id)
            .await?;

        info!(bucket, key, version_id, size = outcome.size, "object stored");
        Ok(PutObjectResult {
            etag: outcome.etag,
            version_id: bucket_meta
                .versioning
                .allocates_version_ids()
                .then_some(version_id),
            checksum: outcome.checksum,
            sse,
        })
    }

    /// GetObject (the caller slices ranges from the returned file).
    ///
    /// # Errors
    ///
    /// `NoSuchKey` (including current delete markers), `NoSuchVersion`,
    /// `PreconditionFailed`/`NotModified` per the conditional headers.
    pub async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        preconditions: &Preconditions,
    ) -> S3ServiceResult<GetObjectResult> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;

        let meta = self.resolve_version(bucket, key, version_id).await?;
        preconditions.evaluate(&meta.etag, meta.last_modified, true)?;

        let file = self.objects.open_data(bucket, key, &meta.version_id).await?;
        Ok(GetObjectResult { meta, file })
    }

    /// HeadObject: metadata without the data file.
    ///
    /// # Errors
    ///
    /// As [`S3Service::get_object`].
    pub async fn head_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
        preconditions: &Preconditions,
    ) -> S3ServiceResult<ObjectVersionMeta> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.read(object_key(bucket, key)).await;

        let meta = self.resolve_version(bucket, key, version_id).await?;
        preconditions.evaluate(&meta.etag, meta.last_modified, true)?;
        Ok(meta)
    }

    /// DeleteObject.
    ///
    /// Versioning Enabled inserts a delete marker; Suspended replaces the
    /// `null` version with a delete marker; Unversioned removes the object.
    /// Deleting a missing key succeeds (204) in every mode. An explicit
    /// `version_id` removes that version outright, subject to object lock.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `NoSuchVersion` for an explicit unknown version;
    /// `AccessDenied` when retention or legal hold forbids removal.
    pub async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<DeleteObjectResult> {
        let bucket_meta = self.buckets.load(bucket).await?;
        let _guard = self.locks.write(object_key(bucket, key)).await;

        if let Some(version_id) = version_id {
            return self.delete_specific_version(bucket, key, version_id).await;
        }

        match bucket_meta.versioning {
            VersioningState::Unversioned => {
                self.objects.remove_key(bucket, key).await?;
                Ok(DeleteObjectResult::default())
            }
            VersioningState::Enabled => {
                let marker_id = new_version_id();
                self.write_delete_marker(bucket, key, &marker_id).await?;
                Ok(DeleteObjectResult {
                    delete_marker: Some(true),
                    version_id: Some(marker_id),
                })
            }
            VersioningState::Suspended => {
                // The null version is replaced by a null delete marker.
                if self
                    .objects
                    .load_meta(bucket, key, NULL_VERSION_ID)
                    .await
                    .is_ok()
                {
                    self.objects
                        .remove_version(bucket, key, NULL_VERSION_ID)
                        .await?;
                }
                self.write_delete_marker(bucket, key, NULL_VERSION_ID).await?;
                Ok(DeleteObjectResult {
                    delete_marker: Some(true),
                    version_id: Some(NULL_VERSION_ID.to_owned()),
                })
            }
        }
    }

    /// DeleteObjects (batch). Each entry is deleted independently; failures
    /// become `<Error>` entries rather than failing the batch.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` only; per-key errors are reported in the output.
    pub async fn delete_objects(
        &self,
        bucket: &str,
        delete: Delete,
    ) -> S3ServiceResult<DeleteObjectsOutput> {
        self.buckets.load(bucket).await?;

        let mut output = DeleteObjectsOutput::default();
        for object in delete.objects {
            match self
                .delete_object(bucket, &object.key, object.version_id.as_deref())
                .await
            {
                Ok(result) => {
                    if !delete.quiet {
                        output.deleted.push(DeletedObject {
                            key: object.key,
                            version_id: object.version_id,
                            delete_marker: result.delete_marker,
                            delete_marker_version_id: result
                                .delete_marker
                                .unwrap_or(false)
                                .then(|| result.version_id.clone())
                                .flatten(),
                        });
                    }
                }
                Err(err) => {
                    let wire: mocks3_model::S3Error = err.into();
                    output.errors.push(DeleteError {
                        key: object.key,
                        code: wire.code.as_str().to_owned(),
                        message: wire.message,
                    });
                }
            }
        }
        Ok(output)
    }

    /// CopyObject.
    ///
    /// Locks are taken in `(bucket, key)` order so that two crossing copies
    /// cannot deadlock; a self-copy shares the destination write lock.
    ///
    /// # Errors
    ///
    /// `NoSuchKey`/`NoSuchVersion` for the source, `InvalidRequest` for a
    /// self-copy without a REPLACE directive, plus the PutObject failures.
    pub async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        src_version_id: Option<&str>,
        dest: CopyDestination,
    ) -> S3ServiceResult<CopyResult> {
        validate_object_key(&dest.key)?;
        validate_tags(&dest.options.tags)?;
        validate_user_metadata(&dest.options.user_metadata)?;
        self.validate_sse(&dest.options.sse)?;

        self.buckets.load(src_bucket).await?;
        let dest_bucket_meta = self.buckets.load(&dest.bucket).await?;

        let same_object = src_bucket == dest.bucket && src_key == dest.key;
        if same_object
            && src_version_id.is_none()
            && !dest.replace_metadata
            && !dest.replace_tagging
        {
            return Err(S3ServiceError::InvalidRequest {
                message: "This copy request is illegal because it is trying to copy an object \
                          to itself without changing the object's metadata or tags"
                    .to_owned(),
            });
        }

        // Acquire locks in (bucket, key) order to rule out deadlock between
        // crossing copies.
        let src_lock = object_key(src_bucket, src_key);
        let dest_lock = object_key(&dest.bucket, &dest.key);
        let (_src_guard, _dest_guard) = if same_object {
            (None, Some(self.locks.write(dest_lock).await))
        } else if (src_bucket, src_key) < (dest.bucket.as_str(), dest.key.as_str()) {
            let src = self.locks.read(src_lock).await;
            let dst = self.locks.write(dest_lock).await;
            (Some(src), Some(dst))
        } else {
            let dst = self.locks.write(dest_lock).await;
            let src = self.locks.read(src_lock).await;
            (Some(src), Some(dst))
        };

        let src_meta = self
            .resolve_version(src_bucket, src_key, src_version_id)
            .await?;
        let src_file = self
            .objects
            .open_data(src_bucket, src_key, &src_meta.version_id)
            .await?;

        let dest_version_id = if dest_bucket_meta.versioning.allocates_version_ids() {
            new_version_id()
        } else {
            NULL_VERSION_ID.to_owned()
        };

        let outcome = self
            .objects
            .write_version_data(
                &dest.bucket,
                &dest.key,
                &dest_version_id,
                file_stream(src_file),
                dest.options.checksum_algorithm,
                &IntegrityChecks::default(),
            )
            .await?;

        let (system, user_metadata) = if dest.replace_metadata {
            (
                dest.options.system.clone(),
                dest.options.user_metadata.clone(),
            )
        } else {
            (src_meta.system.clone(), src_meta.user_metadata.clone())
        };
        let tags = if dest.replace_tagging {
            dest.options.tags.clone()
        } else {
            src_meta.tags.clone()
        };

        let sse = self.effective_sse(&dest_bucket_meta, dest.options.sse.clone());
        let last_modified = Utc::now();
        let meta = ObjectVersionMeta {
            key: dest.key.clone(),
            version_id: dest_version_id.clone(),
            size: outcome.size,
            last_modified,
            etag: outcome.etag.clone(),
            delete_marker: false,
            system,
            user_metadata,
            tags,
            acl: self.acl_from_options(dest.options.canned_acl),
            legal_hold: dest.options.legal_hold,
            retention: dest.options.retention,
            sse,
            checksum: outcome.checksum,
            storage_class: STORAGE_CLASS_STANDARD.to_owned(),
            parts_count: None,
            owner: self.owner.clone(),
        };
        self.objects.save_meta(&dest.bucket, &dest.key, &meta).await?;
        self.objects
            .set_current_version(&dest.bucket, &dest.key, &dest_version_id)
            .await?;

        debug!(
            src_bucket,
            src_key,
            dest_bucket = %dest.bucket,
            dest_key = %dest.key,
            size = outcome.size,
            "object copied"
        );

        Ok(CopyResult {
            result: CopyObjectResult {
                etag: outcome.etag,
                last_modified,
            },
            version_id: dest_bucket_meta
                .versioning
                .allocates_version_ids()
                .then_some(dest_version_id),
            source_version_id: (src_meta.version_id != NULL_VERSION_ID)
                .then(|| src_meta.version_id.clone()),
        })
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// Resolve an optional version id to a readable version's metadata.
    ///
    /// Without a version id, the current version is returned and a current
    /// delete marker reads as `NoSuchKey`. With one, the named version is
    /// returned (delete markers included only for metadata-level callers;
    /// data reads of markers also yield `NoSuchKey`).
    pub(crate) async fn resolve_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<ObjectVersionMeta> {
        match version_id {
            Some(requested) => {
                let meta = self.objects.load_meta(bucket, key, requested).await?;
                if meta.delete_marker {
                    return Err(S3ServiceError::NoSuchKey {
                        key: key.to_owned(),
                    });
                }
                Ok(meta)
            }
            None => match self.objects.load_current(bucket, key).await? {
                Some(meta) if !meta.delete_marker => Ok(meta),
                _ => Err(S3ServiceError::NoSuchKey {
                    key: key.to_owned(),
                }),
            },
        }
    }

    async fn delete_specific_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<DeleteObjectResult> {
        let meta = self.objects.load_meta(bucket, key, version_id).await?;
        enforce_object_lock(&meta)?;
        let removed = self.objects.remove_version(bucket, key, version_id).await?;
        Ok(DeleteObjectResult {
            delete_marker: removed.delete_marker.then_some(true),
            version_id: Some(version_id.to_owned()),
        })
    }

    async fn write_delete_marker(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> S3ServiceResult<()> {
        let marker = ObjectVersionMeta {
            key: key.to_owned(),
            version_id: version_id.to_owned(),
            size: 0,
            last_modified: Utc::now(),
            etag: EMPTY_ETAG.to_owned(),
            delete_marker: true,
            system: Default::default(),
            user_metadata: Default::default(),
            tags: Vec::new(),
            acl: AccessControlPolicy::private(self.owner.clone()),
            legal_hold: None,
            retention: None,
            sse: None,
            checksum: None,
            storage_class: STORAGE_CLASS_STANDARD.to_owned(),
            parts_count: None,
            owner: self.owner.clone(),
        };
        // A delete marker has zero bytes on disk as well.
        self.objects
            .write_version_data(
                bucket,
                key,
                version_id,
                futures_util::stream::empty::<std::io::Result<Bytes>>(),
                None,
                &IntegrityChecks::default(),
            )
            .await?;
        self.objects.save_meta(bucket, key, &marker).await?;
        self.objects
            .set_current_version(bucket, key, version_id)
            .await?;
        debug!(bucket, key, version_id, "delete marker inserted");
        Ok(())
    }

    pub(crate) fn acl_from_options(
        &self,
        canned: Option<mocks3_model::types::CannedAcl>,
    ) -> AccessControlPolicy {
        match canned {
            Some(acl) => acl.to_policy(self.owner.clone()),
            None => AccessControlPolicy::private(self.owner.clone()),
        }
    }

    pub(crate) fn validate_sse(&self, sse: &Option<SseInfo>) -> S3ServiceResult<()> {
        if let Some(info) = sse {
            if info.algorithm == ServerSideEncryption::AwsKms {
                self.kms.validate(info.kms_key_id.as_deref())?;
            }
        }
        Ok(())
    }

    /// The SSE marker actually recorded: the request's, or the bucket's
    /// default encryption when the request carries none.
    pub(crate) fn effective_sse(
        &self,
        bucket_meta: &BucketMetadata,
        requested: Option<SseInfo>,
    ) -> Option<SseInfo> {
        requested.or_else(|| {
            bucket_meta.encryption.as_ref().map(|config| SseInfo {
                algorithm: config.rule.sse_algorithm,
                kms_key_id: config.rule.kms_master_key_id.clone(),
            })
        })
    }
}

/// Reject removal of a version protected by retention or legal hold.
fn enforce_object_lock(meta: &ObjectVersionMeta) -> S3ServiceResult<()> {
    if meta.legal_hold == Some(LegalHoldStatus::On) {
        return Err(S3ServiceError::AccessDenied {
            reason: "object version is under legal hold".to_owned(),
        });
    }
    if let Some(retention) = &meta.retention {
        if retention.retain_until_date > Utc::now() {
            return Err(S3ServiceError::AccessDenied {
                reason: format!(
                    "object version is locked until {}",
                    retention.retain_until_date
                ),
            });
        }
    }
    Ok(())
}

/// Decode client integrity headers into the store's expectations.
fn integrity_checks(options: &PutObjectOptions) -> S3ServiceResult<IntegrityChecks> {
    let content_md5_hex = match &options.content_md5 {
        None => None,
        Some(header) => {
            Some(content_md5_to_hex(header).ok_or(S3ServiceError::InvalidDigest)?)
        }
    };
    Ok(IntegrityChecks {
        content_md5_hex,
        expected_checksum: options.expected_checksum.clone(),
    })
}
