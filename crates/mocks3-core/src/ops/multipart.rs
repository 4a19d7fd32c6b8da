//! Multipart upload orchestration.
//!
//! State machine per upload: Initiated -> (UploadPart | UploadPartCopy)* ->
//! Completed | Aborted. Both terminal transitions remove the staging
//! directory, and completion runs under the destination key's write lock,
//! so a racing second completion finds the staging gone and fails with
//! `NoSuchUpload`.

use bytes::Bytes;
use chrono::Utc;
use futures_util::Stream;
use tracing::{debug, info};

use mocks3_model::output::{
    CopyObjectResult, ListMultipartUploadsOutput, ListPartsOutput,
};
use mocks3_model::types::{CompletedMultipartUpload, MultipartUploadEntry};

use crate::checksums::{ChecksumValue, compute_multipart_etag, content_md5_to_hex};
use crate::error::{S3ServiceError, S3ServiceResult};
use crate::locks::{object_key, part_key};
use crate::paths::{NULL_VERSION_ID, new_upload_id, new_version_id};
use crate::store::meta::{ObjectVersionMeta, STORAGE_CLASS_STANDARD, UploadMetadata};
use crate::store::object::file_range_stream;
use crate::store::IntegrityChecks;
use crate::validation::{validate_object_key, validate_tags, validate_user_metadata};

use super::{PutObjectOptions, S3Service};

/// Part numbers accepted by UploadPart.
const PART_NUMBER_RANGE: std::ops::RangeInclusive<u32> = 1..=10_000;

/// Minimum size of every part but the last, enforced at completion.
const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Result of UploadPart.
#[derive(Debug, Clone)]
pub struct UploadPartResult {
    /// The part's quoted ETag (hex MD5).
    pub etag: String,
    /// The recorded checksum, when the upload requested an algorithm.
    pub checksum: Option<ChecksumValue>,
}

/// Result of CompleteMultipartUpload.
#[derive(Debug, Clone)]
pub struct CompleteResult {
    /// The composite ETag.
    pub etag: String,
    /// Version id of the assembled object, when versioning is enabled.
    pub version_id: Option<String>,
}

impl S3Service {
    /// CreateMultipartUpload.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `KeyTooLong`, `InvalidTag`, `MetadataTooLarge`,
    /// `KMS.NotFoundException`.
    pub async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        options: PutObjectOptions,
    ) -> S3ServiceResult<String> {
        validate_object_key(key)?;
        validate_tags(&options.tags)?;
        validate_user_metadata(&options.user_metadata)?;
        self.validate_sse(&options.sse)?;
        let bucket_meta = self.buckets.load(bucket).await?;

        let upload_id = new_upload_id();
        let upload = UploadMetadata {
            upload_id: upload_id.clone(),
            key: key.to_owned(),
            initiated: Utc::now(),
            owner: self.owner.clone(),
            storage_class: STORAGE_CLASS_STANDARD.to_owned(),
            system: options.system,
            user_metadata: options.user_metadata,
            tags: options.tags,
            acl: self.acl_from_options(options.canned_acl),
            sse: self.effective_sse(&bucket_meta, options.sse),
            checksum_algorithm: options.checksum_algorithm,
        };
        self.multiparts.create(bucket, &upload).await?;
        info!(bucket, key, upload_id, "multipart upload initiated");
        Ok(upload_id)
    }

    /// UploadPart. Overwriting a staged part is allowed; the last writer
    /// wins. Different parts of one upload proceed in parallel, each under
    /// its own part lock.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchUpload`, `InvalidArgument` for an
    /// out-of-range part number, `InvalidDigest`/`BadDigest`.
    pub async fn upload_part<S>(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: S,
        content_md5: Option<&str>,
        expected_checksum: Option<&str>,
    ) -> S3ServiceResult<UploadPartResult>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send,
    {
        self.buckets.load(bucket).await?;
        validate_part_number(part_number)?;
        let upload = self.multiparts.load(bucket, key, upload_id).await?;

        let checks = IntegrityChecks {
            content_md5_hex: match content_md5 {
                None => None,
                Some(header) => {
                    Some(content_md5_to_hex(header).ok_or(S3ServiceError::InvalidDigest)?)
                }
            },
            expected_checksum: expected_checksum.map(ToOwned::to_owned),
        };

        let _guard = self
            .locks
            .write(part_key(bucket, key, upload_id, part_number))
            .await;
        let outcome = self
            .multiparts
            .write_part(
                bucket,
                key,
                upload_id,
                part_number,
                body,
                upload.checksum_algorithm,
                &checks,
            )
            .await?;

        Ok(UploadPartResult {
            etag: outcome.etag,
            checksum: outcome.checksum,
        })
    }

    /// UploadPartCopy: stage a byte range of an existing object version as
    /// a part.
    ///
    /// # Errors
    ///
    /// The UploadPart failures plus `NoSuchKey`/`NoSuchVersion` for the
    /// source and `InvalidRange` for an unsatisfiable range.
    #[allow(clippy::too_many_arguments)]
    pub async fn upload_part_copy(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        src_bucket: &str,
        src_key: &str,
        src_version_id: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> S3ServiceResult<CopyObjectResult> {
        self.buckets.load(bucket).await?;
        self.buckets.load(src_bucket).await?;
        validate_part_number(part_number)?;
        let upload = self.multiparts.load(bucket, key, upload_id).await?;

        let _src_guard = self.locks.read(object_key(src_bucket, src_key)).await;
        let src_meta = self
            .resolve_version(src_bucket, src_key, src_version_id)
            .await?;

        let (offset, length) = match range {
            None => (0, src_meta.size),
            Some((start, end)) => {
                if start >= src_meta.size || start > end {
                    return Err(S3ServiceError::InvalidRange);
                }
                let end = end.min(src_meta.size.saturating_sub(1));
                (start, end - start + 1)
            }
        };

        let mut src_file = self
            .objects
            .open_data(src_bucket, src_key, &src_meta.version_id)
            .await?;
        tokio::io::AsyncSeekExt::seek(&mut src_file, std::io::SeekFrom::Start(offset)).await?;

        let _guard = self
            .locks
            .write(part_key(bucket, key, upload_id, part_number))
            .await;
        let outcome = self
            .multiparts
            .write_part(
                bucket,
                key,
                upload_id,
                part_number,
                file_range_stream(src_file, length),
                upload.checksum_algorithm,
                &IntegrityChecks::default(),
            )
            .await?;

        debug!(bucket, key, upload_id, part_number, length, "part copied");
        Ok(CopyObjectResult {
            etag: outcome.etag,
            last_modified: Utc::now(),
        })
    }

    /// ListParts, paginated by part number.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchUpload`.
    pub async fn list_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number_marker: Option<u32>,
        max_parts: Option<i32>,
    ) -> S3ServiceResult<ListPartsOutput> {
        self.buckets.load(bucket).await?;
        let upload = self.multiparts.load(bucket, key, upload_id).await?;
        let all = self.multiparts.list_parts(bucket, key, upload_id).await?;

        let max_parts = match max_parts {
            None => 1000,
            Some(n) if n < 0 => {
                return Err(S3ServiceError::InvalidArgument {
                    message: "max-parts must be non-negative".to_owned(),
                });
            }
            Some(n) => n.min(1000) as usize,
        };
        let marker = part_number_marker.unwrap_or(0);

        let mut parts: Vec<_> = all
            .into_iter()
            .filter(|p| p.part_number > marker)
            .collect();
        let is_truncated = parts.len() > max_parts;
        parts.truncate(max_parts);

        Ok(ListPartsOutput {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            upload_id: upload_id.to_owned(),
            part_number_marker,
            next_part_number_marker: is_truncated
                .then(|| parts.last().map(|p| p.part_number))
                .flatten(),
            max_parts: max_parts as i32,
            is_truncated,
            parts,
            initiator: Some(upload.owner.clone()),
            owner: Some(upload.owner),
            storage_class: STORAGE_CLASS_STANDARD.to_owned(),
        })
    }

    /// ListMultipartUploads for a bucket, with prefix filtering and
    /// key/upload-id marker pagination.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub async fn list_multipart_uploads(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        key_marker: Option<&str>,
        upload_id_marker: Option<&str>,
        max_uploads: Option<i32>,
    ) -> S3ServiceResult<ListMultipartUploadsOutput> {
        self.buckets.load(bucket).await?;
        let all = self.multiparts.list_uploads(bucket, &self.objects).await?;

        let max_uploads = max_uploads.unwrap_or(1000).clamp(0, 1000) as usize;
        let prefix = prefix.unwrap_or("");
        let marker = (
            key_marker.unwrap_or(""),
            upload_id_marker.unwrap_or(""),
        );

        let mut uploads: Vec<MultipartUploadEntry> = Vec::new();
        let mut is_truncated = false;
        for upload in all {
            if !prefix.is_empty() && !upload.key.starts_with(prefix) {
                continue;
            }
            if !marker.0.is_empty()
                && (upload.key.as_str(), upload.upload_id.as_str()) <= marker
            {
                continue;
            }
            if uploads.len() >= max_uploads {
                is_truncated = true;
                break;
            }
            uploads.push(MultipartUploadEntry {
                key: upload.key,
                upload_id: upload.upload_id,
                initiated: upload.initiated,
                storage_class: upload.storage_class,
                owner: upload.owner.clone(),
                initiator: upload.owner,
            });
        }

        Ok(ListMultipartUploadsOutput {
            bucket: bucket.to_owned(),
            key_marker: key_marker.map(ToOwned::to_owned),
            upload_id_marker: upload_id_marker.map(ToOwned::to_owned),
            next_key_marker: is_truncated
                .then(|| uploads.last().map(|u| u.key.clone()))
                .flatten(),
            next_upload_id_marker: is_truncated
                .then(|| uploads.last().map(|u| u.upload_id.clone()))
                .flatten(),
            max_uploads: max_uploads as i32,
            is_truncated,
            uploads,
        })
    }

    /// CompleteMultipartUpload.
    ///
    /// Validates the requested part list (strictly increasing, every part
    /// staged with a matching ETag, every non-final part at least 5 MiB),
    /// assembles the object, applies the metadata captured at initiation,
    /// and removes the staging directory.
    ///
    /// # Errors
    ///
    /// `NoSuchUpload` (including a lost completion race), `InvalidPart`,
    /// `InvalidPartOrder`, `EntityTooSmall`, `MalformedXml` for an empty
    /// part list.
    pub async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        requested: CompletedMultipartUpload,
    ) -> S3ServiceResult<CompleteResult> {
        let bucket_meta = self.buckets.load(bucket).await?;
        if requested.parts.is_empty() {
            return Err(S3ServiceError::MalformedXml);
        }

        // The destination write lock serializes racing completions: the
        // winner removes the staging directory, the loser's load fails.
        let _guard = self.locks.write(object_key(bucket, key)).await;
        let upload = self.multiparts.load(bucket, key, upload_id).await?;

        let mut part_numbers = Vec::with_capacity(requested.parts.len());
        let mut part_md5s = Vec::with_capacity(requested.parts.len());
        let mut previous = 0_u32;
        for (index, part) in requested.parts.iter().enumerate() {
            if part.part_number <= previous {
                return Err(S3ServiceError::InvalidPartOrder);
            }
            previous = part.part_number;
            validate_part_number(part.part_number).map_err(|_| S3ServiceError::InvalidPart)?;

            let staged_md5 = self
                .multiparts
                .part_md5(bucket, key, upload_id, part.part_number)
                .await?
                .ok_or(S3ServiceError::InvalidPart)?;
            if part.etag.trim_matches('"') != staged_md5 {
                return Err(S3ServiceError::InvalidPart);
            }

            let size = self
                .multiparts
                .part_size(bucket, key, upload_id, part.part_number)
                .await?
                .ok_or(S3ServiceError::InvalidPart)?;
            let is_last = index == requested.parts.len() - 1;
            if !is_last && size < MIN_PART_SIZE {
                return Err(S3ServiceError::EntityTooSmall);
            }

            part_numbers.push(part.part_number);
            part_md5s.push(staged_md5);
        }

        let version_id = if bucket_meta.versioning.allocates_version_ids() {
            new_version_id()
        } else {
            NULL_VERSION_ID.to_owned()
        };

        let total_size = self
            .multiparts
            .assemble(bucket, key, upload_id, &part_numbers, &self.objects, &version_id)
            .await?;

        let etag = compute_multipart_etag(&part_md5s);
        let meta = ObjectVersionMeta {
            key: key.to_owned(),
            version_id: version_id.clone(),
            size: total_size,
            last_modified: Utc::now(),
            etag: etag.clone(),
            delete_marker: false,
            system: upload.system,
            user_metadata: upload.user_metadata,
            tags: upload.tags,
            acl: upload.acl,
            legal_hold: None,
            retention: None,
            sse: upload.sse,
            checksum: None,
            storage_class: upload.storage_class,
            parts_count: Some(part_numbers.len() as u32),
            owner: upload.owner,
        };
        self.objects.save_meta(bucket, key, &meta).await?;
        self.objects
            .set_current_version(bucket, key, &version_id)
            .await?;
        self.multiparts.remove(bucket, key, upload_id).await?;

        info!(
            bucket,
            key,
            upload_id,
            parts = part_numbers.len(),
            size = total_size,
            "multipart upload completed"
        );
        Ok(CompleteResult {
            etag,
            version_id: bucket_meta
                .versioning
                .allocates_version_ids()
                .then_some(version_id),
        })
    }

    /// AbortMultipartUpload.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`; `NoSuchUpload` for an unknown (or already-ended)
    /// upload id.
    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> S3ServiceResult<()> {
        self.buckets.load(bucket).await?;
        let _guard = self.locks.write(object_key(bucket, key)).await;
        self.multiparts.remove(bucket, key, upload_id).await?;
        info!(bucket, key, upload_id, "multipart upload aborted");
        Ok(())
    }
}

fn validate_part_number(part_number: u32) -> S3ServiceResult<()> {
    if PART_NUMBER_RANGE.contains(&part_number) {
        Ok(())
    } else {
        Err(S3ServiceError::InvalidArgument {
            message: format!(
                "Part number must be an integer between 1 and 10000, got {part_number}"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use mocks3_model::types::CompletedPart;
    use tokio::io::AsyncReadExt;

    use super::super::PutObjectOptions;
    use super::*;
    use crate::checksums::compute_md5;
    use crate::conditional::Preconditions;
    use crate::kms::KmsKeyRegistry;

    async fn service() -> (tempfile::TempDir, S3Service) {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = S3Service::new(dir.path(), "us-east-1", KmsKeyRegistry::default());
        service
            .create_bucket("b1", None, None, None, false)
            .await
            .expect("create bucket");
        (dir, service)
    }

    fn body(data: Vec<u8>) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
        stream::iter(vec![Ok(Bytes::from(data))])
    }

    fn five_mib_of(byte: u8) -> Vec<u8> {
        vec![byte; (MIN_PART_SIZE) as usize]
    }

    async fn staged_upload(service: &S3Service) -> (String, String, String) {
        let upload_id = service
            .create_multipart_upload("b1", "big", PutObjectOptions::default())
            .await
            .expect("initiate");
        let part1 = service
            .upload_part("b1", "big", &upload_id, 1, body(five_mib_of(0x61)), None, None)
            .await
            .expect("part 1");
        let part2 = service
            .upload_part("b1", "big", &upload_id, 2, body(b"tail".to_vec()), None, None)
            .await
            .expect("part 2");
        (upload_id, part1.etag, part2.etag)
    }

    #[tokio::test]
    async fn test_should_complete_upload_with_composite_etag() {
        let (_dir, service) = service().await;
        let (upload_id, etag1, etag2) = staged_upload(&service).await;

        let result = service
            .complete_multipart_upload(
                "b1",
                "big",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![
                        CompletedPart {
                            part_number: 1,
                            etag: etag1,
                        },
                        CompletedPart {
                            part_number: 2,
                            etag: etag2,
                        },
                    ],
                },
            )
            .await
            .expect("complete");

        // ETag is md5-of-part-md5s with the part count suffix.
        let expected = compute_multipart_etag(&[
            compute_md5(&five_mib_of(0x61)),
            compute_md5(b"tail"),
        ]);
        assert_eq!(result.etag, expected);
        assert!(result.etag.ends_with("-2\""));

        // Assembled bytes are the concatenation, and staging is gone.
        let got = service
            .get_object("b1", "big", None, &Preconditions::default())
            .await
            .expect("get");
        assert_eq!(got.meta.size, MIN_PART_SIZE + 4);
        assert_eq!(got.meta.parts_count, Some(2));
        let mut file = got.file;
        let mut data = Vec::new();
        file.read_to_end(&mut data).await.expect("read");
        assert_eq!(&data[..4], b"aaaa");
        assert_eq!(&data[data.len() - 4..], b"tail");

        assert!(matches!(
            service.list_parts("b1", "big", &upload_id, None, None).await,
            Err(S3ServiceError::NoSuchUpload { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_fail_second_completion_with_no_such_upload() {
        let (_dir, service) = service().await;
        let (upload_id, etag1, etag2) = staged_upload(&service).await;
        let parts = CompletedMultipartUpload {
            parts: vec![
                CompletedPart {
                    part_number: 1,
                    etag: etag1,
                },
                CompletedPart {
                    part_number: 2,
                    etag: etag2,
                },
            ],
        };

        service
            .complete_multipart_upload("b1", "big", &upload_id, parts.clone())
            .await
            .expect("first completion");
        let err = service
            .complete_multipart_upload("b1", "big", &upload_id, parts)
            .await
            .expect_err("second completion");
        assert!(matches!(err, S3ServiceError::NoSuchUpload { .. }));
    }

    #[tokio::test]
    async fn test_should_enforce_part_order_and_existence() {
        let (_dir, service) = service().await;
        let (upload_id, etag1, etag2) = staged_upload(&service).await;

        let err = service
            .complete_multipart_upload(
                "b1",
                "big",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![
                        CompletedPart {
                            part_number: 2,
                            etag: etag2.clone(),
                        },
                        CompletedPart {
                            part_number: 1,
                            etag: etag1.clone(),
                        },
                    ],
                },
            )
            .await
            .expect_err("descending order");
        assert!(matches!(err, S3ServiceError::InvalidPartOrder));

        let err = service
            .complete_multipart_upload(
                "b1",
                "big",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![CompletedPart {
                        part_number: 3,
                        etag: etag1.clone(),
                    }],
                },
            )
            .await
            .expect_err("unstaged part");
        assert!(matches!(err, S3ServiceError::InvalidPart));

        let err = service
            .complete_multipart_upload(
                "b1",
                "big",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![CompletedPart {
                        part_number: 1,
                        etag: "\"wrong\"".to_owned(),
                    }],
                },
            )
            .await
            .expect_err("etag mismatch");
        assert!(matches!(err, S3ServiceError::InvalidPart));
    }

    #[tokio::test]
    async fn test_should_enforce_minimum_part_size_except_last() {
        let (_dir, service) = service().await;
        let upload_id = service
            .create_multipart_upload("b1", "small", PutObjectOptions::default())
            .await
            .expect("initiate");
        let tiny1 = service
            .upload_part("b1", "small", &upload_id, 1, body(b"tiny".to_vec()), None, None)
            .await
            .expect("part 1");
        let tiny2 = service
            .upload_part("b1", "small", &upload_id, 2, body(b"tiny".to_vec()), None, None)
            .await
            .expect("part 2");

        let err = service
            .complete_multipart_upload(
                "b1",
                "small",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![
                        CompletedPart {
                            part_number: 1,
                            etag: tiny1.etag.clone(),
                        },
                        CompletedPart {
                            part_number: 2,
                            etag: tiny2.etag,
                        },
                    ],
                },
            )
            .await
            .expect_err("tiny non-final part");
        assert!(matches!(err, S3ServiceError::EntityTooSmall));

        // A single small part is fine: the last part may be any size.
        service
            .complete_multipart_upload(
                "b1",
                "small",
                &upload_id,
                CompletedMultipartUpload {
                    parts: vec![CompletedPart {
                        part_number: 1,
                        etag: tiny1.etag,
                    }],
                },
            )
            .await
            .expect("single small part");
    }

    #[tokio::test]
    async fn test_should_abort_and_report_unknown_upload() {
        let (_dir, service) = service().await;
        let upload_id = service
            .create_multipart_upload("b1", "gone", PutObjectOptions::default())
            .await
            .expect("initiate");
        service
            .upload_part("b1", "gone", &upload_id, 1, body(b"x".to_vec()), None, None)
            .await
            .expect("part");

        service
            .abort_multipart_upload("b1", "gone", &upload_id)
            .await
            .expect("abort");
        let err = service
            .abort_multipart_upload("b1", "gone", &upload_id)
            .await
            .expect_err("second abort");
        assert!(matches!(err, S3ServiceError::NoSuchUpload { .. }));

        // The key never materialized.
        assert!(matches!(
            service
                .get_object("b1", "gone", None, &Preconditions::default())
                .await,
            Err(S3ServiceError::NoSuchKey { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_reject_out_of_range_part_numbers() {
        let (_dir, service) = service().await;
        let upload_id = service
            .create_multipart_upload("b1", "k", PutObjectOptions::default())
            .await
            .expect("initiate");

        for bad in [0, 10_001] {
            let err = service
                .upload_part("b1", "k", &upload_id, bad, body(b"x".to_vec()), None, None)
                .await
                .expect_err("out of range");
            assert!(matches!(err, S3ServiceError::InvalidArgument { .. }));
        }
        // Part number 10000 is the inclusive maximum.
        service
            .upload_part("b1", "k", &upload_id, 10_000, body(b"x".to_vec()), None, None)
            .await
            .expect("maximum part number");
    }

    #[tokio::test]
    async fn test_should_copy_a_range_into_a_part() {
        let (_dir, service) = service().await;
        service
            .put_object("b1", "src", body(b"0123456789".to_vec()), PutObjectOptions::default())
            .await
            .expect("put src");

        let upload_id = service
            .create_multipart_upload("b1", "dst", PutObjectOptions::default())
            .await
            .expect("initiate");
        let result = service
            .upload_part_copy("b1", "dst", &upload_id, 1, "b1", "src", None, Some((2, 5)))
            .await
            .expect("part copy");
        assert_eq!(result.etag, format!("\"{}\"", compute_md5(b"2345")));

        let err = service
            .upload_part_copy("b1", "dst", &upload_id, 2, "b1", "src", None, Some((50, 60)))
            .await
            .expect_err("bad range");
        assert!(matches!(err, S3ServiceError::InvalidRange));
    }

    #[tokio::test]
    async fn test_should_list_uploads_and_parts_with_pagination() {
        let (_dir, service) = service().await;
        let upload_id = service
            .create_multipart_upload("b1", "k", PutObjectOptions::default())
            .await
            .expect("initiate");
        for part_number in 1..=4 {
            service
                .upload_part("b1", "k", &upload_id, part_number, body(b"x".to_vec()), None, None)
                .await
                .expect("part");
        }

        let uploads = service
            .list_multipart_uploads("b1", None, None, None, None)
            .await
            .expect("list uploads");
        assert_eq!(uploads.uploads.len(), 1);
        assert_eq!(uploads.uploads[0].upload_id, upload_id);

        let page1 = service
            .list_parts("b1", "k", &upload_id, None, Some(3))
            .await
            .expect("page 1");
        assert_eq!(page1.parts.len(), 3);
        assert!(page1.is_truncated);
        let page2 = service
            .list_parts("b1", "k", &upload_id, page1.next_part_number_marker, Some(3))
            .await
            .expect("page 2");
        assert_eq!(page2.parts.len(), 1);
        assert!(!page2.is_truncated);
        assert_eq!(page2.parts[0].part_number, 4);
    }
}
