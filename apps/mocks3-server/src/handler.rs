//! The bridge between the HTTP layer and the core service.
//!
//! Implements [`S3Handler`]: for each routed operation, extract the typed
//! inputs from headers/query/body, call the matching [`S3Service`] method,
//! and render the result as an HTTP response. All S3 semantics live below
//! in `mocks3-core`; everything here is header and XML plumbing.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use mocks3_core::S3Service;
use mocks3_core::checksums::ChecksumAlgorithm;
use mocks3_core::conditional::Preconditions;
use mocks3_core::ops::{CopyDestination, ListParams, PutObjectOptions};
use mocks3_core::store::SseInfo;
use mocks3_core::store::meta::ObjectVersionMeta;
use mocks3_http::body::{S3RequestBody, S3ResponseBody};
use mocks3_http::dispatch::S3Handler;
use mocks3_core::paths::NULL_VERSION_ID;
use mocks3_http::headers::{
    Directive, format_http_date, parse_canned_acl, parse_copy_source, parse_directive,
    parse_http_date, parse_object_ownership, parse_range, parse_tagging_header,
};
use mocks3_http::request::{collect_metadata, header_str, query_param_parse};
use mocks3_http::response::{empty_response, set_optional_header, xml_response};
use mocks3_http::router::RoutingContext;
use mocks3_model::error::S3Error;
use mocks3_model::operations::S3Operation;
use mocks3_model::types::{
    AccessControlPolicy, BucketLifecycleConfiguration, CompletedMultipartUpload, CorsConfiguration,
    CreateBucketConfiguration, Delete, ObjectLockConfiguration, ObjectLockLegalHold,
    ObjectLockRetention, OwnershipControls, ServerSideEncryption,
    ServerSideEncryptionConfiguration, Tagging, VersioningConfiguration,
};
use mocks3_xml::from_xml;

type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>;

/// The emulator's [`S3Handler`] implementation.
#[derive(Clone)]
pub struct MockS3Handler {
    service: Arc<S3Service>,
}

impl MockS3Handler {
    /// Wrap a service.
    #[must_use]
    pub fn new(service: Arc<S3Service>) -> Self {
        Self { service }
    }
}

impl S3Handler for MockS3Handler {
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: S3RequestBody,
        ctx: RoutingContext,
    ) -> HandlerFuture {
        let service = Arc::clone(&self.service);
        Box::pin(async move { route(&service, op, parts, body, ctx).await })
    }
}

#[allow(clippy::too_many_lines)]
async fn route(
    service: &S3Service,
    op: S3Operation,
    parts: http::request::Parts,
    body: S3RequestBody,
    ctx: RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    use S3Operation as Op;
    match op {
        Op::ListBuckets => {
            let output = service.list_buckets().await?;
            xml_response(http::StatusCode::OK, "ListAllMyBucketsResult", &output)
        }

        // --- Bucket CRUD ---
        Op::CreateBucket => create_bucket(service, &parts, body, &ctx).await,
        Op::DeleteBucket => {
            service.delete_bucket(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::HeadBucket => {
            let meta = service.head_bucket(bucket(&ctx)?).await?;
            let region = meta.region.unwrap_or_else(|| service.region().to_owned());
            let builder = http::Response::builder()
                .status(http::StatusCode::OK)
                .header("x-amz-bucket-region", region);
            builder
                .body(S3ResponseBody::empty())
                .map_err(|e| S3Error::internal_error(e.to_string()))
        }
        Op::GetBucketLocation => {
            let output = service.get_bucket_location(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "LocationConstraint", &output)
        }

        // --- Bucket config ---
        Op::GetBucketVersioning => {
            let output = service.get_bucket_versioning(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "VersioningConfiguration", &output)
        }
        Op::PutBucketVersioning => {
            let config: VersioningConfiguration = parse_body(&body.collect().await?)?;
            service.put_bucket_versioning(bucket(&ctx)?, config).await?;
            empty_response(http::StatusCode::OK)
        }
        Op::GetBucketTagging => {
            let output = service.get_bucket_tagging(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "Tagging", &output)
        }
        Op::PutBucketTagging => {
            let tagging: Tagging = parse_body(&body.collect().await?)?;
            service.put_bucket_tagging(bucket(&ctx)?, tagging).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::DeleteBucketTagging => {
            service.delete_bucket_tagging(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetBucketAcl => {
            let output = service.get_bucket_acl(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "AccessControlPolicy", &output)
        }
        Op::PutBucketAcl => {
            let canned = opt_canned_acl(&parts)?;
            let policy = parse_optional_body::<AccessControlPolicy>(&body.collect().await?)?;
            service.put_bucket_acl(bucket(&ctx)?, canned, policy).await?;
            empty_response(http::StatusCode::OK)
        }
        Op::GetBucketPolicy => {
            let policy = service.get_bucket_policy(bucket(&ctx)?).await?;
            http::Response::builder()
                .status(http::StatusCode::OK)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(S3ResponseBody::from_bytes(policy))
                .map_err(|e| S3Error::internal_error(e.to_string()))
        }
        Op::PutBucketPolicy => {
            let policy = String::from_utf8(body.collect().await?.to_vec())
                .map_err(|_| S3Error::invalid_request("Policy must be UTF-8"))?;
            service.put_bucket_policy(bucket(&ctx)?, policy).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::DeleteBucketPolicy => {
            service.delete_bucket_policy(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetBucketCors => {
            let output = service.get_bucket_cors(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "CORSConfiguration", &output)
        }
        Op::PutBucketCors => {
            let config: CorsConfiguration = parse_body(&body.collect().await?)?;
            service.put_bucket_cors(bucket(&ctx)?, config).await?;
            empty_response(http::StatusCode::OK)
        }
        Op::DeleteBucketCors => {
            service.delete_bucket_cors(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetBucketLifecycleConfiguration => {
            let output = service.get_bucket_lifecycle(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "LifecycleConfiguration", &output)
        }
        Op::PutBucketLifecycleConfiguration => {
            let config: BucketLifecycleConfiguration = parse_body(&body.collect().await?)?;
            service.put_bucket_lifecycle(bucket(&ctx)?, config).await?;
            empty_response(http::StatusCode::OK)
        }
        Op::DeleteBucketLifecycle => {
            service.delete_bucket_lifecycle(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetBucketEncryption => {
            let output = service.get_bucket_encryption(bucket(&ctx)?).await?;
            xml_response(
                http::StatusCode::OK,
                "ServerSideEncryptionConfiguration",
                &output,
            )
        }
        Op::PutBucketEncryption => {
            let config: ServerSideEncryptionConfiguration = parse_body(&body.collect().await?)?;
            service.put_bucket_encryption(bucket(&ctx)?, config).await?;
            empty_response(http::StatusCode::OK)
        }
        Op::DeleteBucketEncryption => {
            service.delete_bucket_encryption(bucket(&ctx)?).await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetObjectLockConfiguration => {
            let output = service.get_object_lock_configuration(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "ObjectLockConfiguration", &output)
        }
        Op::PutObjectLockConfiguration => {
            let config: ObjectLockConfiguration = parse_body(&body.collect().await?)?;
            service
                .put_object_lock_configuration(bucket(&ctx)?, config)
                .await?;
            empty_response(http::StatusCode::OK)
        }
        Op::GetBucketOwnershipControls => {
            let output = service.get_bucket_ownership_controls(bucket(&ctx)?).await?;
            xml_response(http::StatusCode::OK, "OwnershipControls", &output)
        }
        Op::PutBucketOwnershipControls => {
            let controls: OwnershipControls = parse_body(&body.collect().await?)?;
            service
                .put_bucket_ownership_controls(bucket(&ctx)?, controls)
                .await?;
            empty_response(http::StatusCode::OK)
        }

        // --- Listings ---
        Op::ListObjects => {
            let params = list_params(&ctx)?;
            let output = service
                .list_objects(bucket(&ctx)?, &params, ctx.query("marker"))
                .await?;
            xml_response(http::StatusCode::OK, "ListBucketResult", &output)
        }
        Op::ListObjectsV2 => {
            let params = list_params(&ctx)?;
            let output = service
                .list_objects_v2(
                    bucket(&ctx)?,
                    &params,
                    ctx.query("start-after"),
                    ctx.query("continuation-token"),
                    ctx.query("fetch-owner") == Some("true"),
                )
                .await?;
            xml_response(http::StatusCode::OK, "ListBucketResult", &output)
        }
        Op::ListObjectVersions => {
            let params = list_params(&ctx)?;
            let output = service
                .list_object_versions(
                    bucket(&ctx)?,
                    &params,
                    ctx.query("key-marker"),
                    ctx.query("version-id-marker"),
                )
                .await?;
            xml_response(http::StatusCode::OK, "ListVersionsResult", &output)
        }
        Op::ListMultipartUploads => {
            let output = service
                .list_multipart_uploads(
                    bucket(&ctx)?,
                    ctx.query("prefix"),
                    ctx.query("key-marker"),
                    ctx.query("upload-id-marker"),
                    query_param_parse(&ctx.query_params, "max-uploads")?,
                )
                .await?;
            xml_response(http::StatusCode::OK, "ListMultipartUploadsResult", &output)
        }

        // --- Object CRUD ---
        Op::PutObject => put_object(service, &parts, body, &ctx).await,
        Op::GetObject => get_object(service, &parts, &ctx, true).await,
        Op::HeadObject => get_object(service, &parts, &ctx, false).await,
        Op::DeleteObject => {
            let result = service
                .delete_object(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            let mut builder = http::Response::builder().status(http::StatusCode::NO_CONTENT);
            if result.delete_marker == Some(true) {
                builder = builder.header("x-amz-delete-marker", "true");
            }
            builder = set_optional_header(builder, "x-amz-version-id", result.version_id.as_deref());
            builder
                .body(S3ResponseBody::empty())
                .map_err(|e| S3Error::internal_error(e.to_string()))
        }
        Op::DeleteObjects => {
            let delete: Delete = parse_body(&body.collect().await?)?;
            let output = service.delete_objects(bucket(&ctx)?, delete).await?;
            xml_response(http::StatusCode::OK, "DeleteResult", &output)
        }
        Op::CopyObject => copy_object(service, &parts, &ctx).await,

        // --- Object subresources ---
        Op::GetObjectTagging => {
            let (version_id, output) = service
                .get_object_tagging(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            let xml = mocks3_xml::to_xml("Tagging", &output)
                .map_err(|e| S3Error::internal_error(e.to_string()))?;
            let mut builder = http::Response::builder()
                .status(http::StatusCode::OK)
                .header(http::header::CONTENT_TYPE, "application/xml");
            if version_id != NULL_VERSION_ID {
                builder = builder.header("x-amz-version-id", version_id);
            }
            builder
                .body(S3ResponseBody::from_xml(xml))
                .map_err(|e| S3Error::internal_error(e.to_string()))
        }
        Op::PutObjectTagging => {
            let tagging: Tagging = parse_body(&body.collect().await?)?;
            service
                .put_object_tagging(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"), tagging)
                .await?;
            empty_response(http::StatusCode::OK)
        }
        Op::DeleteObjectTagging => {
            service
                .delete_object_tagging(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        Op::GetObjectAcl => {
            let output = service
                .get_object_acl(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            xml_response(http::StatusCode::OK, "AccessControlPolicy", &output)
        }
        Op::PutObjectAcl => {
            let canned = opt_canned_acl(&parts)?;
            let policy = parse_optional_body::<AccessControlPolicy>(&body.collect().await?)?;
            service
                .put_object_acl(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"), canned, policy)
                .await?;
            empty_response(http::StatusCode::OK)
        }
        Op::GetObjectRetention => {
            let output = service
                .get_object_retention(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            xml_response(http::StatusCode::OK, "Retention", &output)
        }
        Op::PutObjectRetention => {
            let retention: ObjectLockRetention = parse_body(&body.collect().await?)?;
            service
                .put_object_retention(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"), retention)
                .await?;
            empty_response(http::StatusCode::OK)
        }
        Op::GetObjectLegalHold => {
            let output = service
                .get_object_legal_hold(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"))
                .await?;
            xml_response(http::StatusCode::OK, "LegalHold", &output)
        }
        Op::PutObjectLegalHold => {
            let hold: ObjectLockLegalHold = parse_body(&body.collect().await?)?;
            service
                .put_object_legal_hold(bucket(&ctx)?, key(&ctx)?, ctx.query("versionId"), hold)
                .await?;
            empty_response(http::StatusCode::OK)
        }

        // --- Multipart ---
        Op::CreateMultipartUpload => {
            let options = put_options(&parts, &ctx)?;
            let upload_id = service
                .create_multipart_upload(bucket(&ctx)?, key(&ctx)?, options)
                .await?;
            let output = mocks3_model::output::CreateMultipartUploadOutput {
                bucket: bucket(&ctx)?.to_owned(),
                key: key(&ctx)?.to_owned(),
                upload_id,
            };
            xml_response(http::StatusCode::OK, "InitiateMultipartUploadResult", &output)
        }
        Op::UploadPart => upload_part(service, &parts, body, &ctx).await,
        Op::UploadPartCopy => upload_part_copy(service, &parts, &ctx).await,
        Op::ListParts => {
            let output = service
                .list_parts(
                    bucket(&ctx)?,
                    key(&ctx)?,
                    require_upload_id(&ctx)?,
                    query_param_parse(&ctx.query_params, "part-number-marker")?,
                    query_param_parse(&ctx.query_params, "max-parts")?,
                )
                .await?;
            xml_response(http::StatusCode::OK, "ListPartsResult", &output)
        }
        Op::CompleteMultipartUpload => {
            let requested: CompletedMultipartUpload = parse_body(&body.collect().await?)?;
            let bucket_name = bucket(&ctx)?;
            let key_name = key(&ctx)?;
            let result = service
                .complete_multipart_upload(
                    bucket_name,
                    key_name,
                    require_upload_id(&ctx)?,
                    requested,
                )
                .await?;
            let output = mocks3_model::output::CompleteMultipartUploadOutput {
                location: format!("/{bucket_name}/{key_name}"),
                bucket: bucket_name.to_owned(),
                key: key_name.to_owned(),
                etag: result.etag,
            };
            let xml = mocks3_xml::to_xml("CompleteMultipartUploadResult", &output)
                .map_err(|e| S3Error::internal_error(e.to_string()))?;
            let mut builder = http::Response::builder()
                .status(http::StatusCode::OK)
                .header(http::header::CONTENT_TYPE, "application/xml");
            builder = set_optional_header(builder, "x-amz-version-id", result.version_id.as_deref());
            builder
                .body(S3ResponseBody::from_xml(xml))
                .map_err(|e| S3Error::internal_error(e.to_string()))
        }
        Op::AbortMultipartUpload => {
            service
                .abort_multipart_upload(bucket(&ctx)?, key(&ctx)?, require_upload_id(&ctx)?)
                .await?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
    }
}

// ---------------------------------------------------------------------------
// Per-operation helpers
// ---------------------------------------------------------------------------

async fn create_bucket(
    service: &S3Service,
    parts: &http::request::Parts,
    body: S3RequestBody,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let bucket_name = bucket(ctx)?;
    let payload = body.collect().await?;
    let config = parse_optional_body::<CreateBucketConfiguration>(&payload)?.unwrap_or_default();

    let canned = opt_canned_acl(parts)?;
    let ownership = match header_str(parts, "x-amz-object-ownership") {
        Some(value) => Some(parse_object_ownership(&value)?),
        None => None,
    };
    let object_lock = header_str(parts, "x-amz-bucket-object-lock-enabled")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    service
        .create_bucket(
            bucket_name,
            config.location_constraint,
            canned,
            ownership,
            object_lock,
        )
        .await?;

    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Location", format!("/{bucket_name}"))
        .body(S3ResponseBody::empty())
        .map_err(|e| S3Error::internal_error(e.to_string()))
}

async fn put_object(
    service: &S3Service,
    parts: &http::request::Parts,
    body: S3RequestBody,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let options = put_options(parts, ctx)?;
    let result = service
        .put_object(bucket(ctx)?, key(ctx)?, body.into_data_stream(), options)
        .await?;

    let mut builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header("ETag", &result.etag);
    builder = set_optional_header(builder, "x-amz-version-id", result.version_id.as_deref());
    builder = sse_headers(builder, result.sse.as_ref());
    if let Some(checksum) = &result.checksum {
        builder = builder.header(checksum.algorithm.header_name(), &checksum.value);
    }
    builder
        .body(S3ResponseBody::empty())
        .map_err(|e| S3Error::internal_error(e.to_string()))
}

async fn get_object(
    service: &S3Service,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
    with_body: bool,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let preconditions = preconditions(parts);
    let result = service
        .get_object(bucket(ctx)?, key(ctx)?, ctx.query("versionId"), &preconditions)
        .await?;
    let meta = result.meta;
    let mut file = result.file;

    let range = match header_str(parts, "range") {
        Some(header) => Some(parse_range(&header, meta.size)?),
        None => None,
    };

    let (status, content_length) = match &range {
        Some(range) => (http::StatusCode::PARTIAL_CONTENT, range.len()),
        None => (http::StatusCode::OK, meta.size),
    };

    let mut builder = http::Response::builder()
        .status(status)
        .header("ETag", &meta.etag)
        .header("Last-Modified", format_http_date(&meta.last_modified))
        .header("Accept-Ranges", "bytes")
        .header("Content-Length", content_length)
        .header(
            http::header::CONTENT_TYPE,
            meta.system
                .content_type
                .as_deref()
                .unwrap_or("application/octet-stream"),
        );
    if let Some(range) = &range {
        builder = builder.header("Content-Range", range.content_range(meta.size));
    }
    builder = object_headers(builder, &meta);

    let body = if with_body {
        if let Some(range) = &range {
            tokio::io::AsyncSeekExt::seek(&mut file, std::io::SeekFrom::Start(range.start))
                .await
                .map_err(|e| S3Error::internal_error(e.to_string()))?;
        }
        S3ResponseBody::from_file(file, content_length)
    } else {
        S3ResponseBody::empty()
    };

    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(e.to_string()))
}

async fn copy_object(
    service: &S3Service,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let source_header = header_str(parts, "x-amz-copy-source")
        .ok_or_else(|| S3Error::invalid_request("Missing x-amz-copy-source"))?;
    let source = parse_copy_source(&source_header)?;

    let metadata_directive =
        parse_directive(header_str(parts, "x-amz-metadata-directive").as_deref())?;
    let tagging_directive =
        parse_directive(header_str(parts, "x-amz-tagging-directive").as_deref())?;

    let destination = CopyDestination {
        bucket: bucket(ctx)?.to_owned(),
        key: key(ctx)?.to_owned(),
        replace_metadata: metadata_directive == Directive::Replace,
        replace_tagging: tagging_directive == Directive::Replace,
        options: put_options(parts, ctx)?,
    };

    let result = service
        .copy_object(
            &source.bucket,
            &source.key,
            source.version_id.as_deref(),
            destination,
        )
        .await?;

    let xml = mocks3_xml::to_xml("CopyObjectResult", &result.result)
        .map_err(|e| S3Error::internal_error(e.to_string()))?;
    let mut builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/xml");
    builder = set_optional_header(builder, "x-amz-version-id", result.version_id.as_deref());
    builder = set_optional_header(
        builder,
        "x-amz-copy-source-version-id",
        result.source_version_id.as_deref(),
    );
    builder
        .body(S3ResponseBody::from_xml(xml))
        .map_err(|e| S3Error::internal_error(e.to_string()))
}

async fn upload_part(
    service: &S3Service,
    parts: &http::request::Parts,
    body: S3RequestBody,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let part_number = require_part_number(ctx)?;
    let checksum_algorithm = checksum_algorithm(parts, ctx)?;
    let expected_checksum =
        checksum_algorithm.and_then(|alg| header_str(parts, alg.header_name()));

    let result = service
        .upload_part(
            bucket(ctx)?,
            key(ctx)?,
            require_upload_id(ctx)?,
            part_number,
            body.into_data_stream(),
            header_str(parts, "content-md5").as_deref(),
            expected_checksum.as_deref(),
        )
        .await?;

    let mut builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header("ETag", &result.etag);
    if let Some(checksum) = &result.checksum {
        builder = builder.header(checksum.algorithm.header_name(), &checksum.value);
    }
    builder
        .body(S3ResponseBody::empty())
        .map_err(|e| S3Error::internal_error(e.to_string()))
}

async fn upload_part_copy(
    service: &S3Service,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let source_header = header_str(parts, "x-amz-copy-source")
        .ok_or_else(|| S3Error::invalid_request("Missing x-amz-copy-source"))?;
    let source = parse_copy_source(&source_header)?;
    let range = match header_str(parts, "x-amz-copy-source-range") {
        None => None,
        Some(header) => Some(parse_copy_range(&header)?),
    };

    let result = service
        .upload_part_copy(
            bucket(ctx)?,
            key(ctx)?,
            require_upload_id(ctx)?,
            require_part_number(ctx)?,
            &source.bucket,
            &source.key,
            source.version_id.as_deref(),
            range,
        )
        .await?;

    xml_response(http::StatusCode::OK, "CopyPartResult", &result)
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

fn bucket(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.bucket
        .as_deref()
        .ok_or_else(|| S3Error::invalid_request("Bucket name is required"))
}

fn key(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.key
        .as_deref()
        .ok_or_else(|| S3Error::invalid_request("Object key is required"))
}

fn require_upload_id(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.query("uploadId")
        .ok_or_else(|| S3Error::invalid_request("uploadId is required"))
}

fn require_part_number(ctx: &RoutingContext) -> Result<u32, S3Error> {
    query_param_parse::<u32>(&ctx.query_params, "partNumber")?
        .ok_or_else(|| S3Error::invalid_request("partNumber is required"))
}

fn list_params(ctx: &RoutingContext) -> Result<ListParams, S3Error> {
    Ok(ListParams {
        prefix: ctx.query("prefix").map(ToOwned::to_owned),
        delimiter: ctx
            .query("delimiter")
            .filter(|d| !d.is_empty())
            .map(ToOwned::to_owned),
        max_keys: query_param_parse(&ctx.query_params, "max-keys")?,
    })
}

fn preconditions(parts: &http::request::Parts) -> Preconditions {
    let etag_header = |name: &str| {
        header_str(parts, name).map(|v| v.trim_matches('"').to_owned())
    };
    let date_header = |name: &str| header_str(parts, name).and_then(|v| parse_http_date(&v));
    Preconditions {
        if_match: etag_header("if-match"),
        if_none_match: etag_header("if-none-match"),
        if_unmodified_since: date_header("if-unmodified-since"),
        if_modified_since: date_header("if-modified-since"),
    }
}

fn opt_canned_acl(
    parts: &http::request::Parts,
) -> Result<Option<mocks3_model::types::CannedAcl>, S3Error> {
    match header_str(parts, "x-amz-acl") {
        Some(value) => Ok(Some(parse_canned_acl(&value)?)),
        None => Ok(None),
    }
}

/// A request value that may arrive as a header or, for tooling convenience,
/// as a query parameter of the same name.
fn header_or_query(parts: &http::request::Parts, ctx: &RoutingContext, name: &str) -> Option<String> {
    header_str(parts, name).or_else(|| ctx.query(name).map(ToOwned::to_owned))
}

fn checksum_algorithm(
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<Option<ChecksumAlgorithm>, S3Error> {
    match header_or_query(parts, ctx, "x-amz-sdk-checksum-algorithm") {
        None => Ok(None),
        Some(value) => ChecksumAlgorithm::from_str(&value)
            .map(Some)
            .map_err(|e| S3Error::invalid_request(e.to_string())),
    }
}

fn sse_from_request(
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<Option<SseInfo>, S3Error> {
    let Some(algorithm) = header_or_query(parts, ctx, "x-amz-server-side-encryption") else {
        return Ok(None);
    };
    let algorithm = ServerSideEncryption::from_str(&algorithm)
        .map_err(|e| S3Error::invalid_request(e))?;
    let kms_key_id = header_or_query(parts, ctx, "x-amz-server-side-encryption-aws-kms-key-id");
    Ok(Some(SseInfo {
        algorithm,
        kms_key_id,
    }))
}

fn put_options(
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> Result<PutObjectOptions, S3Error> {
    let tags = match header_str(parts, "x-amz-tagging") {
        Some(header) => parse_tagging_header(&header)?,
        None => Vec::new(),
    };

    let retention = match (
        header_str(parts, "x-amz-object-lock-mode"),
        header_str(parts, "x-amz-object-lock-retain-until-date"),
    ) {
        (Some(mode), Some(date)) => {
            let mode = mode
                .parse()
                .map_err(|e: String| S3Error::invalid_request(e))?;
            let retain_until_date = chrono::DateTime::parse_from_rfc3339(&date)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|_| S3Error::invalid_request("Invalid retain-until date"))?;
            Some(ObjectLockRetention {
                mode,
                retain_until_date,
            })
        }
        _ => None,
    };

    let legal_hold = match header_str(parts, "x-amz-object-lock-legal-hold") {
        Some(value) => Some(
            value
                .parse()
                .map_err(|e: String| S3Error::invalid_request(e))?,
        ),
        None => None,
    };

    let checksum_algorithm = checksum_algorithm(parts, ctx)?;
    let expected_checksum =
        checksum_algorithm.and_then(|alg| header_str(parts, alg.header_name()));

    Ok(PutObjectOptions {
        system: mocks3_core::store::SystemMetadata {
            content_type: header_str(parts, "content-type"),
            content_encoding: header_str(parts, "content-encoding"),
            content_language: header_str(parts, "content-language"),
            content_disposition: header_str(parts, "content-disposition"),
            cache_control: header_str(parts, "cache-control"),
            expires: header_str(parts, "expires"),
        },
        user_metadata: collect_metadata(parts),
        tags,
        canned_acl: opt_canned_acl(parts)?,
        sse: sse_from_request(parts, ctx)?,
        checksum_algorithm,
        content_md5: header_str(parts, "content-md5"),
        expected_checksum,
        legal_hold,
        retention,
    })
}

/// Parse `x-amz-copy-source-range`: always the `bytes=a-b` form.
fn parse_copy_range(header: &str) -> Result<(u64, u64), S3Error> {
    let malformed = || S3Error::invalid_request(format!("Invalid copy source range: {header}"));
    let spec = header.strip_prefix("bytes=").ok_or_else(malformed)?;
    let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
    let start: u64 = start.parse().map_err(|_| malformed())?;
    let end: u64 = end.parse().map_err(|_| malformed())?;
    if start > end {
        return Err(malformed());
    }
    Ok((start, end))
}

fn parse_body<T: mocks3_xml::S3Deserialize>(body: &bytes::Bytes) -> Result<T, S3Error> {
    from_xml(body).map_err(|e| S3Error::malformed_xml(e.to_string()))
}

fn parse_optional_body<T: mocks3_xml::S3Deserialize>(
    body: &bytes::Bytes,
) -> Result<Option<T>, S3Error> {
    if body.is_empty() {
        return Ok(None);
    }
    parse_body(body).map(Some)
}

// ---------------------------------------------------------------------------
// Response header helpers
// ---------------------------------------------------------------------------

fn sse_headers(
    mut builder: http::response::Builder,
    sse: Option<&SseInfo>,
) -> http::response::Builder {
    if let Some(info) = sse {
        builder = builder.header("x-amz-server-side-encryption", info.algorithm.as_str());
        builder = set_optional_header(
            builder,
            "x-amz-server-side-encryption-aws-kms-key-id",
            info.kms_key_id.as_deref(),
        );
    }
    builder
}

/// The metadata headers shared by GetObject and HeadObject responses.
fn object_headers(
    mut builder: http::response::Builder,
    meta: &ObjectVersionMeta,
) -> http::response::Builder {
    builder = set_optional_header(builder, "Content-Encoding", meta.system.content_encoding.as_deref());
    builder = set_optional_header(builder, "Content-Language", meta.system.content_language.as_deref());
    builder = set_optional_header(
        builder,
        "Content-Disposition",
        meta.system.content_disposition.as_deref(),
    );
    builder = set_optional_header(builder, "Cache-Control", meta.system.cache_control.as_deref());
    builder = set_optional_header(builder, "Expires", meta.system.expires.as_deref());

    if meta.version_id != NULL_VERSION_ID {
        builder = builder.header("x-amz-version-id", &meta.version_id);
    }
    for (name, value) in &meta.user_metadata {
        if let Ok(header_value) = http::header::HeaderValue::from_str(value) {
            builder = builder.header(format!("x-amz-meta-{name}"), header_value);
        }
    }
    if !meta.tags.is_empty() {
        builder = builder.header("x-amz-tagging-count", meta.tags.len());
    }
    if let Some(parts_count) = meta.parts_count {
        builder = builder.header("x-amz-mp-parts-count", parts_count);
    }
    if let Some(checksum) = &meta.checksum {
        builder = builder.header(checksum.algorithm.header_name(), &checksum.value);
    }
    builder = sse_headers(builder, meta.sse.as_ref());
    if let Some(retention) = &meta.retention {
        builder = builder.header("x-amz-object-lock-mode", retention.mode.as_str());
        builder = builder.header(
            "x-amz-object-lock-retain-until-date",
            retention.retain_until_date.to_rfc3339(),
        );
    }
    if let Some(hold) = meta.legal_hold {
        builder = builder.header("x-amz-object-lock-legal-hold", hold.as_str());
    }
    builder
}
