//! S3 request routing: operation identification and bucket/key resolution.
//!
//! The same path maps to many operations depending on the HTTP method and on
//! which query keys are present (`?uploads`, `?uploadId=`, `?versioning`,
//! `?tagging`, ...). Resolution order for a request `METHOD /bucket[/key]`:
//!
//! 1. bare `/` is ListBuckets (GET only);
//! 2. bucket-only paths dispatch on the subresource query key;
//! 3. key paths with `uploadId` are multipart operations on that upload;
//! 4. key paths with `?uploads` on POST create a multipart upload;
//! 5. otherwise key-level subresources, then the bare object operation.
//!
//! The bucket may also come from a virtual-hosted `Host` header. Keys are
//! decoded permissively: S3 keys are not URIs and may contain any byte.

use http::Method;
use percent_encoding::percent_decode_str;

use mocks3_model::error::S3Error;
use mocks3_model::operations::S3Operation;

/// Configuration for S3 request routing.
#[derive(Debug, Clone)]
pub struct S3Router {
    /// Base domain for virtual-hosted-style requests (e.g. `s3.localhost`).
    pub domain: String,
    /// Whether virtual-hosted-style bucket addressing is enabled.
    pub virtual_hosting: bool,
}

/// The result of routing an HTTP request.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved object key, if any.
    pub key: Option<String>,
    /// The identified operation.
    pub operation: S3Operation,
    /// Parsed query parameters, decoded, in request order.
    pub query_params: Vec<(String, String)>,
}

impl RoutingContext {
    /// Look up a query parameter value by name.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        query_value(&self.query_params, name)
    }
}

impl S3Router {
    /// Create a new router.
    #[must_use]
    pub fn new(domain: impl Into<String>, virtual_hosting: bool) -> Self {
        Self {
            domain: domain.into(),
            virtual_hosting,
        }
    }

    /// Resolve a request to its operation, bucket, and key.
    ///
    /// # Errors
    ///
    /// Returns an [`S3Error`] when the request cannot be mapped to a
    /// supported operation.
    pub fn resolve<B>(&self, req: &http::Request<B>) -> Result<RoutingContext, S3Error> {
        let method = req.method();
        let uri = req.uri();
        let headers = req.headers();

        let query_params = parse_query_params(uri.query().unwrap_or(""));

        let virtual_bucket = if self.virtual_hosting {
            extract_virtual_host_bucket(headers, &self.domain)
        } else {
            None
        };

        let path = uri.path();
        let (bucket, key) = if let Some(vhost_bucket) = virtual_bucket {
            // Virtual hosting: the entire path is the key.
            let raw_key = path.strip_prefix('/').unwrap_or(path);
            let key = if raw_key.is_empty() {
                None
            } else {
                Some(decode_component(raw_key))
            };
            (Some(vhost_bucket), key)
        } else {
            parse_path(path)
        };

        let operation =
            identify_operation(method, bucket.as_deref(), key.as_deref(), &query_params, headers)?;

        Ok(RoutingContext {
            bucket,
            key,
            operation,
            query_params,
        })
    }
}

/// Extract the bucket name from a virtual-hosted-style `Host` header.
fn extract_virtual_host_bucket(headers: &http::HeaderMap, domain: &str) -> Option<String> {
    let host = headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())?;
    let host = host.split(':').next().unwrap_or(host);

    let suffix = format!(".{domain}");
    let bucket = host.strip_suffix(&suffix)?;
    if bucket.is_empty() {
        None
    } else {
        Some(bucket.to_owned())
    }
}

/// Split `/{bucket}` or `/{bucket}/{key...}` into its components.
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.find('/') {
        Some(pos) => {
            let bucket = decode_component(&trimmed[..pos]);
            let raw_key = &trimmed[pos + 1..];
            let key = if raw_key.is_empty() {
                None
            } else {
                Some(decode_component(raw_key))
            };
            (Some(bucket), key)
        }
        None => (Some(decode_component(trimmed)), None),
    }
}

/// Decode a percent-encoded path or query component.
fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into decoded key/value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.find('=') {
            Some(pos) => (
                decode_component(&pair[..pos]),
                decode_component(&pair[pos + 1..]),
            ),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Map method + path shape + query keys + headers to an operation.
fn identify_operation(
    method: &Method,
    bucket: Option<&str>,
    key: Option<&str>,
    params: &[(String, String)],
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    match (bucket, key) {
        (None, None) => {
            if method == Method::GET {
                Ok(S3Operation::ListBuckets)
            } else {
                Err(S3Error::method_not_allowed(method.as_str()))
            }
        }
        (Some(_), None) => identify_bucket_operation(method, params),
        (Some(_), Some(_)) => identify_object_operation(method, params, headers),
        (None, Some(_)) => Err(S3Error::invalid_request(
            "Object key specified without bucket",
        )),
    }
}

fn identify_bucket_operation(
    method: &Method,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match *method {
        Method::GET => Ok(identify_bucket_get(params)),
        Method::PUT => Ok(identify_bucket_put(params)),
        Method::DELETE => Ok(identify_bucket_delete(params)),
        Method::HEAD => Ok(S3Operation::HeadBucket),
        Method::POST => {
            if query_has_key(params, "delete") {
                Ok(S3Operation::DeleteObjects)
            } else {
                Err(S3Error::method_not_allowed("POST"))
            }
        }
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}

fn identify_bucket_get(params: &[(String, String)]) -> S3Operation {
    if query_value(params, "list-type") == Some("2") {
        return S3Operation::ListObjectsV2;
    }
    if query_has_key(params, "location") {
        return S3Operation::GetBucketLocation;
    }
    if query_has_key(params, "versioning") {
        return S3Operation::GetBucketVersioning;
    }
    if query_has_key(params, "tagging") {
        return S3Operation::GetBucketTagging;
    }
    if query_has_key(params, "acl") {
        return S3Operation::GetBucketAcl;
    }
    if query_has_key(params, "policy") {
        return S3Operation::GetBucketPolicy;
    }
    if query_has_key(params, "cors") {
        return S3Operation::GetBucketCors;
    }
    if query_has_key(params, "lifecycle") {
        return S3Operation::GetBucketLifecycleConfiguration;
    }
    if query_has_key(params, "object-lock") {
        return S3Operation::GetObjectLockConfiguration;
    }
    if query_has_key(params, "ownershipControls") {
        return S3Operation::GetBucketOwnershipControls;
    }
    if query_has_key(params, "encryption") {
        return S3Operation::GetBucketEncryption;
    }
    if query_has_key(params, "uploads") {
        return S3Operation::ListMultipartUploads;
    }
    if query_has_key(params, "versions") {
        return S3Operation::ListObjectVersions;
    }
    S3Operation::ListObjects
}

fn identify_bucket_put(params: &[(String, String)]) -> S3Operation {
    if query_has_key(params, "versioning") {
        return S3Operation::PutBucketVersioning;
    }
    if query_has_key(params, "tagging") {
        return S3Operation::PutBucketTagging;
    }
    if query_has_key(params, "acl") {
        return S3Operation::PutBucketAcl;
    }
    if query_has_key(params, "policy") {
        return S3Operation::PutBucketPolicy;
    }
    if query_has_key(params, "cors") {
        return S3Operation::PutBucketCors;
    }
    if query_has_key(params, "lifecycle") {
        return S3Operation::PutBucketLifecycleConfiguration;
    }
    if query_has_key(params, "object-lock") {
        return S3Operation::PutObjectLockConfiguration;
    }
    if query_has_key(params, "ownershipControls") {
        return S3Operation::PutBucketOwnershipControls;
    }
    if query_has_key(params, "encryption") {
        return S3Operation::PutBucketEncryption;
    }
    S3Operation::CreateBucket
}

fn identify_bucket_delete(params: &[(String, String)]) -> S3Operation {
    if query_has_key(params, "tagging") {
        return S3Operation::DeleteBucketTagging;
    }
    if query_has_key(params, "policy") {
        return S3Operation::DeleteBucketPolicy;
    }
    if query_has_key(params, "cors") {
        return S3Operation::DeleteBucketCors;
    }
    if query_has_key(params, "lifecycle") {
        return S3Operation::DeleteBucketLifecycle;
    }
    if query_has_key(params, "encryption") {
        return S3Operation::DeleteBucketEncryption;
    }
    S3Operation::DeleteBucket
}

fn identify_object_operation(
    method: &Method,
    params: &[(String, String)],
    headers: &http::HeaderMap,
) -> Result<S3Operation, S3Error> {
    let has_copy_source = headers.contains_key("x-amz-copy-source");

    match *method {
        Method::GET => Ok(identify_object_get(params)),
        Method::PUT => Ok(identify_object_put(params, has_copy_source)),
        Method::DELETE => Ok(identify_object_delete(params)),
        Method::HEAD => Ok(S3Operation::HeadObject),
        Method::POST => {
            if query_has_key(params, "uploads") {
                Ok(S3Operation::CreateMultipartUpload)
            } else if query_has_key(params, "uploadId") {
                Ok(S3Operation::CompleteMultipartUpload)
            } else {
                Err(S3Error::method_not_allowed("POST"))
            }
        }
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}

fn identify_object_get(params: &[(String, String)]) -> S3Operation {
    if query_has_key(params, "uploadId") {
        return S3Operation::ListParts;
    }
    if query_has_key(params, "tagging") {
        return S3Operation::GetObjectTagging;
    }
    if query_has_key(params, "acl") {
        return S3Operation::GetObjectAcl;
    }
    if query_has_key(params, "retention") {
        return S3Operation::GetObjectRetention;
    }
    if query_has_key(params, "legal-hold") {
        return S3Operation::GetObjectLegalHold;
    }
    S3Operation::GetObject
}

fn identify_object_put(params: &[(String, String)], has_copy_source: bool) -> S3Operation {
    if query_has_key(params, "partNumber") && query_has_key(params, "uploadId") {
        return if has_copy_source {
            S3Operation::UploadPartCopy
        } else {
            S3Operation::UploadPart
        };
    }
    if query_has_key(params, "tagging") {
        return S3Operation::PutObjectTagging;
    }
    if query_has_key(params, "acl") {
        return S3Operation::PutObjectAcl;
    }
    if query_has_key(params, "retention") {
        return S3Operation::PutObjectRetention;
    }
    if query_has_key(params, "legal-hold") {
        return S3Operation::PutObjectLegalHold;
    }
    if has_copy_source {
        return S3Operation::CopyObject;
    }
    S3Operation::PutObject
}

fn identify_object_delete(params: &[(String, String)]) -> S3Operation {
    if query_has_key(params, "uploadId") {
        return S3Operation::AbortMultipartUpload;
    }
    if query_has_key(params, "tagging") {
        return S3Operation::DeleteObjectTagging;
    }
    S3Operation::DeleteObject
}
