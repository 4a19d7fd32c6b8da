//! The hyper `Service` implementation.
//!
//! Request lifecycle: health-check interception, request-id allocation,
//! routing, dispatch to the [`S3Handler`], error envelope rendering, and the
//! common response headers every S3 response carries.
//!
//! Request bodies are NOT collected here: the handler receives a streaming
//! [`S3RequestBody`] so large PUTs go to disk without buffering. Bodies are
//! opaque bytes regardless of their `Content-Type`; nothing in the pipeline
//! form-decodes them.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::body::{S3RequestBody, S3ResponseBody};
use crate::dispatch::{S3Handler, dispatch_operation};
use crate::response::error_to_response;
use crate::router::S3Router;

/// Configuration for the S3 HTTP service.
#[derive(Debug, Clone)]
pub struct S3HttpConfig {
    /// Base domain for virtual-hosted-style requests.
    pub domain: String,
    /// Whether virtual-hosted-style addressing is enabled.
    pub virtual_hosting: bool,
}

impl Default for S3HttpConfig {
    fn default() -> Self {
        Self {
            domain: "s3.localhost".to_owned(),
            virtual_hosting: true,
        }
    }
}

/// The S3 HTTP service.
#[derive(Debug)]
pub struct S3HttpService<H: S3Handler> {
    handler: Arc<H>,
    router: S3Router,
}

impl<H: S3Handler> S3HttpService<H> {
    /// Create a service from a shared handler and configuration.
    #[must_use]
    pub fn new(handler: Arc<H>, config: &S3HttpConfig) -> Self {
        Self {
            handler,
            router: S3Router::new(&config.domain, config.virtual_hosting),
        }
    }
}

impl<H: S3Handler> Clone for S3HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router.clone(),
        }
    }
}

impl<H: S3Handler> Service<http::Request<Incoming>> for S3HttpService<H> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let router = self.router.clone();

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let response = process_request(req, handler.as_ref(), &router, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process a request through routing and dispatch.
async fn process_request<H: S3Handler>(
    req: http::Request<Incoming>,
    handler: &H,
    router: &S3Router,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, request_id, "processing request");

    if method == http::Method::GET && (uri.path() == "/health" || uri.path() == "/favicon.ico") {
        return health_response(uri.path());
    }

    let ctx = match router.resolve(&req) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(%method, %uri, error = %err, request_id, "failed to route request");
            return error_to_response(&err, request_id);
        }
    };

    info!(
        operation = %ctx.operation,
        bucket = ?ctx.bucket,
        key = ?ctx.key,
        request_id,
        "routed request"
    );

    let (parts, incoming) = req.into_parts();
    let body = S3RequestBody::from_incoming(incoming);

    match dispatch_operation(handler, parts, body, ctx).await {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, request_id, "operation returned error");
            error_to_response(&err, request_id)
        }
    }
}

/// Serve the health probe (and an empty favicon, so browsers poking at the
/// endpoint do not produce NoSuchBucket noise in the logs).
fn health_response(path: &str) -> http::Response<S3ResponseBody> {
    if path == "/favicon.ico" {
        return http::Response::builder()
            .status(http::StatusCode::NO_CONTENT)
            .body(S3ResponseBody::empty())
            .unwrap_or_default();
    }
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(S3ResponseBody::from_bytes(
            r#"{"status":"running","service":"s3"}"#,
        ))
        .unwrap_or_default()
}

/// Add the headers every S3 response carries.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv);
    }
    headers.insert("Server", http::header::HeaderValue::from_static("mocks3"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_add_request_id_and_server_headers() {
        let resp = http::Response::builder()
            .status(http::StatusCode::OK)
            .body(S3ResponseBody::empty())
            .expect("valid response");
        let resp = add_common_headers(resp, "rid-1");
        assert_eq!(
            resp.headers()
                .get("x-amz-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("rid-1")
        );
        assert_eq!(
            resp.headers().get("Server").and_then(|v| v.to_str().ok()),
            Some("mocks3")
        );
    }

    #[test]
    fn test_should_answer_health_probe_with_json() {
        let resp = health_response("/health");
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[test]
    fn test_should_answer_favicon_with_no_content() {
        let resp = health_response("/favicon.ico");
        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
    }
}
