//! The boundary between the HTTP layer and the business logic.

use std::future::Future;
use std::pin::Pin;

use mocks3_model::S3Operation;
use mocks3_model::error::S3Error;

use crate::body::{S3RequestBody, S3ResponseBody};
use crate::router::RoutingContext;

/// Trait the business logic provider implements.
///
/// The handler receives the identified operation, the raw request head, the
/// (possibly still-streaming) body, and the routing context, and must return
/// a fully formed HTTP response. Uses boxed futures so the service layer can
/// hold the handler behind `Arc<H>` without generics leaking into hyper.
pub trait S3Handler: Send + Sync + 'static {
    /// Handle an S3 operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: S3RequestBody,
        ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>;
}

/// Dispatch a routed request to the handler.
pub async fn dispatch_operation<H: S3Handler>(
    handler: &H,
    parts: http::request::Parts,
    body: S3RequestBody,
    ctx: RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    tracing::debug!(
        operation = %ctx.operation,
        bucket = ?ctx.bucket,
        key = ?ctx.key,
        "dispatching S3 operation"
    );
    handler.handle_operation(ctx.operation, parts, body, ctx).await
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A handler that fails every operation with `NotImplemented`; used to
    /// exercise the service pipeline in isolation.
    #[derive(Debug, Clone, Default)]
    pub struct NotImplementedHandler;

    impl S3Handler for NotImplementedHandler {
        fn handle_operation(
            &self,
            op: S3Operation,
            _parts: http::request::Parts,
            _body: S3RequestBody,
            _ctx: RoutingContext,
        ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>
        {
            Box::pin(async move { Err(S3Error::not_implemented(op.as_str())) })
        }
    }
}

#[cfg(test)]
mod tests {
    use mocks3_model::error::S3ErrorCode;

    use super::testing::NotImplementedHandler;
    use super::*;

    #[tokio::test]
    async fn test_should_propagate_handler_errors() {
        let handler = NotImplementedHandler;
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri("/bucket")
            .body(())
            .expect("valid request")
            .into_parts();
        let ctx = RoutingContext {
            bucket: Some("bucket".to_owned()),
            key: None,
            operation: S3Operation::ListObjects,
            query_params: vec![],
        };

        let err = dispatch_operation(&handler, parts, S3RequestBody::empty(), ctx)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, S3ErrorCode::NotImplemented);
    }
}
