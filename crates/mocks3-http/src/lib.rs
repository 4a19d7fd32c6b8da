//! The HTTP layer of mocks3.
//!
//! Responsibilities, in request order:
//!
//! - **Routing** ([`router`]): map method + path + query keys (and the
//!   `x-amz-copy-source` header) to an [`mocks3_model::S3Operation`],
//!   resolving the bucket from either the path or a virtual-hosted `Host`
//!   header. Object keys are deliberately permissive: S3 keys are not URIs.
//! - **Header converters** ([`headers`]): Range, `x-amz-tagging`, canned
//!   ACL, object ownership, copy-source, metadata/tagging directives, and
//!   the conditional request headers.
//! - **Request helpers** ([`request`]): typed header/query extraction and
//!   `x-amz-meta-*` collection.
//! - **Dispatch** ([`dispatch`]): the [`S3Handler`](dispatch::S3Handler)
//!   trait, the boundary behind which the business logic lives.
//! - **Response building** ([`response`]): XML/empty response helpers and
//!   the error envelope.
//! - **Bodies** ([`body`]): request bodies that can be streamed to disk
//!   without buffering, and response bodies that can stream from disk.
//! - **Service** ([`service`]): the hyper `Service` tying it all together.

pub mod body;
pub mod dispatch;
pub mod headers;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use body::{S3RequestBody, S3ResponseBody};
pub use dispatch::S3Handler;
pub use router::{RoutingContext, S3Router};
pub use service::{S3HttpConfig, S3HttpService};
