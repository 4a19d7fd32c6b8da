//! Response construction helpers.
//!
//! S3 responses fall into three shapes: header-only (most writes), XML body
//! (listings, configuration getters), and object-data body (GetObject).
//! These helpers build all three, plus the error envelope.

use http::header::HeaderValue;

use mocks3_model::error::{S3Error, S3ErrorCode};
use mocks3_xml::{S3Serialize, error_to_xml, to_xml};

use crate::body::S3ResponseBody;

/// Build an XML response with the given status.
///
/// # Errors
///
/// Returns `InternalError` if serialization or response construction fails.
pub fn xml_response<T: S3Serialize>(
    status: http::StatusCode,
    root_element: &str,
    value: &T,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = to_xml(root_element, value)
        .map_err(|e| S3Error::internal_error(format!("XML serialization failed: {e}")))?;
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(S3ResponseBody::from_xml(xml))
        .map_err(|e| S3Error::internal_error(format!("failed to build response: {e}")))
}

/// Build an empty response with the given status.
///
/// # Errors
///
/// Returns `InternalError` if response construction fails.
pub fn empty_response(status: http::StatusCode) -> Result<http::Response<S3ResponseBody>, S3Error> {
    http::Response::builder()
        .status(status)
        .body(S3ResponseBody::empty())
        .map_err(|e| S3Error::internal_error(format!("failed to build response: {e}")))
}

/// Set a header when the value is `Some`, skipping values that are not
/// legal header text.
#[must_use]
pub fn set_optional_header(
    builder: http::response::Builder,
    name: &str,
    value: Option<&str>,
) -> http::response::Builder {
    if let Some(v) = value {
        if let Ok(hv) = HeaderValue::from_str(v) {
            return builder.header(name, hv);
        }
    }
    builder
}

/// Render an [`S3Error`] as the XML error envelope with its status code.
///
/// `NotModified` is special: 304 responses carry no body.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    if err.code == S3ErrorCode::NotModified {
        return http::Response::builder()
            .status(http::StatusCode::NOT_MODIFIED)
            .body(S3ResponseBody::empty())
            .unwrap_or_default();
    }

    let body = error_to_xml(
        err.code.as_str(),
        &err.message,
        err.resource.as_deref(),
        err.request_id.as_deref().unwrap_or(request_id),
    );

    http::Response::builder()
        .status(err.status_code)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(S3ResponseBody::from_xml(body))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use mocks3_model::s3_error;
    use mocks3_model::types::Tagging;

    use super::*;

    #[test]
    fn test_should_build_xml_response_with_content_type() {
        let resp = xml_response(http::StatusCode::OK, "Tagging", &Tagging::default())
            .expect("build response");
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/xml")
        );
    }

    #[test]
    fn test_should_map_error_to_status_and_envelope() {
        let err = s3_error!(NoSuchKey).with_resource("/b/k");
        let resp = error_to_response(&err, "req-9");
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_send_304_without_body() {
        let resp = error_to_response(&s3_error!(NotModified), "req-9");
        assert_eq!(resp.status(), http::StatusCode::NOT_MODIFIED);
        assert!(matches!(resp.into_body(), S3ResponseBody::Empty));
    }

    #[test]
    fn test_should_skip_invalid_optional_header_values() {
        let builder = http::Response::builder();
        let builder = set_optional_header(builder, "x-test", Some("ok"));
        let builder = set_optional_header(builder, "x-bad", Some("line\nbreak"));
        let resp = builder.body(()).expect("build");
        assert!(resp.headers().contains_key("x-test"));
        assert!(!resp.headers().contains_key("x-bad"));
    }
}
