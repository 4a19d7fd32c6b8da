//! Typed extraction helpers for HTTP request parts.

use std::collections::HashMap;
use std::str::FromStr;

use mocks3_model::error::S3Error;

/// Extract a header value as a string.
#[must_use]
pub fn header_str(parts: &http::request::Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Extract a header value and parse it into a `FromStr` type.
#[must_use]
pub fn header_parse<T: FromStr>(parts: &http::request::Parts, name: &str) -> Option<T> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Get a query parameter value by name.
#[must_use]
pub fn query_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Get a query parameter and parse it into a `FromStr` type, rejecting
/// unparseable values.
///
/// # Errors
///
/// Returns `InvalidArgument` when the parameter is present but malformed.
pub fn query_param_parse<T: FromStr>(
    params: &[(String, String)],
    name: &str,
) -> Result<Option<T>, S3Error> {
    match query_param(params, name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            mocks3_model::s3_error!(
                InvalidArgument,
                format!("Invalid value for {name}: {value}")
            )
        }),
    }
}

/// Collect all `x-amz-meta-*` headers into a metadata map.
///
/// Keys are the portion after the prefix. Header names arrive lowercased
/// from hyper, which also gives the case-insensitivity S3 requires.
#[must_use]
pub fn collect_metadata(parts: &http::request::Parts) -> HashMap<String, String> {
    const PREFIX: &str = "x-amz-meta-";
    parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let meta_key = name.as_str().strip_prefix(PREFIX)?;
            let meta_value = value.to_str().ok()?;
            Some((meta_key.to_owned(), meta_value.to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with_headers(headers: &[(&str, &str)]) -> http::request::Parts {
        let mut builder = http::Request::builder().method(http::Method::PUT).uri("/b/k");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_should_collect_amz_meta_headers() {
        let parts = parts_with_headers(&[
            ("x-amz-meta-owner", "alice"),
            ("x-amz-meta-purpose", "test"),
            ("content-type", "text/plain"),
        ]);
        let meta = collect_metadata(&parts);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("owner").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_should_parse_typed_query_params() {
        let params = vec![
            ("max-keys".to_owned(), "25".to_owned()),
            ("bad".to_owned(), "x".to_owned()),
        ];
        assert_eq!(
            query_param_parse::<i32>(&params, "max-keys").expect("parse"),
            Some(25)
        );
        assert_eq!(query_param_parse::<i32>(&params, "absent").expect("parse"), None);
        assert!(query_param_parse::<i32>(&params, "bad").is_err());
    }

    #[test]
    fn test_should_read_headers_as_strings() {
        let parts = parts_with_headers(&[("content-md5", "abc123==")]);
        assert_eq!(header_str(&parts, "content-md5").as_deref(), Some("abc123=="));
        assert_eq!(header_str(&parts, "missing"), None);
        assert_eq!(header_parse::<u32>(&parts, "missing"), None);
    }
}
