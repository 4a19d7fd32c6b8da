//! Conditional request evaluation.
//!
//! Evaluation order follows S3 (and RFC 9110 §13.2.2): ETag conditions
//! first (`If-Match`, `If-None-Match`), then date conditions
//! (`If-Unmodified-Since`, `If-Modified-Since`). Timestamps compare at
//! second precision, rounded down, because HTTP dates carry no fraction.
//!
//! On GET/HEAD a satisfied `If-None-Match` / `If-Modified-Since` yields
//! [`S3ServiceError::NotModified`] (304); everything else yields
//! [`S3ServiceError::PreconditionFailed`] (412).

use chrono::{DateTime, Utc};

use crate::error::S3ServiceError;

/// The conditional headers of a request, already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preconditions {
    /// `If-Match` ETag, unquoted (`*` matches any existing object).
    pub if_match: Option<String>,
    /// `If-None-Match` ETag, unquoted (`*` matches any existing object).
    pub if_none_match: Option<String>,
    /// `If-Unmodified-Since` instant.
    pub if_unmodified_since: Option<DateTime<Utc>>,
    /// `If-Modified-Since` instant.
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl Preconditions {
    /// Whether no conditional header was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.if_match.is_none()
            && self.if_none_match.is_none()
            && self.if_unmodified_since.is_none()
            && self.if_modified_since.is_none()
    }

    /// Evaluate against an object's ETag and last-modified instant.
    ///
    /// `is_read` selects GET/HEAD semantics (304 where applicable) versus
    /// write/copy semantics (always 412 on failure).
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::PreconditionFailed`] or
    /// [`S3ServiceError::NotModified`] as described above.
    pub fn evaluate(
        &self,
        etag: &str,
        last_modified: DateTime<Utc>,
        is_read: bool,
    ) -> Result<(), S3ServiceError> {
        let etag = etag.trim_matches('"');
        let modified_secs = last_modified.timestamp();

        // 1. ETag preconditions.
        if let Some(expected) = &self.if_match {
            if expected != "*" && expected != etag {
                return Err(S3ServiceError::PreconditionFailed);
            }
        }
        if let Some(unexpected) = &self.if_none_match {
            if unexpected == "*" || unexpected == etag {
                return Err(if is_read {
                    S3ServiceError::NotModified
                } else {
                    S3ServiceError::PreconditionFailed
                });
            }
        }

        // 2. Date preconditions, second precision.
        if let Some(threshold) = self.if_unmodified_since {
            if modified_secs > threshold.timestamp() {
                return Err(S3ServiceError::PreconditionFailed);
            }
        }
        if let Some(threshold) = self.if_modified_since {
            // If-Match takes precedence over If-Modified-Since when both
            // are present and If-Match succeeded.
            if self.if_match.is_none() && modified_secs <= threshold.timestamp() {
                return Err(if is_read {
                    S3ServiceError::NotModified
                } else {
                    S3ServiceError::PreconditionFailed
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const ETAG: &str = "\"49f68a5c8493ec2c0bf489821c21fc3b\"";

    fn modified() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_should_pass_with_no_conditions() {
        let pre = Preconditions::default();
        assert!(pre.is_empty());
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());
    }

    #[test]
    fn test_should_enforce_if_match() {
        let pre = Preconditions {
            if_match: Some("49f68a5c8493ec2c0bf489821c21fc3b".to_owned()),
            ..Default::default()
        };
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());

        let pre = Preconditions {
            if_match: Some("different".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            pre.evaluate(ETAG, modified(), true),
            Err(S3ServiceError::PreconditionFailed)
        ));
    }

    #[test]
    fn test_should_match_wildcard_if_match() {
        let pre = Preconditions {
            if_match: Some("*".to_owned()),
            ..Default::default()
        };
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());
    }

    #[test]
    fn test_should_return_not_modified_for_if_none_match_on_get() {
        let pre = Preconditions {
            if_none_match: Some("49f68a5c8493ec2c0bf489821c21fc3b".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            pre.evaluate(ETAG, modified(), true),
            Err(S3ServiceError::NotModified)
        ));
        // Same condition on a write yields 412.
        assert!(matches!(
            pre.evaluate(ETAG, modified(), false),
            Err(S3ServiceError::PreconditionFailed)
        ));
    }

    #[test]
    fn test_should_compare_dates_at_second_precision() {
        // Threshold equal to last-modified (rounded down) is "not modified
        // since".
        let pre = Preconditions {
            if_unmodified_since: Some(modified()),
            ..Default::default()
        };
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());

        let pre = Preconditions {
            if_unmodified_since: Some(modified() - chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(matches!(
            pre.evaluate(ETAG, modified(), true),
            Err(S3ServiceError::PreconditionFailed)
        ));
    }

    #[test]
    fn test_should_return_not_modified_for_unchanged_since_threshold() {
        let pre = Preconditions {
            if_modified_since: Some(modified()),
            ..Default::default()
        };
        assert!(matches!(
            pre.evaluate(ETAG, modified(), true),
            Err(S3ServiceError::NotModified)
        ));

        let pre = Preconditions {
            if_modified_since: Some(modified() - chrono::Duration::seconds(5)),
            ..Default::default()
        };
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());
    }

    #[test]
    fn test_should_let_if_match_override_if_modified_since() {
        let pre = Preconditions {
            if_match: Some("49f68a5c8493ec2c0bf489821c21fc3b".to_owned()),
            if_modified_since: Some(modified()),
            ..Default::default()
        };
        assert!(pre.evaluate(ETAG, modified(), true).is_ok());
    }
}
