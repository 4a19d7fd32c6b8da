//! The KMS key registry: an allow-list of symbolic key ids.
//!
//! No cryptography happens anywhere in mocks3; the registry exists so that
//! writes naming an unknown SSE-KMS key fail the way real clients expect
//! (HTTP 400, `KMS.NotFoundException`).

use std::collections::HashSet;

use crate::error::S3ServiceError;

/// Constant-after-construction set of valid KMS key ids.
#[derive(Debug, Default)]
pub struct KmsKeyRegistry {
    keys: HashSet<String>,
}

impl KmsKeyRegistry {
    /// Build the registry from the configured key ids.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Whether `key_id` is allow-listed.
    #[must_use]
    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.contains(key_id)
    }

    /// Validate an optional SSE-KMS key id on a write request.
    ///
    /// # Errors
    ///
    /// Returns [`S3ServiceError::KmsKeyNotFound`] for unknown ids.
    pub fn validate(&self, key_id: Option<&str>) -> Result<(), S3ServiceError> {
        match key_id {
            None => Ok(()),
            Some(id) if self.contains(id) => Ok(()),
            Some(id) => Err(S3ServiceError::KmsKeyNotFound {
                key_id: id.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_registered_keys_and_absent_key() {
        let registry = KmsKeyRegistry::new(["key-a".to_owned(), "key-b".to_owned()]);
        assert!(registry.validate(None).is_ok());
        assert!(registry.validate(Some("key-a")).is_ok());
    }

    #[test]
    fn test_should_reject_unknown_keys() {
        let registry = KmsKeyRegistry::new(["key-a".to_owned()]);
        let err = registry.validate(Some("who-dis")).expect_err("should fail");
        assert!(matches!(err, S3ServiceError::KmsKeyNotFound { key_id } if key_id == "who-dis"));
    }

    #[test]
    fn test_should_start_empty_by_default() {
        let registry = KmsKeyRegistry::default();
        assert!(!registry.contains("anything"));
    }
}
