//! Server configuration from environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MOCKS3_ROOT` | *(derived)* | Filesystem root for all state |
//! | `MOCKS3_RETAIN_FILES_ON_EXIT` | `false` | Keep the root on shutdown |
//! | `MOCKS3_INITIAL_BUCKETS` | *(empty)* | Comma-separated bucket names created at startup |
//! | `MOCKS3_VALID_KMS_KEYS` | *(empty)* | Comma-separated symbolic KMS key ids |
//! | `MOCKS3_REGION` | `us-east-1` | Region advertised in LocationConstraint |
//! | `MOCKS3_HTTP_PORT` | `9090` | Plain HTTP listener port |
//! | `MOCKS3_HTTPS_PORT` | `9191` | TLS listener port |
//! | `MOCKS3_TLS_CERT` / `MOCKS3_TLS_KEY` | *(unset)* | PEM certificate chain and private key |
//! | `MOCKS3_DOMAIN` | `s3.localhost` | Virtual-hosting base domain |
//! | `LOG_LEVEL` | `info` | Log filter (overridden by `RUST_LOG`) |

use std::path::PathBuf;

/// Runtime configuration for the emulator process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Filesystem root; `None` derives a fresh directory under the OS temp
    /// dir.
    pub root: Option<PathBuf>,
    /// Skip root-directory cleanup on shutdown.
    pub retain_files_on_exit: bool,
    /// Buckets created empty at startup.
    pub initial_buckets: Vec<String>,
    /// Allow-listed symbolic KMS key ids.
    pub valid_kms_keys: Vec<String>,
    /// Region label.
    pub region: String,
    /// Plain HTTP port.
    pub http_port: u16,
    /// HTTPS port.
    pub https_port: u16,
    /// PEM certificate chain for the HTTPS listener.
    pub tls_cert: Option<PathBuf>,
    /// PEM private key for the HTTPS listener.
    pub tls_key: Option<PathBuf>,
    /// Virtual-hosting base domain.
    pub domain: String,
    /// Log level filter.
    pub log_level: String,
}

impl ServerConfig {
    /// Read configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            root: env_opt("MOCKS3_ROOT").map(PathBuf::from),
            retain_files_on_exit: env_bool("MOCKS3_RETAIN_FILES_ON_EXIT"),
            initial_buckets: env_list("MOCKS3_INITIAL_BUCKETS"),
            valid_kms_keys: env_list("MOCKS3_VALID_KMS_KEYS"),
            region: env_opt("MOCKS3_REGION").unwrap_or_else(|| "us-east-1".to_owned()),
            http_port: env_port("MOCKS3_HTTP_PORT", 9090),
            https_port: env_port("MOCKS3_HTTPS_PORT", 9191),
            tls_cert: env_opt("MOCKS3_TLS_CERT").map(PathBuf::from),
            tls_key: env_opt("MOCKS3_TLS_KEY").map(PathBuf::from),
            domain: env_opt("MOCKS3_DOMAIN").unwrap_or_else(|| "s3.localhost".to_owned()),
            log_level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
        }
    }

    /// The effective root directory. An unset root derives a per-run
    /// directory compatible with the tool this emulator mimics.
    #[must_use]
    pub fn resolve_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => std::env::temp_dir().join(format!(
                "s3mockFileStore{}",
                chrono::Utc::now().timestamp_millis()
            )),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_bool(name: &str) -> bool {
    env_opt(name).is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_list(name: &str) -> Vec<String> {
    env_opt(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn env_port(name: &str, default: u16) -> u16 {
    env_opt(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_derive_root_under_temp_dir_when_unset() {
        let config = ServerConfig {
            root: None,
            retain_files_on_exit: false,
            initial_buckets: vec![],
            valid_kms_keys: vec![],
            region: "us-east-1".to_owned(),
            http_port: 9090,
            https_port: 9191,
            tls_cert: None,
            tls_key: None,
            domain: "s3.localhost".to_owned(),
            log_level: "info".to_owned(),
        };
        let root = config.resolve_root();
        assert!(root.starts_with(std::env::temp_dir()));
        assert!(
            root.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("s3mockFileStore"))
        );
    }

    #[test]
    fn test_should_keep_explicit_root() {
        let config = ServerConfig {
            root: Some(PathBuf::from("/var/data/s3")),
            retain_files_on_exit: true,
            initial_buckets: vec![],
            valid_kms_keys: vec![],
            region: "us-east-1".to_owned(),
            http_port: 9090,
            https_port: 9191,
            tls_cert: None,
            tls_key: None,
            domain: "s3.localhost".to_owned(),
            log_level: "info".to_owned(),
        };
        assert_eq!(config.resolve_root(), PathBuf::from("/var/data/s3"));
    }
}
