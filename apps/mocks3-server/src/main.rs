//! mocks3-server: a local, filesystem-backed S3 emulator.
//!
//! Serves the S3 REST API on one HTTP and one HTTPS port, storing buckets,
//! versioned objects, and multipart uploads under a single root directory
//! that is removed on shutdown unless configured otherwise.
//!
//! ```text
//! MOCKS3_INITIAL_BUCKETS=test-bucket MOCKS3_HTTP_PORT=9090 mocks3-server
//! ```

mod config;
mod handler;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mocks3_core::S3Service;
use mocks3_core::kms::KmsKeyRegistry;
use mocks3_http::service::{S3HttpConfig, S3HttpService};

use crate::config::ServerConfig;
use crate::handler::MockS3Handler;

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

fn main() -> ExitCode {
    let config = ServerConfig::from_env();
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<()> {
    let root = config.resolve_root();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("cannot create root directory {}", root.display()))?;
    info!(
        root = %root.display(),
        retain_files_on_exit = config.retain_files_on_exit,
        "using filesystem root"
    );

    let service = Arc::new(S3Service::new(
        &root,
        &config.region,
        KmsKeyRegistry::new(config.valid_kms_keys.iter().cloned()),
    ));

    for bucket in &config.initial_buckets {
        match service.create_bucket(bucket, None, None, None, false).await {
            Ok(()) => info!(bucket, "created initial bucket"),
            Err(e) => warn!(bucket, error = %e, "failed to create initial bucket"),
        }
    }

    let http_config = S3HttpConfig {
        domain: config.domain.clone(),
        virtual_hosting: true,
    };
    let handler = Arc::new(MockS3Handler::new(Arc::clone(&service)));
    let http_service = S3HttpService::new(handler, &http_config);

    // The HTTPS listener degrades to plain HTTP when no certificate pair is
    // configured; certificate provisioning is an operator concern.
    let tls = match (&config.tls_cert, &config.tls_key) {
        (Some(cert), Some(key)) => Some(server::load_tls_acceptor(cert, key)?),
        (None, None) => {
            warn!(
                https_port = config.https_port,
                "no TLS certificate configured; HTTPS port serves plain HTTP"
            );
            None
        }
        _ => {
            anyhow::bail!("MOCKS3_TLS_CERT and MOCKS3_TLS_KEY must be set together");
        }
    };

    let http_listener = server::bind(config.http_port).await?;
    let https_listener = server::bind(config.https_port).await?;
    info!(
        http_port = config.http_port,
        https_port = config.https_port,
        region = %config.region,
        "mocks3 listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let http_task = tokio::spawn(server::serve(
        http_listener,
        http_service.clone(),
        None,
        shutdown_rx.clone(),
    ));
    let https_task = tokio::spawn(server::serve(
        https_listener,
        http_service,
        tls,
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");
    shutdown_tx.send(true).ok();

    for task in [http_task, https_task] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "listener exited with error"),
            Err(e) => warn!(error = %e, "listener task panicked"),
        }
    }

    if config.retain_files_on_exit {
        info!(root = %root.display(), "retaining files on exit");
    } else {
        match std::fs::remove_dir_all(&root) {
            Ok(()) => info!(root = %root.display(), "removed filesystem root"),
            Err(e) => warn!(root = %root.display(), error = %e, "failed to remove root"),
        }
    }

    info!("shutdown complete");
    Ok(())
}
