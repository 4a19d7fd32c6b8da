//! Listener setup: accept loops, optional TLS, graceful shutdown.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use rustls::ServerConfig as RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use mocks3_http::service::S3HttpService;

use crate::handler::MockS3Handler;

/// Load a TLS acceptor from PEM certificate and key files.
///
/// # Errors
///
/// Fails when either file is unreadable or does not parse as PEM.
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor> {
    // Idempotent; a second call just reports the provider already installed.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cert_pem = std::fs::read(cert_path)
        .with_context(|| format!("cannot read TLS certificate {}", cert_path.display()))?;
    let certs: Vec<CertificateDer<'static>> =
        rustls_pemfile::certs(&mut cert_pem.as_slice()).collect::<Result<_, _>>()?;

    let key_pem = std::fs::read(key_path)
        .with_context(|| format!("cannot read TLS key {}", key_path.display()))?;
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut key_pem.as_slice())?
        .context("no private key found in TLS key file")?;

    let config = RustlsConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("invalid TLS certificate/key pair")?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Run one accept loop until `shutdown` resolves, then drain in-flight
/// connections.
///
/// # Errors
///
/// Only startup failures return an error; per-connection failures are
/// logged and tolerated.
pub async fn serve(
    listener: TcpListener,
    service: S3HttpService<MockS3Handler>,
    tls: Option<TlsAcceptor>,
    shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());
    let mut shutdown = shutdown;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                match &tls {
                    None => {
                        let conn = http.serve_connection(TokioIo::new(stream), svc);
                        let conn = graceful.watch(conn.into_owned());
                        tokio::spawn(async move {
                            if let Err(e) = conn.await {
                                error!(%peer_addr, error = %e, "connection error");
                            }
                        });
                    }
                    Some(acceptor) => {
                        let acceptor = acceptor.clone();
                        let watcher = graceful.watcher();
                        tokio::spawn(async move {
                            let tls_stream = match acceptor.accept(stream).await {
                                Ok(tls_stream) => tls_stream,
                                Err(e) => {
                                    warn!(%peer_addr, error = %e, "TLS handshake failed");
                                    return;
                                }
                            };
                            let http = HttpConnBuilder::new(TokioExecutor::new());
                            let conn = http.serve_connection(TokioIo::new(tls_stream), svc);
                            let conn = watcher.watch(conn.into_owned());
                            if let Err(e) = conn.await {
                                error!(%peer_addr, error = %e, "connection error");
                            }
                        });
                    }
                }
            }

            _ = shutdown.changed() => {
                info!("listener shutting down, draining connections");
                break;
            }
        }
    }

    graceful.shutdown().await;
    Ok(())
}

/// Bind a listener on all interfaces.
///
/// # Errors
///
/// Fails when the port cannot be bound.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))
}
