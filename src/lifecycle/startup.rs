//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble the blocklist from inline entries and the optional file
//! - Start the metrics exporter, bind the listener, serve until shutdown
//! - Surface every startup failure as one error type
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)
//! - The blocklist is read once; changes need a restart

use std::net::{AddrParseError, SocketAddr};
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{load_blocklist_file, BlocklistConfig, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::net::load_tls_config;
use crate::observability::metrics::init_metrics;
use crate::proxy::Blocklist;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid blocklist: {0}")]
    Blocklist(#[from] regex::Error),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid {field} {value:?}: {source}")]
    Address {
        field: &'static str,
        value: String,
        source: AddrParseError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Merge inline entries with the entries of `config.path`, if set.
pub fn build_blocklist(config: &BlocklistConfig) -> Result<Blocklist, StartupError> {
    let mut entries = config.entries.clone();
    if let Some(path) = &config.path {
        let from_file = load_blocklist_file(Path::new(path))?;
        tracing::debug!(path = %path, entries = from_file.len(), "Read blocklist file");
        entries.extend(from_file);
    }
    Ok(Blocklist::new(entries)?)
}

/// Start metrics, bind the configured listener and serve until `shutdown` fires.
pub async fn serve(
    config: ProxyConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = parse_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
        )?;
        init_metrics(addr)?;
    }

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr = parse_addr("listener.bind_address", &bind_address)?;
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, shutdown).await?;
        }
    }
    Ok(())
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|source| StartupError::Address {
        field,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_entries() {
        let config = BlocklistConfig {
            entries: vec!["ads.example".to_string(), "tracker.example".to_string()],
            path: None,
        };
        let blocklist = build_blocklist(&config).unwrap();
        assert_eq!(blocklist.len(), 2);
        assert!(blocklist.matches("https://ads.example/x.js"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let config = BlocklistConfig {
            entries: Vec::new(),
            path: Some("/nonexistent/blocklist.txt".to_string()),
        };
        assert!(matches!(
            build_blocklist(&config),
            Err(StartupError::Config(ConfigError::Io(_)))
        ));
    }

    #[test]
    fn test_file_entries_merged() {
        let path = std::env::temp_dir().join(format!("blocklist-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "# comment\nfile.example\n\n").unwrap();
        let config = BlocklistConfig {
            entries: vec!["inline.example".to_string()],
            path: Some(path.to_string_lossy().into_owned()),
        };
        let blocklist = build_blocklist(&config).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(blocklist.len(), 2);
        assert!(blocklist.matches("file.example"));
    }

    #[tokio::test]
    async fn test_serve_fails_on_missing_certificate() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.listener.tls = Some(crate::config::TlsConfig {
            cert_path: "/nonexistent/cert.pem".to_string(),
            key_path: "/nonexistent/key.pem".to_string(),
        });
        let shutdown = crate::lifecycle::Shutdown::new();

        let err = serve(config, shutdown.subscribe()).await.unwrap_err();
        assert!(matches!(err, StartupError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_bind_address_for_tls() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.listener.tls = Some(crate::config::TlsConfig {
            cert_path: "/nonexistent/cert.pem".to_string(),
            key_path: "/nonexistent/key.pem".to_string(),
        });
        let shutdown = crate::lifecycle::Shutdown::new();

        let err = serve(config, shutdown.subscribe()).await.unwrap_err();
        assert!(matches!(err, StartupError::Address { field: "listener.bind_address", .. }));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        let shutdown = crate::lifecycle::Shutdown::new();
        let rx = shutdown.subscribe();

        let server = tokio::spawn(serve(config, rx));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        shutdown.trigger();
        assert!(server.await.unwrap().is_ok());
    }
}
