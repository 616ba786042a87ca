//! ophost-proxy
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────┐    ┌──────────────┐    ┌────────────┐
//!     ───────────────────▶│   http   │───▶│   routing    │───▶│   origin   │
//!                         │  server  │    │ control/proxy│    │  resolver  │
//!                         └──────────┘    └──────────────┘    └─────┬──────┘
//!                                                                   │
//!                                                                   ▼
//!     Client Response     ┌──────────┐    ┌──────────────┐    ┌────────────┐
//!     ◀───────────────────│ rewriter │◀───│   upstream   │◀───│ forwarder  │
//!                         │ + scripts│    │    target    │    │  (reqwest) │
//!                         └──────────┘    └──────────────┘    └────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use ophost_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use ophost_proxy::lifecycle::{serve, shutdown_signal, Shutdown};
use ophost_proxy::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "ophost-proxy", version, about = "Host-spoofing transparent reverse proxy")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the public proxy domain.
    #[arg(long)]
    domain: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(domain) = cli.domain {
        config.proxy.domain = domain;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ophost-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        proxy_domain = %config.proxy.domain,
        upstream_scheme = %config.proxy.upstream_scheme,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    serve(config, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
