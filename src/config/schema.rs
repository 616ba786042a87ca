//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the host-spoofing proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Proxy identity and upstream behaviour.
    pub proxy: ProxySettings,

    /// Session cookie attributes.
    pub session: SessionConfig,

    /// Substrings stripped from rewritten bodies.
    pub blocklist: BlocklistConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Proxy identity and upstream request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Hostname (optionally with port) the proxy itself is served from.
    pub domain: String,

    /// Scheme used for outbound requests to the target origin.
    ///
    /// `https://{target}/` links are always rehomed; with `http`, so are
    /// `http://{target}/` links.
    pub upstream_scheme: String,

    /// Fixed User-Agent presented to every target origin.
    pub user_agent: String,

    /// Path serving the generated service worker script.
    pub service_worker_path: String,

    /// Maximum inbound body size buffered before forwarding.
    pub max_body_bytes: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            domain: "localhost:8080".to_string(),
            upstream_scheme: "https".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            service_worker_path: "/.sw.httpsw".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Browser-like agent string used when talking to target origins.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:103.0) Gecko/20100101 Firefox/103.0";

/// Attributes of the `ophost` session cookie.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Mark the cookie `Secure`.
    pub secure: bool,

    /// Mark the cookie `HttpOnly`.
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
        }
    }
}

/// Blocklist sources. Inline entries come first, file entries after.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BlocklistConfig {
    /// Inline entries, in match order.
    pub entries: Vec<String>,

    /// Optional newline-separated file of additional entries.
    pub path: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
