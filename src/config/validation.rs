//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate proxy identity (bare host, no scheme or path)
//! - Validate addresses and limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proxy.domain must not be empty")]
    EmptyDomain,

    #[error("proxy.domain must be a bare host, got {0:?}")]
    DomainNotBareHost(String),

    #[error("proxy.upstream_scheme must be http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("proxy.service_worker_path must start with '/', got {0:?}")]
    RelativeServiceWorkerPath(String),

    #[error("proxy.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("{field} is not a valid socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("blocklist.entries[{0}] is empty")]
    EmptyBlockEntry(usize),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let proxy = &config.proxy;

    if proxy.domain.trim().is_empty() {
        errors.push(ValidationError::EmptyDomain);
    } else if proxy.domain.contains("://") || proxy.domain.contains('/') {
        errors.push(ValidationError::DomainNotBareHost(proxy.domain.clone()));
    }

    if !matches!(proxy.upstream_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::UnsupportedScheme(proxy.upstream_scheme.clone()));
    }

    if !proxy.service_worker_path.starts_with('/') {
        errors.push(ValidationError::RelativeServiceWorkerPath(
            proxy.service_worker_path.clone(),
        ));
    }

    if proxy.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    for (i, entry) in config.blocklist.entries.iter().enumerate() {
        if entry.is_empty() {
            errors.push(ValidationError::EmptyBlockEntry(i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
