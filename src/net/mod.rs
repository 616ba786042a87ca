//! Network layer.
//!
//! Plain TCP listeners come straight from Tokio; this module only prepares
//! the rustls configuration for HTTPS listeners.

pub mod tls;

pub use tls::load_tls_config;
