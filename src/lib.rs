//! Host-spoofing transparent reverse proxy.
//!
//! Serves any target site under the proxy's own domain. The target is named
//! by the `ophost` query parameter (or recovered from the Referer or the
//! session cookie), fetched server-side, and text responses are rewritten so
//! that every absolute reference to the target points back at the proxy.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Proxy pipeline
pub mod origin;
pub mod proxy;
pub mod scripts;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
