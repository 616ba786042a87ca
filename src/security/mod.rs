//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response:
//!     → headers.rs (strip hop-by-hop / stale framing headers)
//!     → headers.rs (attach CORS allow-all headers)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - CORS is deliberately permissive: the proxy is the page's own origin
//! - Operator-injected code is trusted and never sanitized

pub mod headers;

pub use headers::{attach_cors_headers, strip_body_framing, strip_hop_by_hop};
