//! Proxy pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → context.rs   (buffer body, parse query / referer / cookie)
//!     → [origin::resolve_origin]
//!     → forwarder.rs (single outbound call to the target)
//!     → rewriter.rs  (binary gate, text rules, blocklist, HTML bootstrap, headers)
//!     → Response<Body>
//! ```
//!
//! # Design Decisions
//! - Nothing here holds per-request state beyond the call; the blocklist is
//!   shared read-only behind an `Arc`
//! - One suspension point per request: the upstream call

pub mod blocklist;
pub mod context;
pub mod forwarder;
pub mod rewriter;

pub use blocklist::Blocklist;
pub use context::{ProxyRequestContext, X_PROXY_INJECT};
pub use forwarder::{ForwardError, RequestForwarder, UpstreamResponse};
pub use rewriter::{ResponseRewriter, RewriteRule, DROP_PATH, X_RENAV};
