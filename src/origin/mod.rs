//! Origin resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Request URI query ──→ query.rs ──┐
//! Referer URL query ──→ query.rs ──┼─→ resolver.rs ─→ ResolvedOrigin | MissingOrigin
//! Cookie header(s)  ──→ cookie.rs ─┘
//! ```
//!
//! # Design Decisions
//! - Pure functions of their inputs; no state survives the request
//! - Parsing never fails as a whole; bad pairs are dropped individually
//! - Cookies are parsed structurally, not by substring search

pub mod cookie;
pub mod query;
pub mod resolver;

pub use cookie::{cookie_ophost, OPHOST_COOKIE};
pub use query::{ParamValue, ProxyQuery, INJECT_PARAM, OPHOST_PARAM};
pub use resolver::{resolve_origin, OriginSource, ResolveError, ResolvedOrigin, TargetOrigin};
