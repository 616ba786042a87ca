//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: RouteKind (control route, service worker, or Proxy)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (fixed order)

pub mod matcher;
pub mod router;

pub use router::{ControlRouter, RouteKind, INJECT_HELP_PATH, NAVIGATE_SHORT_PATH};
