//! Generated browser-side code and diagnostic pages.
//!
//! # Data Flow
//! ```text
//! typed inputs (proxy domain, target origin, paths)
//!     → service_worker.rs  (interception script served on the SW route)
//!     → bootstrap.rs       (snippets injected into proxied HTML documents)
//!     → pages.rs           (navigation / injection help / missing-origin pages)
//! ```
//!
//! # Design Decisions
//! - Every live value enters a script through `js_string`, never raw interpolation
//! - Every live value enters HTML through `html_escape`
//! - Templates are plain functions of their inputs; nothing is cached

pub mod bootstrap;
pub mod pages;
pub mod service_worker;

pub use service_worker::{render_service_worker, ServiceWorkerParams};

/// Navigation-help path advertised to clients in `X-Renav`.
pub const NAVIGATE_PATH: &str = "/.navigate";

/// Encode `value` as a JavaScript string literal safe inside a `<script>` element.
pub fn js_string(value: &str) -> String {
    let literal = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    literal
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
