//! Reserved-path dispatch.
//!
//! # Responsibilities
//! - Claim control routes before any origin resolution happens
//! - Classify everything else as service-worker or general proxy traffic
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, in a fixed order: preflight, drop, help pages, worker
//! - Explicit `Proxy` fallthrough rather than a silent default

use axum::body::Body;
use axum::http::{Method, Request};

use crate::config::ProxySettings;
use crate::proxy::DROP_PATH;
use crate::routing::matcher::{Matcher, MethodMatcher, PathContainsMatcher, PathExactMatcher};
use crate::scripts::NAVIGATE_PATH;

/// Path of the injection help page.
pub const INJECT_HELP_PATH: &str = "/.inject";

/// Short alias of the navigation help page.
pub const NAVIGATE_SHORT_PATH: &str = "/.nav";

/// What a request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// CORS preflight; answered locally.
    Preflight,
    /// Blocked resource; answered locally with an empty success.
    Drop,
    /// Navigation help page.
    Navigate,
    /// Injection help page.
    InjectHelp,
    /// Generated service worker; needs a resolved origin.
    ServiceWorker,
    /// Everything else; full proxy pipeline.
    Proxy,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Preflight => "preflight",
            RouteKind::Drop => "drop",
            RouteKind::Navigate => "navigate",
            RouteKind::InjectHelp => "inject_help",
            RouteKind::ServiceWorker => "service_worker",
            RouteKind::Proxy => "proxy",
        }
    }
}

/// Ordered table of reserved routes.
#[derive(Debug)]
pub struct ControlRouter {
    routes: Vec<(Box<dyn Matcher>, RouteKind)>,
}

impl ControlRouter {
    pub fn new(settings: &ProxySettings) -> Self {
        let routes: Vec<(Box<dyn Matcher>, RouteKind)> = vec![
            (Box::new(MethodMatcher::new(Method::OPTIONS)), RouteKind::Preflight),
            (Box::new(PathContainsMatcher::new(DROP_PATH)), RouteKind::Drop),
            (
                Box::new(PathExactMatcher::new([NAVIGATE_PATH, NAVIGATE_SHORT_PATH])),
                RouteKind::Navigate,
            ),
            (Box::new(PathExactMatcher::new([INJECT_HELP_PATH])), RouteKind::InjectHelp),
            (
                Box::new(PathExactMatcher::new([settings.service_worker_path.as_str()])),
                RouteKind::ServiceWorker,
            ),
        ];
        Self { routes }
    }

    pub fn match_request(&self, req: &Request<Body>) -> RouteKind {
        self.routes
            .iter()
            .find(|(matcher, _)| matcher.matches(req))
            .map(|(_, kind)| *kind)
            .unwrap_or(RouteKind::Proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, uri: &str) -> RouteKind {
        let router = ControlRouter::new(&ProxySettings::default());
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap();
        router.match_request(&req)
    }

    #[test]
    fn test_reserved_paths() {
        assert_eq!(route(Method::GET, "/.navigate"), RouteKind::Navigate);
        assert_eq!(route(Method::GET, "/.nav"), RouteKind::Navigate);
        assert_eq!(route(Method::GET, "/.inject"), RouteKind::InjectHelp);
        assert_eq!(route(Method::GET, "/a/b/.drop"), RouteKind::Drop);
        assert_eq!(route(Method::GET, "/.sw.httpsw?ophost=x"), RouteKind::ServiceWorker);
        assert_eq!(route(Method::GET, "/index.html"), RouteKind::Proxy);
    }

    #[test]
    fn test_preflight_wins_over_paths() {
        assert_eq!(route(Method::OPTIONS, "/.sw.httpsw"), RouteKind::Preflight);
        assert_eq!(route(Method::OPTIONS, "/api"), RouteKind::Preflight);
    }

    #[test]
    fn test_drop_is_any_method() {
        assert_eq!(route(Method::POST, "/.drop"), RouteKind::Drop);
    }

    #[test]
    fn test_custom_service_worker_path() {
        let settings = ProxySettings {
            service_worker_path: "/sw.js".into(),
            ..ProxySettings::default()
        };
        let router = ControlRouter::new(&settings);
        let req = Request::builder().uri("/sw.js").body(Body::default()).unwrap();
        assert_eq!(router.match_request(&req), RouteKind::ServiceWorker);
    }
}
