//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (preflight detection)
//! - Match exact paths (help pages, service worker)
//! - Match path fragments anywhere in the path (drop sentinel)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        *req.method() == self.method
    }
}

/// Matches any of a set of exact paths.
#[derive(Debug, Clone)]
pub struct PathExactMatcher {
    paths: Vec<String>,
}

impl PathExactMatcher {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for PathExactMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let path = req.uri().path();
        self.paths.iter().any(|p| p == path)
    }
}

/// Matches when the path contains a fragment anywhere.
#[derive(Debug, Clone)]
pub struct PathContainsMatcher {
    fragment: String,
}

impl PathContainsMatcher {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

impl Matcher for PathContainsMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().contains(&self.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::OPTIONS);
        assert!(matcher.matches(&request(Method::OPTIONS, "/anything")));
        assert!(!matcher.matches(&request(Method::GET, "/anything")));
    }

    #[test]
    fn test_exact_matcher() {
        let matcher = PathExactMatcher::new(["/.navigate", "/.nav"]);
        assert!(matcher.matches(&request(Method::GET, "http://proxy.test/.nav?ophost=x")));
        assert!(matcher.matches(&request(Method::GET, "/.navigate")));
        assert!(!matcher.matches(&request(Method::GET, "/.navigate/more")));
        assert!(!matcher.matches(&request(Method::GET, "/.NAV")));
    }

    #[test]
    fn test_contains_matcher() {
        let matcher = PathContainsMatcher::new("/.drop");
        assert!(matcher.matches(&request(Method::GET, "/.drop")));
        assert!(matcher.matches(&request(Method::GET, "/static/proxy.test/.drop?ophost=x")));
        assert!(!matcher.matches(&request(Method::GET, "/drop")));
        assert!(!matcher.matches(&request(Method::GET, "/x?q=/.drop")));
    }
}
