//! Target origin resolution.
//!
//! # Priority
//! 1. `ophost` on the request's own query string
//! 2. `ophost` on the `Referer` URL's query string
//! 3. `ophost` cookie
//!
//! The first non-empty source wins; lower sources are never consulted.

use std::fmt;

use thiserror::Error;

use crate::origin::query::ProxyQuery;

/// Hostname of the site being proxied for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetOrigin(String);

impl TargetOrigin {
    /// Wrap a host. Surrounding whitespace is dropped; empty hosts are rejected.
    pub fn new(host: impl AsRef<str>) -> Option<Self> {
        let host = host.as_ref().trim();
        if host.is_empty() {
            None
        } else {
            Some(Self(host.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the target origin was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSource {
    Query,
    Referer,
    Cookie,
}

impl OriginSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginSource::Query => "query",
            OriginSource::Referer => "referer",
            OriginSource::Cookie => "cookie",
        }
    }
}

/// A resolved target together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrigin {
    pub target: TargetOrigin,
    pub source: OriginSource,
}

/// Resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no ophost found in query, referer or cookie")]
    MissingOrigin,
}

/// Pick the target origin from the three identity channels.
pub fn resolve_origin(
    query: &ProxyQuery,
    referer: &ProxyQuery,
    cookie: Option<&str>,
) -> Result<ResolvedOrigin, ResolveError> {
    let candidates = [
        (query.ophost(), OriginSource::Query),
        (referer.ophost(), OriginSource::Referer),
        (cookie, OriginSource::Cookie),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| {
            value
                .and_then(TargetOrigin::new)
                .map(|target| ResolvedOrigin { target, source })
        })
        .ok_or(ResolveError::MissingOrigin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(raw: &str) -> ProxyQuery {
        ProxyQuery::parse(raw)
    }

    #[test]
    fn test_query_beats_referer_and_cookie() {
        let resolved = resolve_origin(
            &q("ophost=example.com"),
            &q("ophost=referer.test"),
            Some("cookie.test"),
        )
        .unwrap();
        assert_eq!(resolved.target.as_str(), "example.com");
        assert_eq!(resolved.source, OriginSource::Query);
    }

    #[test]
    fn test_referer_beats_cookie() {
        let resolved =
            resolve_origin(&q("page=2"), &q("ophost=referer.test"), Some("cookie.test")).unwrap();
        assert_eq!(resolved.target.as_str(), "referer.test");
        assert_eq!(resolved.source, OriginSource::Referer);
    }

    #[test]
    fn test_cookie_fallback() {
        let resolved = resolve_origin(&q(""), &q(""), Some("cookie.test")).unwrap();
        assert_eq!(resolved.target.as_str(), "cookie.test");
        assert_eq!(resolved.source, OriginSource::Cookie);
    }

    #[test]
    fn test_empty_values_fall_through() {
        let resolved = resolve_origin(&q("ophost="), &q("ophost"), Some("cookie.test")).unwrap();
        assert_eq!(resolved.source, OriginSource::Cookie);
    }

    #[test]
    fn test_missing_everywhere() {
        assert_eq!(
            resolve_origin(&q(""), &q(""), None),
            Err(ResolveError::MissingOrigin)
        );
        assert_eq!(
            resolve_origin(&q("ophost=%20"), &q(""), Some("  ")),
            Err(ResolveError::MissingOrigin)
        );
    }
}
