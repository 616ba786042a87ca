//! Per-request proxy context.

use axum::body::{Body, Bytes};
use axum::http::{header::REFERER, HeaderMap, Method, Request, Uri};

use crate::origin::{cookie_ophost, resolve_origin, ProxyQuery, ResolveError, ResolvedOrigin};
use crate::origin::query::decode_form_component;
use crate::proxy::ForwardError;

/// Header carrying operator-supplied code to inject. Beats both query sources.
pub const X_PROXY_INJECT: &str = "x-proxy-inject";

/// Everything the pipeline needs to know about one inbound request.
///
/// Built at request entry and dropped once the response is produced.
#[derive(Debug, Clone)]
pub struct ProxyRequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub params: ProxyQuery,
    pub referer_params: ProxyQuery,
    pub cookie_origin: Option<String>,
}

impl ProxyRequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let params = ProxyQuery::parse(uri.query().unwrap_or_default());
        let referer_params = headers
            .get(REFERER)
            .and_then(|v| v.to_str().ok())
            .map(ProxyQuery::from_url)
            .unwrap_or_default();
        let cookie_origin = cookie_ophost(&headers);

        Self {
            method,
            uri,
            headers,
            body,
            params,
            referer_params,
            cookie_origin,
        }
    }

    /// Buffer the inbound body (up to `limit` bytes) and parse identity sources.
    pub async fn from_request(request: Request<Body>, limit: usize) -> Result<Self, ForwardError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| ForwardError::Body(e.to_string()))?;
        Ok(Self::new(parts.method, parts.uri, parts.headers, body))
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Path plus query, exactly as received.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    pub fn resolve_origin(&self) -> Result<ResolvedOrigin, ResolveError> {
        resolve_origin(&self.params, &self.referer_params, self.cookie_origin.as_deref())
    }

    /// Code to inject into HTML documents, decoded.
    ///
    /// The `X-Proxy-Inject` header wins over the request query, which wins over
    /// the referer query. This is trusted operator input and is not sanitized.
    pub fn inject_code(&self) -> Option<String> {
        let from_header = self
            .headers
            .get(X_PROXY_INJECT)
            .and_then(|v| v.to_str().ok())
            .and_then(decode_form_component)
            .filter(|code| !code.is_empty());

        from_header
            .or_else(|| self.params.inject_code().map(str::to_string))
            .or_else(|| self.referer_params.inject_code().map(str::to_string))
    }
}
