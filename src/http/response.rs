//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Build locally generated responses (pages, worker script, sentinel, preflight)
//! - Map pipeline errors to status codes
//!
//! # Design Decisions
//! - Missing origin is a 400 with the diagnostic page, never a partial proxy
//! - Upstream transport failures are a 502; the proxy adds no fallback body

use axum::body::Body;
use axum::http::{
    header::{CACHE_CONTROL, CONTENT_TYPE},
    HeaderMap, HeaderValue, Response, StatusCode,
};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::origin::ResolveError;
use crate::proxy::ForwardError;
use crate::scripts::pages::missing_origin_page;
use crate::security::attach_cors_headers;

/// Any failure of the proxy pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Resolve(_) => StatusCode::BAD_REQUEST,
            ProxyError::Forward(ForwardError::Body(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Forward(ForwardError::Decode) => StatusCode::BAD_REQUEST,
            ProxyError::Forward(ForwardError::Upstream(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Render for a client of `proxy_domain`.
    pub fn into_response_for(self, proxy_domain: &str) -> Response<Body> {
        match self {
            ProxyError::Resolve(_) => {
                html_response(StatusCode::BAD_REQUEST, missing_origin_page(proxy_domain))
            }
            ProxyError::Forward(ForwardError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
            other => (other.status(), other.to_string()).into_response(),
        }
    }
}

pub fn html_response(status: StatusCode, body: String) -> Response<Body> {
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))],
        body,
    )
        .into_response()
}

/// A generated script; regenerated per request, so never cached.
pub fn javascript_response(body: String) -> Response<Body> {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/javascript; charset=utf-8")),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        body,
    )
        .into_response()
}

/// Empty success for blocked resources.
pub fn drop_response(request_headers: &HeaderMap) -> Response<Body> {
    let mut response = StatusCode::OK.into_response();
    attach_cors_headers(response.headers_mut(), request_headers);
    response
}

/// CORS preflight answered locally.
pub fn preflight_response(request_headers: &HeaderMap) -> Response<Body> {
    let mut response = StatusCode::OK.into_response();
    attach_cors_headers(response.headers_mut(), request_headers);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_origin_is_400_html() {
        let response = ProxyError::from(ResolveError::MissingOrigin).into_response_for("proxy.test");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn test_decode_error_is_400() {
        let err = ProxyError::from(ForwardError::Decode);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response_for("p").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_preflight_has_cors() {
        let response = preflight_response(&HeaderMap::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
