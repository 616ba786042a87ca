//! `ophost` extraction from `Cookie` headers.

use axum::http::{header::COOKIE, HeaderMap};
use cookie::Cookie;

/// Name of the cookie binding a client to its target origin.
pub const OPHOST_COOKIE: &str = "ophost";

/// First non-empty `ophost` cookie across every `Cookie` header.
///
/// Unparseable cookie pairs are ignored; an absent header is simply a miss.
pub fn cookie_ophost(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(ophost_from_cookie_header)
}

/// `ophost` value from a single `Cookie` header value.
pub fn ophost_from_cookie_header(header: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .filter(|c| c.name() == OPHOST_COOKIE)
        .map(|c| c.value().trim_matches('"').to_string())
        .find(|v| !v.is_empty())
}
