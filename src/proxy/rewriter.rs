//! Response body and header rewriting.
//!
//! # Pipeline
//! ```text
//! UpstreamResponse
//!     → binary gate (image/, text/plain, font types, missing type, non-UTF-8)
//!         → passthrough: status, headers (minus hop-by-hop), bytes unchanged
//!     → rehome absolute target URLs onto the proxy domain
//!     → tag quoted .js/.css/.html references and script sources with ophost
//!     → replace blocklisted substrings with the drop sentinel
//!     → HTML documents only: inject the bootstrap before </body>
//!     → proxy headers (Referer, Set-Cookie, Via, X-Renav, CORS)
//! ```
//!
//! # Design Decisions
//! - Substring based, not a parser; the literal contracts are what clients rely on
//! - Every step is idempotent: a rewritten body survives a second pass unchanged
//!   apart from injected bootstrap scripts

use std::sync::Arc;

use axum::body::Body;
use axum::http::{
    header::{CONTENT_TYPE, REFERER, VIA},
    HeaderMap, HeaderName, HeaderValue, Response,
};

use crate::config::ProxySettings;
use crate::observability::metrics;
use crate::origin::{OriginSource, ResolvedOrigin, TargetOrigin, OPHOST_PARAM};
use crate::proxy::{Blocklist, ProxyRequestContext, UpstreamResponse};
use crate::scripts::bootstrap::{insert_before_body_end, Bootstrap};
use crate::scripts::NAVIGATE_PATH;
use crate::security::{attach_cors_headers, strip_body_framing, strip_hop_by_hop};
use crate::session::SessionCookieManager;

/// Diagnostic header naming the navigation helper.
pub const X_RENAV: HeaderName = HeaderName::from_static("x-renav");

/// Path fragment identifying the drop sentinel.
pub const DROP_PATH: &str = "/.drop";

/// Content-type prefixes never treated as text.
const BINARY_PREFIXES: [&str; 4] = ["image/", "text/plain", "application/font-", "font/"];

/// Quoted-reference suffixes tagged with the current origin, in application order.
/// Script sources go first so `.js"></script>` is tagged once, not twice.
const TAGGED_SUFFIXES: [&str; 4] = ["\"></script>", ".js\"", ".css\"", ".html\""];

/// One body transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// Replace every literal occurrence of `pattern`.
    Literal { pattern: String, replacement: String },
    /// Append `ophost` to the quoted URL closed inside `suffix`.
    TagSuffix { suffix: &'static str },
}

impl RewriteRule {
    pub fn apply(&self, body: &str, target: &TargetOrigin) -> String {
        match self {
            RewriteRule::Literal { pattern, replacement } => body.replace(pattern.as_str(), replacement),
            RewriteRule::TagSuffix { suffix } => tag_quoted_suffix(body, suffix, target),
        }
    }
}

/// Whether a response must be passed through byte-for-byte.
pub fn is_binary_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.trim_start().to_ascii_lowercase();
            BINARY_PREFIXES.iter().any(|prefix| ct.starts_with(prefix))
        }
    }
}

/// Append `ophost={target}` to every quoted URL whose closing quote sits inside `suffix`.
///
/// URLs already carrying `ophost=` are left alone. A URL with a query gets `&`.
/// Quoted text that is not a plausible URL is never tagged.
pub fn tag_quoted_suffix(body: &str, suffix: &str, target: &TargetOrigin) -> String {
    let Some(quote_at) = suffix.find('"') else {
        return body.to_string();
    };

    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for (start, _) in body.match_indices(suffix) {
        let close = start + quote_at;
        let Some(url) = quoted_url_before(body, close) else {
            continue;
        };
        if url.contains("ophost=") {
            continue;
        }
        let separator = if url.contains('?') { '&' } else { '?' };

        out.push_str(&body[last..close]);
        out.push(separator);
        out.push_str(OPHOST_PARAM);
        out.push('=');
        out.push_str(target.as_str());
        last = close;
    }

    out.push_str(&body[last..]);
    out
}

/// The text between the opening quote and `close`, when it plausibly is a URL.
fn quoted_url_before(body: &str, close: usize) -> Option<&str> {
    let head = &body[..close];
    let open = head.rfind('"')? + 1;
    let url = &head[open..];
    let plausible = !url.is_empty()
        && !url.contains(|c: char| c.is_whitespace() || c == '<' || c == '>');
    plausible.then_some(url)
}

/// Transforms upstream responses so the result keeps routing through the proxy.
#[derive(Debug, Clone)]
pub struct ResponseRewriter {
    proxy_domain: String,
    upstream_scheme: String,
    service_worker_path: String,
    blocklist: Arc<Blocklist>,
    session: SessionCookieManager,
}

impl ResponseRewriter {
    pub fn new(settings: &ProxySettings, blocklist: Arc<Blocklist>, session: SessionCookieManager) -> Self {
        Self {
            proxy_domain: settings.domain.clone(),
            upstream_scheme: settings.upstream_scheme.clone(),
            service_worker_path: settings.service_worker_path.clone(),
            blocklist,
            session,
        }
    }

    /// `https://{proxy}/?ophost={target}`.
    pub fn proxy_root(&self, target: &TargetOrigin) -> String {
        format!("https://{}/?{}={}", self.proxy_domain, OPHOST_PARAM, target)
    }

    /// Where blocked references are sent. Scheme-less so it survives both
    /// whole-URL and host-fragment replacements; any path containing
    /// `/.drop` reaches the sentinel.
    pub fn drop_reference(&self) -> String {
        format!("{}{}", self.proxy_domain, DROP_PATH)
    }

    /// Ordered text rules for one target.
    pub fn rules(&self, target: &TargetOrigin) -> Vec<RewriteRule> {
        let replacement = format!("https://{}/", self.proxy_domain);
        let mut rules = vec![RewriteRule::Literal {
            pattern: format!("https://{}/", target),
            replacement: replacement.clone(),
        }];
        // A plain-http upstream also links to itself over http.
        if self.upstream_scheme != "https" {
            rules.push(RewriteRule::Literal {
                pattern: format!("{}://{}/", self.upstream_scheme, target),
                replacement,
            });
        }
        rules.extend(
            TAGGED_SUFFIXES
                .iter()
                .map(|&suffix| RewriteRule::TagSuffix { suffix }),
        );
        rules
    }

    /// Steps 3 to 5: rehome, tag, filter.
    pub fn rewrite_text(&self, body: &str, target: &TargetOrigin) -> String {
        let text = self
            .rules(target)
            .iter()
            .fold(body.to_string(), |text, rule| rule.apply(&text, target));

        if !self.blocklist.matches(&text) {
            return text;
        }
        let (filtered, hits) = self.blocklist.replace_all(&text, &self.drop_reference());
        metrics::record_blocked(hits);
        tracing::debug!(origin = %target, hits, "Blocklisted references dropped");
        filtered.into_owned()
    }

    /// Step 6: the bootstrap for a full HTML document.
    pub fn inject_bootstrap(&self, html: &str, origin: &ResolvedOrigin, inject: Option<&str>) -> String {
        let bootstrap = Bootstrap {
            proxy_domain: &self.proxy_domain,
            service_worker_path: &self.service_worker_path,
            target: &origin.target,
            promote_to_url: origin.source != OriginSource::Query,
            inject,
        };
        insert_before_body_end(html, &bootstrap.render())
    }

    /// Produce the client response for an upstream result.
    pub fn rewrite(
        &self,
        upstream: UpstreamResponse,
        ctx: &ProxyRequestContext,
        origin: &ResolvedOrigin,
    ) -> Response<Body> {
        let content_type = upstream
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if is_binary_content_type(content_type.as_deref()) {
            metrics::record_rewrite("passthrough");
            return self.passthrough(upstream, ctx);
        }

        let text = match String::from_utf8(upstream.body.to_vec()) {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!(content_type = ?content_type, "Body is not UTF-8, passing through");
                metrics::record_rewrite("passthrough");
                return self.passthrough(upstream, ctx);
            }
        };

        let mut text = self.rewrite_text(&text, &origin.target);

        let is_document = content_type.as_deref().is_some_and(|ct| ct.contains("text/html"))
            && text.contains("<title");
        if is_document {
            let inject = ctx.inject_code();
            text = self.inject_bootstrap(&text, origin, inject.as_deref());
        }
        metrics::record_rewrite(if is_document { "document" } else { "text" });

        let mut headers = upstream.headers;
        strip_body_framing(&mut headers);
        self.annotate(&mut headers, ctx, origin, upstream.status);

        let mut response = Response::new(Body::from(text));
        *response.status_mut() = upstream.status;
        *response.headers_mut() = headers;
        response
    }

    fn passthrough(&self, upstream: UpstreamResponse, ctx: &ProxyRequestContext) -> Response<Body> {
        let mut headers = upstream.headers;
        strip_hop_by_hop(&mut headers);
        attach_cors_headers(&mut headers, &ctx.headers);

        let mut response = Response::new(Body::from(upstream.body));
        *response.status_mut() = upstream.status;
        *response.headers_mut() = headers;
        response
    }

    /// Proxy headers layered over the preserved upstream headers.
    fn annotate(
        &self,
        headers: &mut HeaderMap,
        ctx: &ProxyRequestContext,
        origin: &ResolvedOrigin,
        status: axum::http::StatusCode,
    ) {
        set_header(headers, REFERER, &self.proxy_root(&origin.target));
        set_header(headers, VIA, &format!("1.1 {}", self.proxy_domain));
        set_header(headers, X_RENAV, &format!("https://{}{}", self.proxy_domain, NAVIGATE_PATH));
        self.session.annotate(headers, ctx.path(), status, &origin.target);
        attach_cors_headers(headers, &ctx.headers);
    }
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "Skipping unrepresentable header"),
    }
}
