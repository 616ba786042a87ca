//! Outbound request construction and dispatch.
//!
//! # Responsibilities
//! - Build `{scheme}://{target}{path+query}` for the resolved target
//! - Present a fixed browser-like User-Agent
//! - Spoof `Referer` and `Origin` as the target itself
//! - Percent-decode non-GET/HEAD bodies once before attaching them
//!
//! # Design Decisions
//! - Exactly one outbound call per request: no retry, no timeout
//! - Transport failures surface unchanged as `ForwardError::Upstream`

use axum::body::Bytes;
use axum::http::{
    header::{CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT},
    HeaderMap, Method, StatusCode,
};
use thiserror::Error;

use crate::config::ProxySettings;
use crate::origin::TargetOrigin;
use crate::proxy::ProxyRequestContext;

/// Failures between reading the inbound request and receiving the upstream body.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Inbound body could not be buffered (e.g. over the size limit).
    #[error("failed to read request body: {0}")]
    Body(String),

    /// Inbound body did not percent-decode to valid UTF-8.
    #[error("request body is not valid percent-encoded text")]
    Decode,

    /// The outbound call failed at the transport level.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Raw upstream result.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Issues the single outbound request for a proxied call.
#[derive(Debug, Clone)]
pub struct RequestForwarder {
    client: reqwest::Client,
    scheme: String,
    user_agent: String,
}

impl RequestForwarder {
    pub fn new(settings: &ProxySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            client,
            scheme: settings.upstream_scheme.clone(),
            user_agent: settings.user_agent.clone(),
        })
    }

    /// `{scheme}://{target}`, used for the URL base and the spoofed headers.
    pub fn target_base(&self, target: &TargetOrigin) -> String {
        format!("{}://{}", self.scheme, target)
    }

    pub fn upstream_url(&self, target: &TargetOrigin, path_and_query: &str) -> String {
        format!("{}{}", self.target_base(target), path_and_query)
    }

    /// Build the outbound request without sending it.
    pub fn build(
        &self,
        target: &TargetOrigin,
        ctx: &ProxyRequestContext,
    ) -> Result<reqwest::Request, ForwardError> {
        let base = self.target_base(target);
        let mut builder = self
            .client
            .request(ctx.method.clone(), self.upstream_url(target, ctx.path_and_query()))
            .header(USER_AGENT, self.user_agent.as_str())
            .header(REFERER, base.as_str())
            .header(ORIGIN, base.as_str());

        if carries_body(&ctx.method) {
            builder = builder.body(decode_body(&ctx.body)?);
            if let Some(content_type) = ctx.headers.get(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, content_type.clone());
            }
        }

        Ok(builder.build()?)
    }

    /// Send the request and buffer the upstream response.
    pub async fn forward(
        &self,
        target: &TargetOrigin,
        ctx: &ProxyRequestContext,
    ) -> Result<UpstreamResponse, ForwardError> {
        let request = self.build(target, ctx)?;

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Forwarding to target"
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Read the body as text and percent-decode it exactly once.
///
/// Whether clients pre-encode bodies on purpose is unresolved; the decode is
/// kept as-is. `+` is left alone.
pub fn decode_body(body: &[u8]) -> Result<String, ForwardError> {
    let text = String::from_utf8_lossy(body);
    urlencoding::decode(&text)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ForwardError::Decode)
}
