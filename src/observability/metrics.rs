//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route kind
//! - `proxy_request_duration_seconds` (histogram): latency by route kind
//! - `proxy_rewrites_total` (counter): responses by rewrite outcome
//! - `proxy_blocked_total` (counter): blocklisted references dropped
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Prometheus scrape endpoint only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, kind: &'static str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "kind" => kind
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rewrite(outcome: &'static str) {
    counter!("proxy_rewrites_total", "outcome" => outcome).increment(1);
}

pub fn record_blocked(hits: usize) {
    counter!("proxy_blocked_total").increment(hits as u64);
}
