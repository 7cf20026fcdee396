//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_retries_total` (counter): backoff retries by upstream path
//! - `gateway_upstream_rate_limited_total` (counter): dispatches that exhausted
//!   their retry budget

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and serve the scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one backoff retry against the upstream.
pub fn record_retry(path: &str) {
    metrics::counter!("gateway_upstream_retries_total", "path" => path.to_string()).increment(1);
}

/// Record a dispatch that exhausted its retry budget.
pub fn record_rate_limited(path: &str) {
    metrics::counter!("gateway_upstream_rate_limited_total", "path" => path.to_string())
        .increment(1);
}
