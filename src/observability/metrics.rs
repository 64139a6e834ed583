//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): relayed requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency by method
//! - `gateway_upstream_failures_total` (counter): failed exchanges by kind
//!
//! Without an installed recorder every call is a no-op, which is what tests
//! and runs with metrics disabled get.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "method" => method)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(kind: &'static str) {
    metrics::counter!("gateway_upstream_failures_total", "kind" => kind).increment(1);
}
