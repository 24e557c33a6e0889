//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by operation, outcome
//! - `gateway_request_duration_seconds` (histogram): pipeline latency by operation
//! - `gateway_bind_fallbacks_total` (counter): fields that fell back to zero, by reason
//! - `gateway_interceptor_failures_total` (counter): hook failures by phase

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(err) => {
            tracing::error!(address = %addr, error = %err, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(operation: &str, outcome: &'static str, start: Instant) {
    let operation = operation.to_string();
    counter!(
        "gateway_requests_total",
        "operation" => operation.clone(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_bind_fallback(reason: &'static str) {
    counter!("gateway_bind_fallbacks_total", "reason" => reason).increment(1);
}

pub fn record_interceptor_failure(phase: &'static str) {
    counter!("gateway_interceptor_failures_total", "phase" => phase).increment(1);
}
