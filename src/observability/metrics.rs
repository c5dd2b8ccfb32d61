//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by platform, outcome, status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_mapping_reloads_total` (counter): reload attempts by result
//! - `relay_mapping_entries` (gauge): routing entries in the live table

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("relay_requests_total", "Total relayed webhook requests");
            describe_histogram!("relay_request_duration_seconds", "Relay latency in seconds");
            describe_counter!("relay_mapping_reloads_total", "Mapping table reload attempts");
            describe_gauge!("relay_mapping_entries", "Routing entries in the live mapping table");
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record the terminal outcome of one relay evaluation.
pub fn record_relay(platform: &'static str, outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "relay_requests_total",
        "platform" => platform,
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "relay_request_duration_seconds",
        "platform" => platform,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_mapping_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("relay_mapping_reloads_total", "result" => result).increment(1);
}

pub fn record_mapping_entries(entries: usize) {
    gauge!("relay_mapping_entries").set(entries as f64);
}
