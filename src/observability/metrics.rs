//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bulk_requests_total` (counter): send-SMS requests by outcome
//! - `bulk_dlr_callbacks_total` (counter): DLR callbacks by result
//! - `bulk_hub_subscribers` (gauge): connected live observers
//! - `bulk_hub_dropped_total` (counter): observers dropped for a full buffer

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    metrics::counter!("bulk_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_dlr_callback(result: &'static str) {
    metrics::counter!("bulk_dlr_callbacks_total", "result" => result).increment(1);
}

pub fn record_hub_subscribers(count: usize) {
    metrics::gauge!("bulk_hub_subscribers").set(count as f64);
}

pub fn record_hub_dropped() {
    metrics::counter!("bulk_hub_dropped_total").increment(1);
}
