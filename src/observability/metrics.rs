//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by site and outcome
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency
//! - `router_table_reloads_total` (counter): successful route table swaps
//!
//! # Design Decisions
//! - Recorded by the HTTP adapter; dispatch itself stays side-effect free
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch.
pub fn record_dispatch(site: &str, outcome: &'static str, start: Instant) {
    metrics::counter!("router_dispatch_total", "site" => site.to_string(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", "site" => site.to_string(), "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a route table swap after a config reload.
pub fn record_reload(site: &str) {
    metrics::counter!("router_table_reloads_total", "site" => site.to_string()).increment(1);
}
