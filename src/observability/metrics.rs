//! Metrics collection and exposition.
//!
//! # Metrics
//! - `subscription_gate_decisions_total` (counter): gate outcomes by `outcome`
//!
//! Outcomes: `exempt`, `allowed`, `subscription_required`,
//! `resolver_misconfigured`, `route_not_found`, `backend_error`.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const GATE_DECISIONS_TOTAL: &str = "subscription_gate_decisions_total";

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one gate outcome.
pub fn record_decision(outcome: &'static str) {
    metrics::counter!(GATE_DECISIONS_TOTAL, "outcome" => outcome).increment(1);
}
