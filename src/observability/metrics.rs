//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpy_requests_total` (counter): requests by method, status, route
//! - `httpy_request_duration_seconds` (histogram): dispatch latency
//! - `httpy_worker_failures_total` (counter): failures by kind
//!   (`error`, `panic`, `protocol`, `timeout`, `overloaded`)
//! - `httpy_in_flight_requests` (gauge): worker invocations still running
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "httpy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "httpy_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_worker_failure(kind: &'static str) {
    metrics::counter!("httpy_worker_failures_total", "kind" => kind).increment(1);
}

/// Tracks a running worker invocation for its whole lifetime.
#[derive(Debug)]
pub struct InFlightGuard(());

impl InFlightGuard {
    pub fn new() -> Self {
        metrics::gauge!("httpy_in_flight_requests").increment(1.0);
        Self(())
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        metrics::gauge!("httpy_in_flight_requests").decrement(1.0);
    }
}
