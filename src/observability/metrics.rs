//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bookstore_http_requests_total` (counter): requests by method, route, status
//! - `bookstore_http_request_duration_seconds` (histogram): latency by method, route
//! - `bookstore_database_connected` (gauge): 1=connected, 0=not
//! - `bookstore_shutdowns_total` (counter): shutdowns by triggering signal
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("bookstore_http_requests_total", &labels).increment(1);

    histogram!(
        "bookstore_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_database_status(connected: bool) {
    gauge!("bookstore_database_connected").set(if connected { 1.0 } else { 0.0 });
}

pub fn record_shutdown(signal: &str) {
    counter!("bookstore_shutdowns_total", "signal" => signal.to_string()).increment(1);
}
