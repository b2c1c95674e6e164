//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_match_total` (counter): routed requests by `outcome`
//! - `router_container_loads_total` (counter): container loads by `source` IO
//! - `router_container_load_seconds` (histogram): container load time
//! - `router_cache_total` (counter): cache reads by `result` (hit, miss, invalid)
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter is opt-in through configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub fn record_match(outcome: &'static str) {
    metrics::counter!("router_match_total", "outcome" => outcome).increment(1);
}

pub fn record_container_load(source: &'static str, started: Instant) {
    metrics::counter!("router_container_loads_total", "source" => source).increment(1);
    metrics::histogram!("router_container_load_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_cache(result: &'static str) {
    metrics::counter!("router_cache_total", "result" => result).increment(1);
}

/// Serve Prometheus metrics on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
