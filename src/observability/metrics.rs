//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reload_wrapper_reloads_total` (counter): start attempts by outcome
//! - `reload_wrapper_instances` (gauge): live instance count
//! - `reload_wrapper_instance_exits_total` (counter): exits by expected/unexpected
//! - `reload_wrapper_signals_forwarded_total` (counter): forwards by result
//! - `reload_wrapper_fs_events_total` (counter): reload triggers by change kind

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_reload(outcome: &'static str) {
    counter!("reload_wrapper_reloads_total", "outcome" => outcome).increment(1);
}

pub fn set_instances(live: usize) {
    gauge!("reload_wrapper_instances").set(live as f64);
}

pub fn record_instance_exit(expected: bool) {
    let label = if expected { "true" } else { "false" };
    counter!("reload_wrapper_instance_exits_total", "expected" => label).increment(1);
}

pub fn record_signal_forwarded(ok: bool) {
    let label = if ok { "ok" } else { "failed" };
    counter!("reload_wrapper_signals_forwarded_total", "result" => label).increment(1);
}

pub fn record_fs_event(kind: &'static str) {
    counter!("reload_wrapper_fs_events_total", "kind" => kind).increment(1);
}
