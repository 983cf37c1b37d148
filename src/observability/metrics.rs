//! Metrics collection and exposition.
//!
//! # Metrics
//! - `chronobond_phase_transitions_total` (counter): by flow, phase
//! - `chronobond_workflow_outcomes_total` (counter): by flow, outcome
//! - `chronobond_in_flight_operations` (gauge): by flow
//! - `chronobond_quote_requests_total` (counter): by mode, outcome
//! - `chronobond_chain_calls_total` (counter): by call, outcome
//! - `chronobond_chain_call_duration_seconds` (histogram): by call
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_phase_transition(flow: &'static str, phase: &'static str) {
    counter!("chronobond_phase_transitions_total", "flow" => flow, "phase" => phase).increment(1);
}

pub fn record_workflow_outcome(flow: &'static str, outcome: &'static str) {
    counter!("chronobond_workflow_outcomes_total", "flow" => flow, "outcome" => outcome)
        .increment(1);
}

pub fn set_in_flight(flow: &'static str, count: usize) {
    gauge!("chronobond_in_flight_operations", "flow" => flow).set(count as f64);
}

pub fn record_quote_request(mode: &'static str, outcome: &'static str) {
    counter!("chronobond_quote_requests_total", "mode" => mode, "outcome" => outcome).increment(1);
}

pub fn record_chain_call(call: &'static str, outcome: &'static str, start: Instant) {
    counter!("chronobond_chain_calls_total", "call" => call, "outcome" => outcome).increment(1);
    histogram!("chronobond_chain_call_duration_seconds", "call" => call)
        .record(start.elapsed().as_secs_f64());
}
