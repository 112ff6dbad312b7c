//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relayer_requests_total` (counter): requests by path, status
//! - `relayer_request_duration_seconds` (histogram): latency by path
//! - `relayer_command_invocations_total` (counter): commands by name, outcome
//! - `relayer_command_duration_seconds` (histogram): command latency by name
//!
//! Updates are no-ops until a recorder is installed. [`install_prometheus`]
//! installs one and returns the handle that `/metrics` renders from.

use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
pub fn install_prometheus() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Record a finished HTTP request.
pub fn record_request(path: &str, status: u16, started: Instant) {
    ::metrics::counter!(
        "relayer_requests_total",
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("relayer_request_duration_seconds", "path" => path.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Record a finished external command.
pub fn record_command(command: &str, outcome: &'static str, started: Instant) {
    ::metrics::counter!(
        "relayer_command_invocations_total",
        "command" => command.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("relayer_command_duration_seconds", "command" => command.to_string())
        .record(started.elapsed().as_secs_f64());
}
