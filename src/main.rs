//! w3cli relayer daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!     local caller (HTTP/1.1 over Unix socket)
//!          │
//!          ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//!   │ relay        │──▶│ http server  │──▶│ route        │──▶│ command     │──▶ w3 ...
//!   │ (socket)     │   │ (axum)       │   │ handler      │   │ executor    │
//!   └──────────────┘   └──────────────┘   └──────────────┘   └─────────────┘
//!          ▲                  │
//!          │                  ▼
//!   ┌──────────────┐   ┌──────────────┐
//!   │ supervisor   │   │ response     │
//!   │ + signals    │   │ encoder      │
//!   └──────────────┘   └──────────────┘
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use w3cli_relayer::cli::RelayerArgs;
use w3cli_relayer::command::ProcessExecutor;
use w3cli_relayer::config::RelayerConfig;
use w3cli_relayer::lifecycle::{signals, Shutdown, Supervisor};
use w3cli_relayer::observability::{logging, metrics};

#[tokio::main]
async fn main() -> ExitCode {
    let args = RelayerArgs::parse();

    let config = match args.build_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    run(config).await
}

async fn run(config: RelayerConfig) -> ExitCode {
    tracing::info!(
        relays = config.relays.len(),
        program = %config.command.program,
        space_name = %config.command.space_name,
        shutdown_timeout_secs = ?config.shutdown.timeout_secs,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        match metrics::install_prometheus() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install metrics recorder");
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let executor = Arc::new(ProcessExecutor::new(config.command.program.clone()));
    let mut supervisor = match Supervisor::from_config(&config, executor, metrics_handle) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build relays");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_listener = shutdown.subscribe();

    if let Err(e) = supervisor.start_all().await {
        tracing::error!(error = %e, "Failed to start relayer");
        return ExitCode::FAILURE;
    }

    for manager in supervisor.managers() {
        tracing::info!(
            relay = %manager.name(),
            socket = %manager.socket_path().display(),
            "Started relayer on {}",
            manager.socket_path().display()
        );
    }

    signals::spawn_signal_listener(shutdown);

    let failures = supervisor.run(shutdown_listener).await;
    for failure in &failures {
        tracing::warn!(error = %failure, "Relay didn't shut down cleanly");
    }

    tracing::info!("Relayer stopped.");
    ExitCode::SUCCESS
}
