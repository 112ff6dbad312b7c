//! Startup and shutdown orchestration for a group of relays.
//!
//! # Responsibilities
//! - Build one relay manager per configured socket
//! - Start them in order; roll back already-started relays if one fails
//! - Block until shutdown is requested or a serve loop dies on its own
//! - Stop every relay, reporting (not propagating) shutdown failures

use std::sync::Arc;

use futures_util::future::{select_all, FutureExt};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::command::CommandExecutor;
use crate::config::RelayerConfig;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::relay::{RelayError, RelayManager};

/// Owns every relay manager of the process.
#[derive(Debug, Default)]
pub struct Supervisor {
    managers: Vec<RelayManager>,
}

impl Supervisor {
    pub fn new(managers: Vec<RelayManager>) -> Self {
        Self { managers }
    }

    /// One manager per `[[relays]]` entry, all sharing `executor`.
    pub fn from_config(
        config: &RelayerConfig,
        executor: Arc<dyn CommandExecutor>,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, RelayError> {
        let managers = config
            .relays
            .iter()
            .map(|relay| {
                let manager = RelayManager::for_relay(relay.clone(), &config.command, executor.clone())?
                    .with_shutdown_timeout(config.shutdown.timeout());
                Ok(match &metrics {
                    Some(handle) => manager.with_metrics(handle.clone()),
                    None => manager,
                })
            })
            .collect::<Result<Vec<_>, RelayError>>()?;
        Ok(Self { managers })
    }

    pub fn managers(&self) -> &[RelayManager] {
        &self.managers
    }

    /// Start every relay. On the first failure, relays started so far are
    /// stopped again and the failure is returned.
    pub async fn start_all(&mut self) -> Result<(), RelayError> {
        for index in 0..self.managers.len() {
            if let Err(err) = self.managers[index].start().await {
                tracing::error!(error = %err, "Relay failed to start, rolling back");
                for started in self.managers[..index].iter_mut().rev() {
                    if let Err(stop_err) = started.stop().await {
                        tracing::warn!(error = %stop_err, "Rollback stop failed");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Wait for shutdown (or an unexpected serve loop exit), then stop all.
    ///
    /// Returns the shutdown failures; the caller logs them and exits anyway.
    pub async fn run(&mut self, mut shutdown: ShutdownListener) -> Vec<RelayError> {
        if self.managers.is_empty() {
            shutdown.requested().await;
        } else {
            let completions = self.managers.iter().map(|manager| {
                let name = manager.name().to_string();
                let completion = manager.completion();
                async move {
                    completion.wait().await;
                    name
                }
                .boxed()
            });

            tokio::select! {
                _ = shutdown.requested() => {
                    tracing::info!("Shutdown requested");
                }
                (name, _, _) = select_all(completions) => {
                    tracing::warn!(relay = %name, "Relay serve loop exited unexpectedly, stopping all relays");
                }
            }
        }

        self.stop_all().await
    }

    /// Stop every relay, continuing past failures.
    pub async fn stop_all(&mut self) -> Vec<RelayError> {
        let mut failures = Vec::new();
        for manager in &mut self.managers {
            if let Err(err) = manager.stop().await {
                tracing::warn!(error = %err, "Relay didn't shutdown cleanly");
                failures.push(err);
            }
        }
        failures
    }
}
