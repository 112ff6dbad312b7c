//! Relay manager: one Unix socket, one HTTP serve loop.
//!
//! # State Machine
//! ```text
//! Created ──start()──▶ Started ──stop()──▶ Stopping ──▶ Stopped
//!    │
//!    └──start() fails──▶ BindFailed
//! ```
//!
//! Managers are not restartable. The serve loop runs as its own task;
//! [`RelayManager::completion`] resolves when it exits for any reason.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::command::CommandExecutor;
use crate::config::{CommandConfig, RelayConfig};
use crate::http::build_router;
use crate::relay::error::{RelayError, ShutdownError};
use crate::relay::socket;
use crate::routing::RouteTable;

/// Lifecycle state of a relay manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Created,
    Started,
    Stopping,
    Stopped,
    BindFailed,
}

struct Running {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Owns one socket binding, its route table and its serve loop.
pub struct RelayManager {
    config: RelayConfig,
    routes: RouteTable,
    metrics: Option<PrometheusHandle>,
    shutdown_timeout: Option<Duration>,
    state: RelayState,
    running: Option<Running>,
    done_tx: watch::Sender<bool>,
}

impl RelayManager {
    /// Create a manager serving the given routes. Nothing is bound yet.
    pub fn new(config: RelayConfig, routes: RouteTable) -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            config,
            routes,
            metrics: None,
            shutdown_timeout: None,
            state: RelayState::Created,
            running: None,
            done_tx,
        }
    }

    /// Create a manager serving the standard `w3` routes.
    pub fn for_relay(
        config: RelayConfig,
        command: &CommandConfig,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<Self, RelayError> {
        let routes = RouteTable::relay_routes(executor, command, &config.rewards_files_path)
            .map_err(|source| RelayError::Routes {
                relay: config.name.clone(),
                source,
            })?;
        Ok(Self::new(config, routes))
    }

    /// Bound the graceful drain in [`stop`](Self::stop). `None` waits forever.
    pub fn with_shutdown_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Serve Prometheus metrics from this relay's socket.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    pub fn rewards_files_path(&self) -> &Path {
        &self.config.rewards_files_path
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Handle that resolves once the serve loop has exited.
    pub fn completion(&self) -> Completion {
        Completion {
            rx: self.done_tx.subscribe(),
        }
    }

    /// Bind the socket and spawn the serve loop.
    ///
    /// Returns as soon as the listener is bound.
    pub async fn start(&mut self) -> Result<(), RelayError> {
        if self.state != RelayState::Created {
            return Err(RelayError::InvalidState {
                relay: self.config.name.clone(),
                state: self.state,
            });
        }

        let listener = match socket::bind(&self.config.socket_path).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state = RelayState::BindFailed;
                tracing::error!(
                    relay = %self.config.name,
                    socket = %self.config.socket_path.display(),
                    error = %source,
                    "Failed to bind relay socket"
                );
                return Err(RelayError::Bind {
                    relay: self.config.name.clone(),
                    source,
                });
            }
        };

        let router = build_router(&self.routes, self.metrics.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let done_tx = self.done_tx.clone();
        let name = self.config.name.clone();
        let socket_path = self.config.socket_path.clone();

        let task = tokio::spawn(async move {
            // A dropped sender also counts as a shutdown request.
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;

            match &result {
                Ok(()) => tracing::info!(relay = %name, "Relay serve loop stopped"),
                Err(e) => tracing::error!(
                    relay = %name,
                    error = %e,
                    "Error while listening for HTTP requests"
                ),
            }

            socket::cleanup(&socket_path);
            done_tx.send_replace(true);
            result
        });

        self.running = Some(Running { shutdown_tx, task });
        self.state = RelayState::Started;

        tracing::info!(
            relay = %self.config.name,
            socket = %self.config.socket_path.display(),
            rewards_files_path = %self.config.rewards_files_path.display(),
            routes = self.routes.len(),
            "Relay started"
        );
        Ok(())
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// A no-op for managers that are not running.
    pub async fn stop(&mut self) -> Result<(), RelayError> {
        let Some(Running { shutdown_tx, mut task }) = self.running.take() else {
            tracing::debug!(relay = %self.config.name, state = ?self.state, "Relay not running, nothing to stop");
            return Ok(());
        };

        self.state = RelayState::Stopping;
        tracing::info!(relay = %self.config.name, "Stopping relay");
        let _ = shutdown_tx.send(());

        let joined = match self.shutdown_timeout {
            None => task.await,
            Some(timeout) => match tokio::time::timeout(timeout, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    self.finish_forced();
                    return Err(self.shutdown_error(ShutdownError::Timeout(timeout)));
                }
            },
        };

        match joined {
            Ok(Ok(())) => {
                self.state = RelayState::Stopped;
                Ok(())
            }
            Ok(Err(e)) => {
                self.state = RelayState::Stopped;
                Err(self.shutdown_error(ShutdownError::Serve(e)))
            }
            Err(e) => {
                self.finish_forced();
                Err(self.shutdown_error(ShutdownError::Join(e)))
            }
        }
    }

    /// Cleanup for a serve task that never reached its own cleanup.
    fn finish_forced(&mut self) {
        socket::cleanup(&self.config.socket_path);
        self.done_tx.send_replace(true);
        self.state = RelayState::Stopped;
    }

    fn shutdown_error(&self, source: ShutdownError) -> RelayError {
        RelayError::Shutdown {
            relay: self.config.name.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for RelayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayManager")
            .field("name", &self.config.name)
            .field("socket_path", &self.config.socket_path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Resolves when a relay's serve loop has exited.
#[derive(Debug, Clone)]
pub struct Completion {
    rx: watch::Receiver<bool>,
}

impl Completion {
    pub fn is_done(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn wait(mut self) {
        // An error means the manager is gone, which also ends the loop.
        let _ = self.rx.wait_for(|done| *done).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RelayClient;
    use crate::command::{CommandError, CommandInvocation};
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl CommandExecutor for Silent {
        async fn execute(&self, _invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
            Ok(Vec::new())
        }
    }

    /// Holds every command until the test ends.
    struct Stuck;

    #[async_trait]
    impl CommandExecutor for Stuck {
        async fn execute(&self, _invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
            std::future::pending().await
        }
    }

    fn manager(dir: &Path) -> RelayManager {
        with_executor(dir, Arc::new(Silent))
    }

    fn with_executor(dir: &Path, executor: Arc<dyn CommandExecutor>) -> RelayManager {
        RelayManager::for_relay(
            RelayConfig::new("test", dir.join("relay.sock"), dir),
            &CommandConfig::default(),
            executor,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let mut relay = manager(dir.path());
        assert_eq!(relay.state(), RelayState::Created);

        relay.start().await.unwrap();
        assert_eq!(relay.state(), RelayState::Started);
        assert!(relay.socket_path().exists());

        let completion = relay.completion();
        relay.stop().await.unwrap();
        assert_eq!(relay.state(), RelayState::Stopped);
        assert!(completion.is_done());
        assert!(!relay.socket_path().exists());
    }

    #[tokio::test]
    async fn stop_without_start_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut relay = manager(dir.path());

        relay.stop().await.unwrap();
        assert_eq!(relay.state(), RelayState::Created);
    }

    #[tokio::test]
    async fn cannot_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut relay = manager(dir.path());
        relay.start().await.unwrap();
        relay.stop().await.unwrap();

        let err = relay.start().await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::InvalidState {
                state: RelayState::Stopped,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn bind_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = manager(dir.path());
        first.start().await.unwrap();

        let mut second = manager(dir.path());
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, RelayError::Bind { .. }));
        assert_eq!(second.state(), RelayState::BindFailed);
        second.stop().await.unwrap();

        first.stop().await.unwrap();
    }

    #[tokio::test]
    async fn bounded_drain_times_out_and_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut relay = with_executor(dir.path(), Arc::new(Stuck))
            .with_shutdown_timeout(Some(Duration::from_millis(100)));
        relay.start().await.unwrap();
        let completion = relay.completion();

        let client = RelayClient::new(relay.socket_path());
        let request = tokio::spawn(async move { client.whoami().await });
        // Let the request reach the handler before stopping.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let err = relay.stop().await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Shutdown {
                source: ShutdownError::Timeout(_),
                ..
            }
        ));
        assert_eq!(relay.state(), RelayState::Stopped);
        assert!(completion.is_done());
        assert!(!relay.socket_path().exists());

        request.abort();
    }
}
