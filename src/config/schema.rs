//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relayer.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the relayer process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayerConfig {
    /// One entry per Unix socket to serve.
    pub relays: Vec<RelayConfig>,

    /// External command settings shared by every relay.
    pub command: CommandConfig,

    /// Graceful shutdown policy.
    pub shutdown: ShutdownConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// A single relay socket and the directory its uploads are confined to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RelayConfig {
    /// Relay identifier for logging/metrics.
    pub name: String,

    /// Filesystem path of the Unix socket to bind.
    pub socket_path: PathBuf,

    /// Root directory that `file` parameters are resolved against.
    pub rewards_files_path: PathBuf,
}

impl RelayConfig {
    pub fn new(
        name: impl Into<String>,
        socket_path: impl Into<PathBuf>,
        rewards_files_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            socket_path: socket_path.into(),
            rewards_files_path: rewards_files_path.into(),
        }
    }
}

/// External command configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Program to execute (looked up on `PATH` when not absolute).
    pub program: String,

    /// Space name passed to `space create`.
    pub space_name: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "w3".to_string(),
            space_name: "rp_odao".to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long to wait for in-flight requests to drain.
    /// `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl ShutdownConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Serve Prometheus metrics at `/metrics` on every relay socket.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
        }
    }
}
