//! Command-line arguments for the relayer daemon.
//!
//! Flags describe a single relay named `watchtower`. A config file can
//! describe several; when both are given the flags replace the file's relay
//! list while the file's other sections still apply.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{finalize_config, read_config, ConfigError, RelayConfig, RelayerConfig};

/// Relay name used for the relay described by command-line flags.
pub const DEFAULT_RELAY_NAME: &str = "watchtower";

#[derive(Debug, Clone, Parser)]
#[command(name = "w3cli-relayer")]
#[command(about = "Relays a fixed set of w3 commands over a Unix domain socket", long_about = None)]
pub struct RelayerArgs {
    /// TOML config file.
    #[arg(short, long, env = "RELAYER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Unix socket to listen on.
    #[arg(short, long, env = "RELAYER_SOCKET_PATH")]
    pub socket_path: Option<PathBuf>,

    /// Directory that uploaded file names are resolved against.
    #[arg(short, long, env = "RELAYER_REWARDS_FILES_PATH")]
    pub rewards_files_path: Option<PathBuf>,

    /// w3 executable to run.
    #[arg(long, env = "RELAYER_W3_PROGRAM")]
    pub program: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Give up on in-flight requests after this many seconds on shutdown.
    #[arg(long)]
    pub shutdown_timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("socket path is required to run")]
    SocketPathRequired,
    #[error("rewards files path is required to run")]
    RewardsPathRequired,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RelayerArgs {
    /// Merge the config file (if any) with the flags and validate the result.
    pub fn build_config(&self) -> Result<RelayerConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RelayerConfig::default(),
        };

        let flags_given = self.socket_path.is_some() || self.rewards_files_path.is_some();
        if flags_given || config.relays.is_empty() {
            let socket_path = self
                .socket_path
                .clone()
                .ok_or(CliError::SocketPathRequired)?;
            let rewards_files_path = self
                .rewards_files_path
                .clone()
                .ok_or(CliError::RewardsPathRequired)?;
            config.relays = vec![RelayConfig::new(
                DEFAULT_RELAY_NAME,
                socket_path,
                rewards_files_path,
            )];
        }

        if let Some(program) = &self.program {
            config.command.program = program.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            config.shutdown.timeout_secs = Some(secs);
        }

        Ok(finalize_config(config)?)
    }
}
