//! External process execution.
//!
//! # Responsibilities
//! - Run `<program> <name> <args...>` and capture stdout and stderr
//! - Map nonzero exits to [`CommandError::Exited`] and spawn failures to
//!   [`CommandError::Spawn`]
//! - Record invocation metrics
//!
//! No retry, timeout or concurrency limit is applied: every request awaits
//! its own process until it exits.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use crate::command::{CommandError, CommandInvocation};
use crate::observability::metrics;

/// Boundary over the external tool.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run one invocation to completion and return its stdout.
    async fn execute(&self, invocation: CommandInvocation) -> Result<Vec<u8>, CommandError>;
}

/// Executor that spawns a real child process per invocation.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, invocation: CommandInvocation) -> Result<Vec<u8>, CommandError> {
        let started = Instant::now();
        tracing::debug!(program = %self.program, command = %invocation, "Running command");

        let output = Command::new(&self.program)
            .args(invocation.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| {
                metrics::record_command(invocation.name(), "spawn_error", started);
                CommandError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        if !output.status.success() {
            metrics::record_command(invocation.name(), "failed", started);
            return Err(CommandError::Exited {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        metrics::record_command(invocation.name(), "ok", started);
        tracing::debug!(
            command = invocation.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "Command finished"
        );
        Ok(output.stdout)
    }
}
