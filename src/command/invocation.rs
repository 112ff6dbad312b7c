//! Command invocations and their failure modes.

use std::fmt;

use thiserror::Error;

/// A subcommand of the external program plus its ordered arguments.
///
/// Built by a route handler, consumed by a [`CommandExecutor`](super::CommandExecutor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    name: String,
    args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Full argv after the program: the name followed by the arguments.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in self.argv() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process ran and exited unsuccessfully.
    /// `code` is -1 when the process was terminated by a signal.
    #[error("{program} exited with status code {code}:\n{stderr}")]
    Exited {
        program: String,
        code: i32,
        stderr: String,
    },

    /// The process could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Exited { code, .. } => Some(*code),
            CommandError::Spawn { .. } => None,
        }
    }
}
