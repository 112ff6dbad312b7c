//! Command execution subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → invocation.rs (CommandInvocation: name + ordered args)
//!     → executor.rs (CommandExecutor: spawn, await, capture)
//!     → stdout bytes | CommandError { Exited | Spawn }
//! ```

pub mod executor;
pub mod invocation;

pub use executor::{CommandExecutor, ProcessExecutor};
pub use invocation::{CommandError, CommandInvocation};
