//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! RelayConfig + RouteTable
//!     → manager.rs (RelayManager::start)
//!     → socket.rs (reclaim stale file, bind UnixListener)
//!     → axum::serve task (graceful shutdown on oneshot)
//!     → socket.rs (remove socket file) → Completion resolves
//! ```
//!
//! One manager exclusively owns one socket path. Per-request errors are
//! turned into responses by the HTTP layer and never reach this module;
//! only bind and shutdown failures change a manager's state.

pub mod error;
pub mod manager;
pub mod socket;

pub use error::{BindError, RelayError, ShutdownError};
pub use manager::{Completion, RelayManager, RelayState};
