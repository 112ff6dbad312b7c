//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     RelayerConfig → one RelayManager per socket → start in order
//!     (any bind failure rolls back started relays, process exits 1)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → ShutdownListener wakes Supervisor::run
//!     → stop every relay (drain, remove socket) → exit 0
//! ```

pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownListener};
pub use supervisor::Supervisor;
