//! w3cli relayer library.
//!
//! Serves a fixed set of `w3` CLI operations as HTTP endpoints on Unix
//! domain sockets, so local callers never need shell access to the tool.

// Core subsystems
pub mod command;
pub mod config;
pub mod http;
pub mod relay;
pub mod routing;

// Process layer
pub mod cli;
pub mod client;
pub mod lifecycle;
pub mod observability;

pub use client::{RelayClient, RelayResponse};
pub use config::schema::RelayerConfig;
pub use lifecycle::{Shutdown, Supervisor};
pub use relay::{RelayManager, RelayState};
