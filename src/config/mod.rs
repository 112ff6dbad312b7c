//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or CLI flags
//!     → loader.rs (parse, make rewards roots absolute)
//!     → validation.rs (semantic checks)
//!     → RelayerConfig (validated, immutable)
//!     → one RelayConfig per relay manager
//! ```
//!
//! Config is immutable once loaded. All fields have defaults so a config
//! file only needs its `[[relays]]` entries.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize_config, parse_config, read_config, ConfigError};
pub use schema::{
    CommandConfig, LogFormat, ObservabilityConfig, RelayConfig, RelayerConfig, ShutdownConfig,
};
pub use validation::ValidationError;
