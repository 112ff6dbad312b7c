//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty or duplicate relay names and socket paths
//! - Check that every rewards root is an existing directory
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::RelayerConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one relay must be configured")]
    NoRelays,

    #[error("relay #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("relay name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("socket path is required to run (relay '{relay}')")]
    EmptySocketPath { relay: String },

    #[error("socket path {path:?} is used by more than one relay")]
    DuplicateSocketPath { path: PathBuf },

    #[error("rewards files path is required to run (relay '{relay}')")]
    EmptyRewardsPath { relay: String },

    #[error("rewards files path {path:?} for relay '{relay}' is not a directory")]
    RewardsPathNotDirectory { relay: String, path: PathBuf },

    #[error("command program must not be empty")]
    EmptyProgram,

    #[error("space name must not be empty")]
    EmptySpaceName,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.relays.is_empty() {
        errors.push(ValidationError::NoRelays);
    }

    let mut names = HashSet::new();
    let mut sockets = HashSet::new();
    for (index, relay) in config.relays.iter().enumerate() {
        if relay.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(relay.name.as_str()) {
            errors.push(ValidationError::DuplicateName(relay.name.clone()));
        }

        if relay.socket_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptySocketPath {
                relay: relay.name.clone(),
            });
        } else if !sockets.insert(relay.socket_path.as_path()) {
            errors.push(ValidationError::DuplicateSocketPath {
                path: relay.socket_path.clone(),
            });
        }

        if relay.rewards_files_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyRewardsPath {
                relay: relay.name.clone(),
            });
        } else if !relay.rewards_files_path.is_dir() {
            errors.push(ValidationError::RewardsPathNotDirectory {
                relay: relay.name.clone(),
                path: relay.rewards_files_path.clone(),
            });
        }
    }

    if config.command.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram);
    }
    if config.command.space_name.trim().is_empty() {
        errors.push(ValidationError::EmptySpaceName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
