//! Relay lifecycle errors.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::relay::manager::RelayState;
use crate::routing::RouteError;

/// The socket path cannot be bound.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("socket {path:?} is already in use by a running listener")]
    InUse { path: PathBuf },

    #[error("{path:?} exists and is not a socket")]
    NotSocket { path: PathBuf },

    #[error("failed to inspect {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to probe existing socket {path:?}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove stale socket {path:?}: {source}")]
    StaleCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error creating socket {path:?}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Graceful shutdown did not complete cleanly.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("in-flight requests did not finish within {0:?}")]
    Timeout(Duration),

    #[error("error while listening for HTTP requests: {0}")]
    Serve(#[source] io::Error),

    #[error("serve task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("error starting relay '{relay}': {source}")]
    Bind {
        relay: String,
        #[source]
        source: BindError,
    },

    #[error("relay '{relay}' didn't shut down cleanly: {source}")]
    Shutdown {
        relay: String,
        #[source]
        source: ShutdownError,
    },

    #[error("relay '{relay}' has an invalid route table: {source}")]
    Routes {
        relay: String,
        #[source]
        source: RouteError,
    },

    #[error("relay '{relay}' cannot start from state {state:?}")]
    InvalidState { relay: String, state: RelayState },
}
