//! Unix socket binding and cleanup.
//!
//! # Responsibilities
//! - Refuse paths held by a live listener or occupied by a non-socket file
//! - Reclaim stale socket files left behind by a dead process
//! - Remove the socket file once the relay stops

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};

use crate::relay::error::BindError;

/// Upper bound on the liveness check of an existing socket file.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(1);

/// Bind a listener at `path`.
pub async fn bind(path: &Path) -> Result<UnixListener, BindError> {
    reclaim_stale(path).await?;

    let listener = UnixListener::bind(path).map_err(|source| BindError::Bind {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "Socket bound");
    Ok(listener)
}

async fn reclaim_stale(path: &Path) -> Result<(), BindError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(BindError::Metadata {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.file_type().is_socket() {
        return Err(BindError::NotSocket {
            path: path.to_path_buf(),
        });
    }

    let in_use = || BindError::InUse {
        path: path.to_path_buf(),
    };

    // A listener whose backlog is full never completes the connect, but is
    // still alive.
    match tokio::time::timeout(LIVENESS_TIMEOUT, UnixStream::connect(path)).await {
        Ok(Ok(_stream)) => Err(in_use()),
        Err(_elapsed) => Err(in_use()),
        Ok(Err(e)) if e.kind() == io::ErrorKind::WouldBlock => Err(in_use()),
        Ok(Err(e))
            if e.kind() == io::ErrorKind::ConnectionRefused
                || e.kind() == io::ErrorKind::NotFound =>
        {
            fs::remove_file(path).map_err(|source| BindError::StaleCleanup {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), "Removed stale socket");
            Ok(())
        }
        Ok(Err(source)) => Err(BindError::Probe {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove the socket file, ignoring a file that is already gone.
pub fn cleanup(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Socket file removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove socket file"),
    }
}
