//! Shutdown requests.
//!
//! A [`Shutdown`] handle fans one request out to every [`ShutdownListener`].
//! Listeners only wake for an actual request: once every handle is gone no
//! request can arrive, so a listener whose channel closes waits forever
//! rather than treating the drop as a trigger.

use tokio::sync::broadcast::{self, error::RecvError};

/// Sending side. Cheap to clone; keep one alive for as long as shutdown
/// should stay possible.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Listeners created after [`trigger`](Self::trigger) miss that request.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown requested with nobody listening");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side, owned by whoever has to stop.
#[derive(Debug)]
pub struct ShutdownListener {
    rx: broadcast::Receiver<()>,
}

impl ShutdownListener {
    /// Resolve once shutdown has been requested.
    pub async fn requested(&mut self) {
        match self.rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => {
                tracing::warn!("Shutdown handle dropped, only an external kill will stop the relayer");
                std::future::pending::<()>().await;
            }
        }
    }
}
