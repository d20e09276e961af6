//! Shutdown signalling shared by the host and its services

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle used to request, and wait for, host shutdown.
///
/// Clones share the same underlying token.
#[derive(Debug, Clone, Default)]
pub struct ApplicationLifetime {
    token: CancellationToken,
}

impl ApplicationLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the host to stop. Calling it more than once is harmless.
    pub fn stop_application(&self) {
        if !self.token.is_cancelled() {
            debug!("application stop requested");
        }
        self.token.cancel();
    }

    /// Whether a stop has been requested
    pub fn is_stopping(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested
    pub async fn stopping(&self) {
        self.token.cancelled().await
    }

    /// Token that is cancelled when the host stops
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
