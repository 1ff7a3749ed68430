//! Shutdown signal handling.
//!
//! SIGTERM (sent by systemd and most supervisors) and Ctrl-C both cancel a
//! [`CancellationToken`], which the API server uses to drain and stop.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Listens for termination signals and cancels a token when one arrives.
pub struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    /// Create a handler that cancels `token` on shutdown.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A token that is cancelled when a shutdown signal arrives.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for SIGTERM or Ctrl-C, then cancel the token.
    ///
    /// Returns early without cancelling if the token is cancelled elsewhere.
    /// Should be spawned as a background task.
    pub async fn run(self) {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                None
            }
        };

        let terminate = async {
            match sigterm.as_mut() {
                Some(s) => {
                    s.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = terminate => info!("Received SIGTERM, initiating shutdown"),
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Received Ctrl-C, initiating shutdown"),
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            },
            _ = self.token.cancelled() => return,
        }

        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_returns_when_cancelled_elsewhere() {
        let token = CancellationToken::new();
        let handler = SignalHandler::new(token.clone());
        let handle = tokio::spawn(handler.run());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("handler did not stop")
            .unwrap();
    }

    #[test]
    fn test_token_shared() {
        let token = CancellationToken::new();
        let handler = SignalHandler::new(token.clone());

        handler.token().cancel();
        assert!(token.is_cancelled());
    }
}
