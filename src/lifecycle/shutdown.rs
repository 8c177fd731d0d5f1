//! Shutdown coordination.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Background loops subscribe to the broadcast channel; orchestration runs
/// hold child tokens of the root cancellation token.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            token: CancellationToken::new(),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// A token cancelled when shutdown is triggered.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been triggered.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }

    /// Number of background loops still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
