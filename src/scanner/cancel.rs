//! Scan Cancellation
//!
//! A cloneable token that broadcasts cancellation to every task of a scan
//! session. Mirrors the usual two-channel shape: a broadcast channel wakes
//! tasks that are parked in `select!`, and an atomic flag answers synchronous
//! "are we cancelled yet" checks without a receiver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Cancellation token shared by a scan session and its tasks
#[derive(Clone)]
pub struct CancelToken {
    sender: broadcast::Sender<()>,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        // Large enough that repeated cancel calls never drop a wakeup
        let (sender, _) = broadcast::channel(8);
        Self {
            sender,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe for an async cancellation wakeup
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Request cancellation of the associated scan session
    pub fn cancel(&self) {
        // Release pairs with the Acquire in is_cancelled() so observers see
        // everything written before the cancel request.
        self.cancelled.store(true, Ordering::Release);
        let _ = self.sender.send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_token_starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_wakes_subscribers() {
        let token = CancelToken::new();
        let mut rx = token.subscribe();

        token.cancel();

        assert!(token.is_cancelled());
        let woken = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(woken.is_ok(), "subscriber should be woken by cancel");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        let mut rx = clone.subscribe();

        token.cancel();

        assert!(clone.is_cancelled());
        let woken = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(woken.is_ok());
    }

    #[tokio::test]
    async fn test_repeated_cancel_is_harmless() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
