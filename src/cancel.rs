//! Cooperative cancellation for in-flight fetches.
//!
//! A [`CancelToken`] is polled before every page request and raced against
//! every sleep (retry backoff and inter-page throttle). Cancelling never
//! interrupts a request that is already on the wire.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::fetcher::{FetcherError, FetcherResult};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation handle; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Wakes every waiter exactly once.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`FetcherError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> FetcherResult<()> {
        if self.is_cancelled() {
            return Err(FetcherError::Cancelled);
        }
        Ok(())
    }

    /// Wait until cancellation is requested. Returns immediately if already set.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before re-checking the flag so a concurrent cancel is not missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Sleep for `duration`, returning early with `Cancelled` if `token` fires.
pub async fn sleep_or_cancel(duration: Duration, token: Option<&CancelToken>) -> FetcherResult<()> {
    match token {
        None => {
            tokio::time::sleep(duration).await;
            Ok(())
        }
        Some(token) => {
            token.check()?;
            tokio::select! {
                _ = tokio::time::sleep(duration) => Ok(()),
                _ = token.cancelled() => Err(FetcherError::Cancelled),
            }
        }
    }
}
