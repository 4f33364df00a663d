//! Time-related abstractions.
//!
//! Re-exports `tokio::time` and adds [`DelayedTask`], a one-shot continuation
//! that runs after a delay unless it is cancelled first. Autoplay hand-offs
//! (chapter to chapter, verse to verse) are scheduled through it.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(10));
//! }
//! ```

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::task::{self, JoinHandle};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::{interval, sleep, sleep_until, timeout, Instant, Interval, Sleep, Timeout};

// ============================================================================
// Delayed continuation
// ============================================================================

/// A continuation scheduled to run once after a fixed delay.
///
/// Cancelling (or dropping) the handle before the delay elapses guarantees the
/// continuation never starts. Once the delay has elapsed the continuation runs
/// to completion even if the handle is dropped from inside it, so a
/// continuation may safely replace its own handle.
#[derive(Debug)]
pub struct DelayedTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DelayedTask {
    /// Schedule `continuation` to run after `delay`.
    pub fn schedule<F, Fut>(delay: Duration, continuation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let fired = token.clone();

        let handle = task::spawn(async move {
            tokio::select! {
                biased;
                _ = fired.cancelled() => {}
                _ = sleep(delay) => continuation().await,
            }
        });

        Self { token, handle }
    }

    /// Prevent the continuation from starting. No-op once it has fired.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the delay is still running and has not been cancelled.
    pub fn is_pending(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
