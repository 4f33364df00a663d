//! Async runtime facade for the recitation core.
//!
//! Every core-* crate goes through this crate instead of naming tokio
//! directly, so the executor can be swapped in one place.
//!
//! # Modules
//!
//! - `task`: Task spawning and execution
//! - `time`: Sleep, instants and the cancellable [`DelayedTask`]
//! - `sync`: Channels, locks and cancellation tokens
//! - `runtime`: Blocking entry point for synchronous callers
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{DelayedTask, Duration};
//!
//! # async fn example() {
//! // Fires after one second unless cancelled first.
//! let continuation = DelayedTask::schedule(Duration::from_secs(1), || async {
//!     println!("next chapter");
//! });
//! continuation.cancel();
//! # }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

// Re-export commonly used types at crate root for convenience
pub use task::spawn;
pub use time::{sleep, DelayedTask, Duration, Instant};
