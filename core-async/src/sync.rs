//! Synchronization primitives.
//!
//! Async-aware locks and channels from `tokio::sync`, plus the
//! [`CancellationToken`] used to supersede in-flight work.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! let (tx, rx) = watch::channel(None::<String>);
//! tx.send_replace(Some("2_255".to_string()));
//! assert_eq!(rx.borrow().as_deref(), Some("2_255"));
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OwnedMutexGuard, RwLock,
};

pub use tokio_util::sync::CancellationToken;
