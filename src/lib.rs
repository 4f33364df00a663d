//! Workspace placeholder crate.
//!
//! Exposes the feature flags that map onto the individual workspace crates so
//! host applications can depend on `recitation-workspace` and pick a bridge
//! set (currently `desktop-shims`) without wiring each crate by hand.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
