//! Marker traits that keep bridge bounds in one place.
//!
//! Bridge handles are shared as `Arc<dyn Trait>` between the coordinators and
//! the background tasks that drive them, so every bridge must be `Send + Sync`.

/// Marker for bridge implementations shared across tasks.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}

/// Marker for values moved into spawned tasks.
pub trait PlatformSend: Send {}

impl<T> PlatformSend for T where T: Send {}
