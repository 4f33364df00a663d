//! # Host Bridge Traits
//!
//! Capabilities the recitation core needs from its host platform.
//!
//! ## Overview
//!
//! The playback core owns sequencing, exclusivity and autoplay policy. Every
//! side effect that depends on the platform goes through one of the traits
//! below, injected as `Arc<dyn Trait>`:
//!
//! ### Audio
//! - [`AudioOutput`](output::AudioOutput) - One platform audio channel
//! - [`AudioOutputFactory`](output::AudioOutputFactory) - Fresh channels for verse widgets
//! - [`MediaControlSurface`](media_session::MediaControlSurface) - OS now-playing surface
//!
//! ### Content & Storage
//! - [`ContentResolver`](content::ContentResolver) - Chapter/verse audio URLs and probes
//! - [`HttpClient`](http::HttpClient) - Used by the default content resolver
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! Missing required bridges are reported at configuration time with
//! `core_runtime::Error::CapabilityMissing`, never discovered mid-playback.
//!
//! ## Error Handling
//!
//! All fallible bridge methods return [`BridgeError`](error::BridgeError).
//! Implementations convert platform errors and include enough context (URL,
//! key) to act on the message.

pub mod content;
pub mod error;
pub mod http;
pub mod media_session;
pub mod output;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use content::{ChapterInfo, ContentResolver};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media_session::{
    Artwork, MediaAction, MediaActionDetails, MediaActionHandler, MediaControlSurface,
    MediaPlaybackState, NowPlayingMetadata, PositionState,
};
pub use output::{
    AudioOutput, AudioOutputFactory, MediaErrorKind, OutputError, OutputEvent, PlayFuture,
};
pub use storage::SettingsStore;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
