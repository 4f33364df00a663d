//! Audio output channel bridge.
//!
//! An [`AudioOutput`] is one platform audio channel: a single source slot,
//! transport primitives and a stream of raw [`OutputEvent`]s. It deliberately
//! mirrors the shape of a browser media element so web, desktop and mobile
//! hosts can all back it with their native players.
//!
//! The core never talks to an output directly from UI code. The playback
//! engine wraps each channel, serialises play/pause against each other and
//! translates the raw events into its own typed lifecycle enum.
//!
//! ## Contract
//!
//! - `play()` returns a future that resolves once audio is actually running.
//!   If the source changes or playback is paused before that, the future must
//!   settle with [`OutputError::Interrupted`].
//! - Events are delivered in the order the platform produced them. Hosts emit
//!   `Ended` exactly once per natural end of the current source.
//! - `set_volume` accepts values already clamped to `[0.0, 1.0]`.

use std::fmt;
use std::sync::Arc;

use core_async::sync::broadcast;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::Result, platform::PlatformSendSync};

/// Category of a genuine media failure reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaErrorKind {
    /// Fetching was aborted by the user agent.
    Aborted,
    /// A network error interrupted fetching.
    Network,
    /// The resource was fetched but could not be decoded.
    Decode,
    /// The resource or its format is not supported.
    SourceNotSupported,
    /// Anything the platform could not classify.
    Unknown,
}

impl MediaErrorKind {
    /// Map a `MediaError.code` style numeric code.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => MediaErrorKind::Aborted,
            2 => MediaErrorKind::Network,
            3 => MediaErrorKind::Decode,
            4 => MediaErrorKind::SourceNotSupported,
            _ => MediaErrorKind::Unknown,
        }
    }
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaErrorKind::Aborted => "aborted",
            MediaErrorKind::Network => "network",
            MediaErrorKind::Decode => "decode",
            MediaErrorKind::SourceNotSupported => "source not supported",
            MediaErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Raw event emitted by an output channel.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The channel started fetching the current source.
    LoadStart,
    /// Duration became known (`None` for live or unknown lengths).
    LoadedMetadata { duration: Option<f64> },
    /// Enough data is buffered to start or resume.
    CanPlay,
    /// Playback stalled waiting for data.
    Waiting,
    /// Periodic position report in seconds.
    TimeUpdate { position: f64 },
    /// Audio is running.
    Playing,
    /// Audio was paused.
    Paused,
    /// The source played to its natural end.
    Ended,
    /// A genuine failure for the current source.
    Error { kind: MediaErrorKind },
}

/// Failure of a single `play()` request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// The request was superseded by a new source or a pause.
    #[error("play request interrupted")]
    Interrupted,

    /// The platform refused to start audio (autoplay policy).
    #[error("play request not allowed by platform policy")]
    NotAllowed,

    /// The source failed to load or decode.
    #[error("playback failed: {0}")]
    Failed(MediaErrorKind),
}

impl OutputError {
    /// Whether the failure only means "a newer request won".
    pub fn is_interruption(&self) -> bool {
        matches!(self, OutputError::Interrupted)
    }
}

/// Future returned by [`AudioOutput::play`].
pub type PlayFuture = BoxFuture<'static, std::result::Result<(), OutputError>>;

/// One platform audio channel.
///
/// Transport methods are synchronous requests; their effects are observed
/// through [`subscribe`](AudioOutput::subscribe) except for `play`, whose
/// start is confirmed through the returned future.
pub trait AudioOutput: PlatformSendSync {
    /// Replace (or clear, with `None`) the current source.
    fn set_source(&self, url: Option<&str>) -> Result<()>;

    /// Start (re)loading the current source.
    fn load(&self) -> Result<()>;

    /// Request playback of the current source.
    fn play(&self) -> PlayFuture;

    /// Pause playback.
    fn pause(&self) -> Result<()>;

    /// Move the playhead, in seconds.
    fn seek(&self, position_secs: f64) -> Result<()>;

    /// Set the output gain in `[0.0, 1.0]`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current playhead, in seconds.
    fn position(&self) -> f64;

    /// Duration of the current source when known.
    fn duration(&self) -> Option<f64>;

    /// Subscribe to raw channel events.
    fn subscribe(&self) -> broadcast::Receiver<OutputEvent>;
}

/// Creates independent output channels (one per verse widget).
pub trait AudioOutputFactory: PlatformSendSync {
    fn create_output(&self) -> Result<Arc<dyn AudioOutput>>;
}
