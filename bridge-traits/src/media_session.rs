//! System media control surface bridge.
//!
//! Hosts expose the OS "now playing" surface (lock screen, media keys,
//! notification controls) through [`MediaControlSurface`]. The chapter
//! coordinator is the only writer: it publishes metadata, playback state and
//! position, and installs one handler per [`MediaAction`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Artwork image advertised to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub src: String,
    pub sizes: String,
    pub mime_type: String,
}

impl Artwork {
    pub fn new(
        src: impl Into<String>,
        sizes: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            sizes: sizes.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Now-playing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Vec<Artwork>,
}

/// Transport action the surface can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaAction {
    Play,
    Pause,
    SeekBackward,
    SeekForward,
    SeekTo,
}

impl MediaAction {
    /// All actions the coordinator installs handlers for.
    pub const ALL: [MediaAction; 5] = [
        MediaAction::Play,
        MediaAction::Pause,
        MediaAction::SeekBackward,
        MediaAction::SeekForward,
        MediaAction::SeekTo,
    ];
}

/// Arguments delivered with an action.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MediaActionDetails {
    /// Relative offset in seconds for seek-backward/forward.
    pub seek_offset: Option<f64>,
    /// Absolute target in seconds for seek-to.
    pub seek_time: Option<f64>,
}

/// Playback state shown by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaPlaybackState {
    None,
    Paused,
    Playing,
}

/// Position information shown by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub duration: f64,
    pub playback_rate: f64,
    pub position: f64,
}

/// Callback the surface invokes when the user triggers an action.
pub type MediaActionHandler = Arc<dyn Fn(MediaActionDetails) + Send + Sync>;

/// OS-level media control surface.
///
/// All methods are fire-and-forget; the coordinator logs and ignores errors.
pub trait MediaControlSurface: PlatformSendSync {
    /// Publish (or clear, with `None`) now-playing metadata.
    fn set_metadata(&self, metadata: Option<NowPlayingMetadata>) -> Result<()>;

    /// Install (or remove, with `None`) the handler for one action.
    fn set_action_handler(
        &self,
        action: MediaAction,
        handler: Option<MediaActionHandler>,
    ) -> Result<()>;

    /// Publish the coarse playback state.
    fn set_playback_state(&self, state: MediaPlaybackState) -> Result<()>;

    /// Publish position information.
    fn set_position_state(&self, state: PositionState) -> Result<()>;
}
