//! # Playback Error Types
//!
//! Error taxonomy for chapter and verse playback.
//!
//! Three failure families are errors: resolution (no URL for a target), load
//! (the output channel could not buffer or decode the source) and
//! unavailability (the existence probe said there is no recording).
//! A play request superseded by a newer load, pause or stop is not an error;
//! the engine reports it as [`PlayOutcome::Superseded`](crate::PlayOutcome).

use bridge_traits::{BridgeError, MediaErrorKind};
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// No audio URL could be resolved for the target.
    #[error("Could not resolve audio for {target}: {reason}")]
    ResolutionFailed { target: String, reason: String },

    /// The existence probe reported no recording for the target.
    #[error("Audio unavailable: {0}")]
    Unavailable(String),

    // ========================================================================
    // Load Errors
    // ========================================================================
    /// The output channel failed to load, buffer or decode the source.
    #[error("Failed to load {}: {kind}", .target.as_deref().unwrap_or("audio"))]
    LoadFailed {
        target: Option<String>,
        kind: MediaErrorKind,
    },

    /// The platform refused to start audio without a user gesture.
    #[error("Playback not allowed by platform policy")]
    NotAllowed,

    /// Attempted a transport operation before any source was loaded.
    #[error("No source loaded")]
    NoSourceLoaded,

    /// The engine is in the error state; only a fresh load clears it.
    #[error("Playback is in a terminal error state; load a new source")]
    TerminalError,

    // ========================================================================
    // Identifier Errors
    // ========================================================================
    #[error("Invalid chapter: {0} (expected 1..=114)")]
    InvalidChapter(u16),

    #[error("Invalid verse key: {0}")]
    InvalidVerseKey(String),

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Preferences error: {0}")]
    Preferences(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the error should reach the inline error indicator.
    ///
    /// A platform refusal only leaves playback paused.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PlaybackError::NotAllowed)
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadFailed {
                kind: MediaErrorKind::Network,
                ..
            } | PlaybackError::ResolutionFailed { .. }
                | PlaybackError::Unavailable(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
