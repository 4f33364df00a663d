//! # Playback Configuration
//!
//! Timing and presentation settings for the coordinators.

use std::time::Duration;

use bridge_traits::Artwork;
use serde::{Deserialize, Serialize};

/// Playback coordinator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Pause between a chapter ending and the next one starting.
    ///
    /// Default: 1 second.
    #[serde(default = "default_chapter_autoplay_delay")]
    pub chapter_autoplay_delay: Duration,

    /// Pause between a verse ending and the next verse being claimed.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_verse_autoplay_delay")]
    pub verse_autoplay_delay: Duration,

    /// Offset used by seek-backward/forward commands that carry none.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_seek_offset")]
    pub seek_offset: Duration,

    /// Maximum number of recently played chapters kept.
    ///
    /// Default: 10.
    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: usize,

    /// Reciter shown as the artist on the media surface.
    #[serde(default = "default_artist")]
    pub artist: String,

    /// Artwork advertised to the media surface.
    #[serde(default = "default_artwork")]
    pub artwork: Vec<Artwork>,

    /// Per-subscriber buffer of the engine event channel.
    ///
    /// Default: 100.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            chapter_autoplay_delay: default_chapter_autoplay_delay(),
            verse_autoplay_delay: default_verse_autoplay_delay(),
            seek_offset: default_seek_offset(),
            recent_history_limit: default_recent_history_limit(),
            artist: default_artist(),
            artwork: default_artwork(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.seek_offset.is_zero() {
            return Err("seek_offset must be > 0".to_string());
        }

        if self.recent_history_limit == 0 {
            return Err("recent_history_limit must be > 0".to_string());
        }

        if self.event_buffer_size == 0 {
            return Err("event_buffer_size must be > 0".to_string());
        }

        if self.chapter_autoplay_delay > Duration::from_secs(60)
            || self.verse_autoplay_delay > Duration::from_secs(60)
        {
            return Err("autoplay delays must not exceed 60 seconds".to_string());
        }

        Ok(())
    }
}

fn default_chapter_autoplay_delay() -> Duration {
    Duration::from_millis(1000)
}

fn default_verse_autoplay_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_seek_offset() -> Duration {
    Duration::from_secs(10)
}

fn default_recent_history_limit() -> usize {
    10
}

fn default_artist() -> String {
    "Mishary Rashid Al Afasy".to_string()
}

fn default_artwork() -> Vec<Artwork> {
    vec![
        Artwork::new("/icon-192x192.png", "192x192", "image/png"),
        Artwork::new("/icon-512x512.png", "512x512", "image/png"),
    ]
}

fn default_event_buffer_size() -> usize {
    100
}
