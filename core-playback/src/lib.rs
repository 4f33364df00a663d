//! # Playback Coordination
//!
//! Chapter and verse recitation playback over host audio channels.
//!
//! ## Overview
//!
//! - [`PlaybackEngine`]: one output channel with race-safe load, play,
//!   pause, seek and volume, and a typed lifecycle event stream
//! - [`ChapterPlaybackCoordinator`]: whole-chapter playback, next/previous
//!   navigation with wraparound, chapter autoplay and the media control
//!   surface
//! - [`VersePlaybackCoordinator`] and [`VerseWidget`]: one engine per verse,
//!   mutual exclusion and verse-to-verse autoplay through the
//!   [`PlaybackIntentBroker`]
//! - [`PreferencesService`]: autoplay flags, verse audio visibility and
//!   default volume, read fresh for every decision
//! - [`RecentlyPlayedHistory`]: chapters that started playing, newest first
//!
//! Every platform side effect goes through `bridge_traits`.

pub mod broker;
pub mod chapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod preferences;
pub mod types;
pub mod verse;

pub use broker::PlaybackIntentBroker;
pub use chapter::{ChapterCoordinatorDeps, ChapterPlaybackCoordinator};
pub use config::PlaybackConfig;
pub use engine::{EngineEvent, EngineSnapshot, PlayOutcome, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use history::{RecentlyPlayed, RecentlyPlayedHistory};
pub use preferences::{
    verse_autoplay_eligible, Preferences, PreferencesPatch, PreferencesService,
};
pub use types::{
    ChapterId, PlaybackState, PlaybackStatus, PlaybackTarget, VerseKey, CHAPTER_COUNT,
};
pub use verse::{Availability, VerseDeps, VersePlaybackCoordinator, VerseWidget, VerseWidgetState};
