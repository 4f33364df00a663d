//! Identifiers and state snapshots shared by the engine and coordinators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// Number of chapters in the corpus.
pub const CHAPTER_COUNT: u16 = 114;

// ============================================================================
// Identifiers
// ============================================================================

/// A chapter id in `1..=114`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ChapterId(u16);

impl ChapterId {
    pub const FIRST: ChapterId = ChapterId(1);
    pub const LAST: ChapterId = ChapterId(CHAPTER_COUNT);

    pub fn new(id: u16) -> Result<Self> {
        if (1..=CHAPTER_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(PlaybackError::InvalidChapter(id))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// The following chapter, wrapping from the last to the first.
    pub fn next(self) -> Self {
        Self(self.0 % CHAPTER_COUNT + 1)
    }

    /// The preceding chapter, wrapping from the first to the last.
    pub fn previous(self) -> Self {
        if self.0 == 1 {
            Self::LAST
        } else {
            Self(self.0 - 1)
        }
    }
}

impl TryFrom<u16> for ChapterId {
    type Error = PlaybackError;

    fn try_from(id: u16) -> Result<Self> {
        Self::new(id)
    }
}

impl From<ChapterId> for u16 {
    fn from(id: ChapterId) -> Self {
        id.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite verse identifier, written `"{chapter}_{verse}"`.
///
/// ```
/// use core_playback::VerseKey;
///
/// let key: VerseKey = "2_255".parse().unwrap();
/// assert_eq!(key.chapter().get(), 2);
/// assert_eq!(key.verse(), 255);
/// assert_eq!(key.to_string(), "2_255");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerseKey {
    chapter: ChapterId,
    verse: u16,
}

impl VerseKey {
    pub fn new(chapter: u16, verse: u16) -> Result<Self> {
        let chapter =
            ChapterId::new(chapter).map_err(|_| PlaybackError::InvalidVerseKey(format!("{chapter}_{verse}")))?;
        if verse == 0 {
            return Err(PlaybackError::InvalidVerseKey(format!("{chapter}_{verse}")));
        }
        Ok(Self { chapter, verse })
    }

    pub fn chapter(&self) -> ChapterId {
        self.chapter
    }

    pub fn verse(&self) -> u16 {
        self.verse
    }

    /// The next verse of the same chapter, if `verse + 1 <= total_verses`.
    pub fn next_within(&self, total_verses: u16) -> Option<Self> {
        let next = self.verse.checked_add(1)?;
        (next <= total_verses).then_some(Self {
            chapter: self.chapter,
            verse: next,
        })
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PlaybackError::InvalidVerseKey(s.to_string());
        let (chapter, verse) = s.split_once('_').ok_or_else(invalid)?;
        let chapter = chapter.parse::<u16>().map_err(|_| invalid())?;
        let verse = verse.parse::<u16>().map_err(|_| invalid())?;
        Self::new(chapter, verse).map_err(|_| invalid())
    }
}

impl TryFrom<String> for VerseKey {
    type Error = PlaybackError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<VerseKey> for String {
    fn from(key: VerseKey) -> Self {
        key.to_string()
    }
}

/// What is playing: a whole chapter or a single verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PlaybackTarget {
    Chapter(ChapterId),
    Verse(VerseKey),
}

impl PlaybackTarget {
    pub fn chapter(&self) -> ChapterId {
        match self {
            PlaybackTarget::Chapter(id) => *id,
            PlaybackTarget::Verse(key) => key.chapter(),
        }
    }
}

impl fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackTarget::Chapter(id) => write!(f, "chapter {}", id),
            PlaybackTarget::Verse(key) => write!(f, "verse {}", key),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Lifecycle status shared by engine-backed components.
///
/// `idle -> loading -> playing <-> paused`, `playing/loading -> ended`,
/// any state `-> error`. `error` is terminal until a fresh load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackStatus {
    pub fn is_playing(self) -> bool {
        self == PlaybackStatus::Playing
    }

    /// Loading or playing.
    pub fn is_busy(self) -> bool {
        matches!(self, PlaybackStatus::Loading | PlaybackStatus::Playing)
    }
}

/// Snapshot of one playback channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub target: Option<PlaybackTarget>,
    pub status: PlaybackStatus,
    pub position_secs: f64,
    /// `None` until the channel reports a finite duration.
    pub duration_secs: Option<f64>,
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            target: None,
            status: PlaybackStatus::Idle,
            position_secs: 0.0,
            duration_secs: None,
            volume: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_wraparound() {
        for id in 1..=CHAPTER_COUNT {
            let chapter = ChapterId::new(id).unwrap();
            assert_eq!(chapter.next().get(), id % CHAPTER_COUNT + 1);
            assert_eq!(chapter.next().previous(), chapter);
        }
        assert_eq!(ChapterId::LAST.next(), ChapterId::FIRST);
        assert_eq!(ChapterId::FIRST.previous(), ChapterId::LAST);
    }

    #[test]
    fn test_chapter_bounds() {
        assert!(matches!(
            ChapterId::new(0),
            Err(PlaybackError::InvalidChapter(0))
        ));
        assert!(ChapterId::new(115).is_err());
        assert!(serde_json::from_str::<ChapterId>("115").is_err());
        assert_eq!(serde_json::from_str::<ChapterId>("7").unwrap().get(), 7);
    }

    #[test]
    fn test_verse_key_parsing() {
        let key: VerseKey = "2_5".parse().unwrap();
        assert_eq!(key.chapter().get(), 2);
        assert_eq!(key.verse(), 5);

        for bad in ["", "2", "2_", "_5", "0_1", "2_0", "115_1", "a_b", "2-5"] {
            assert!(bad.parse::<VerseKey>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_verse_key_next_stays_in_chapter() {
        let key = VerseKey::new(2, 5).unwrap();
        assert_eq!(key.next_within(286).unwrap().to_string(), "2_6");

        let last = VerseKey::new(1, 7).unwrap();
        assert!(last.next_within(7).is_none());
    }

    #[test]
    fn test_verse_key_serde_as_string() {
        let key = VerseKey::new(36, 1).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"36_1\"");
        let back: VerseKey = serde_json::from_str("\"36_1\"").unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_target_display() {
        let chapter = PlaybackTarget::Chapter(ChapterId::new(18).unwrap());
        assert_eq!(chapter.to_string(), "chapter 18");
        let verse = PlaybackTarget::Verse(VerseKey::new(18, 10).unwrap());
        assert_eq!(verse.to_string(), "verse 18_10");
        assert_eq!(verse.chapter().get(), 18);
    }
}
