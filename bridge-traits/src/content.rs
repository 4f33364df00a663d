//! Content and audio resolution bridge.
//!
//! Text retrieval and audio URL resolution live outside the playback core.
//! The core only needs the handful of lookups below. Implementations may fail
//! or return empty values; callers treat both as "resource unavailable".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Display information for a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub id: u16,
    /// Transliterated name, e.g. "Al-Fatiha".
    pub name: String,
    /// Name in Arabic script.
    pub name_arabic: String,
    /// English meaning of the name.
    pub translation: String,
    pub verse_count: u16,
}

/// Resolves chapter and verse identifiers to audio resources.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::content::ContentResolver;
///
/// async fn first_url(resolver: &dyn ContentResolver) -> Option<String> {
///     resolver.chapter_audio_url(1).await.ok().flatten()
/// }
/// ```
#[async_trait]
pub trait ContentResolver: PlatformSendSync {
    /// Audio URL for a whole chapter.
    async fn chapter_audio_url(&self, chapter: u16) -> Result<Option<String>>;

    /// Audio URL for one verse.
    async fn verse_audio_url(&self, chapter: u16, verse: u16) -> Result<Option<String>>;

    /// Lightweight existence probe for a verse recording.
    async fn verse_audio_available(&self, chapter: u16, verse: u16) -> Result<bool>;

    /// All chapter ids in reading order.
    async fn chapter_ids(&self) -> Result<Vec<u16>>;

    /// Display information for one chapter.
    async fn chapter_info(&self, chapter: u16) -> Result<Option<ChapterInfo>>;
}
