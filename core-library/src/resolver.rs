//! HTTP-backed content resolver.
//!
//! Chapter audio comes from the metadata API's per-chapter audio document,
//! falling back to a deterministic mirror URL. Verse audio URLs are computed
//! locally; their availability is probed with `HEAD`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, ChapterInfo, ContentResolver, HttpClient, HttpRequest,
    RetryPolicy,
};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::catalog;
use crate::error::{LibraryError, Result};

/// Reciter entry used from the chapter audio document.
const RECITER_KEY: &str = "1";

const VERSE_AUDIO_BASE_URL: &str = "https://the-quran-project.github.io/Quran-Audio/Data/1";
const CHAPTER_AUDIO_FALLBACK_BASE_URL: &str =
    "https://github.com/The-Quran-Project/Quran-Audio-Chapters/raw/refs/heads/main/Data/1";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiChapter {
    surah_name: String,
    surah_name_arabic: String,
    surah_name_translation: String,
    total_ayah: u16,
}

/// Deterministic chapter audio URL used when the API has nothing usable.
pub fn fallback_chapter_audio_url(chapter: u16) -> String {
    format!("{}/{:03}.mp3", CHAPTER_AUDIO_FALLBACK_BASE_URL, chapter)
}

/// Verse audio URL for the default reciter.
pub fn verse_audio_url(chapter: u16, verse: u16) -> String {
    format!("{}/{}_{}.mp3", VERSE_AUDIO_BASE_URL, chapter, verse)
}

/// [`ContentResolver`] over the [`HttpClient`] bridge.
///
/// Resolved chapter URLs and chapter info are memoized for the lifetime of
/// the resolver. Availability probes are never cached.
pub struct HttpContentResolver {
    http: Arc<dyn HttpClient>,
    api_base_url: String,
    retry_policy: RetryPolicy,
    chapter_urls: Mutex<HashMap<u16, String>>,
    chapter_infos: Mutex<HashMap<u16, ChapterInfo>>,
}

impl HttpContentResolver {
    pub fn new(http: Arc<dyn HttpClient>, api_base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
            chapter_urls: Mutex::new(HashMap::new()),
            chapter_infos: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the retry policy used for metadata requests.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self
            .http
            .execute_with_retry(HttpRequest::get(url.clone()), self.retry_policy.clone())
            .await?;

        if !response.is_success() {
            return Err(LibraryError::Status {
                url,
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| LibraryError::Parse(e.to_string()))
    }

    async fn fetch_chapter_audio_url(&self, chapter: u16) -> Result<Option<String>> {
        let url = format!("{}/audio/{}.json", self.api_base_url, chapter);
        let entries: HashMap<String, AudioEntry> = self.get_json(url).await?;

        Ok(entries.get(RECITER_KEY).and_then(|entry| {
            entry
                .original_url
                .clone()
                .or_else(|| entry.url.clone())
                .filter(|url| !url.trim().is_empty())
        }))
    }

    async fn fetch_chapter_info(&self, chapter: u16) -> Result<ChapterInfo> {
        let url = format!("{}/{}.json", self.api_base_url, chapter);
        let api: ApiChapter = self.get_json(url).await?;

        Ok(ChapterInfo {
            id: chapter,
            name: api.surah_name,
            name_arabic: api.surah_name_arabic,
            translation: api.surah_name_translation,
            verse_count: api.total_ayah,
        })
    }
}

#[async_trait]
impl ContentResolver for HttpContentResolver {
    #[instrument(skip(self))]
    async fn chapter_audio_url(&self, chapter: u16) -> BridgeResult<Option<String>> {
        catalog::validate_chapter(chapter)?;

        if let Some(url) = self.chapter_urls.lock().get(&chapter) {
            return Ok(Some(url.clone()));
        }

        let url = match self.fetch_chapter_audio_url(chapter).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!(chapter, "Audio document has no usable entry, using fallback");
                fallback_chapter_audio_url(chapter)
            }
            Err(e) => {
                warn!(chapter, error = %e, "Chapter audio lookup failed, using fallback");
                fallback_chapter_audio_url(chapter)
            }
        };

        self.chapter_urls.lock().insert(chapter, url.clone());
        Ok(Some(url))
    }

    async fn verse_audio_url(&self, chapter: u16, verse: u16) -> BridgeResult<Option<String>> {
        catalog::validate_verse(chapter, verse)?;
        Ok(Some(verse_audio_url(chapter, verse)))
    }

    #[instrument(skip(self))]
    async fn verse_audio_available(&self, chapter: u16, verse: u16) -> BridgeResult<bool> {
        if catalog::validate_verse(chapter, verse).is_err() {
            return Ok(false);
        }

        let request = HttpRequest::head(verse_audio_url(chapter, verse)).timeout(PROBE_TIMEOUT);
        match self
            .http
            .execute_with_retry(request, RetryPolicy::none())
            .await
        {
            Ok(response) => Ok(response.is_success()),
            Err(e) => {
                debug!(chapter, verse, error = %e, "Availability probe failed");
                Ok(false)
            }
        }
    }

    async fn chapter_ids(&self) -> BridgeResult<Vec<u16>> {
        Ok(catalog::chapter_ids())
    }

    async fn chapter_info(&self, chapter: u16) -> BridgeResult<Option<ChapterInfo>> {
        if catalog::validate_chapter(chapter).is_err() {
            return Ok(None);
        }

        if let Some(info) = self.chapter_infos.lock().get(&chapter) {
            return Ok(Some(info.clone()));
        }

        match self.fetch_chapter_info(chapter).await {
            Ok(info) => {
                self.chapter_infos.lock().insert(chapter, info.clone());
                Ok(Some(info))
            }
            Err(e) => {
                warn!(chapter, error = %e, "Chapter info lookup failed, using catalog");
                Ok(catalog::chapter_info(chapter))
            }
        }
    }
}
