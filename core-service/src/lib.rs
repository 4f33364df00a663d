//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (audio output
//! channels, media controls, settings, HTTP) into the playback core. Desktop
//! hosts typically enable the `desktop-shims` feature, which lets
//! [`CoreConfig`] fall back to the `bridge-desktop` adapters for settings and
//! HTTP.
//!
//! ## Usage
//!
//! ```no_run
//! use core_service::{CoreConfig, CoreService};
//! # async fn example(config: CoreConfig) -> core_service::Result<()> {
//! let core = CoreService::new(config)?;
//! core.chapters().play_chapter(36).await?;
//!
//! let view = core.open_chapter_view(36)?;
//! view.play_verse(1).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};

use std::sync::Arc;

use bridge_traits::{AudioOutputFactory, ContentResolver};
use core_async::sync::broadcast;
use core_library::{catalog, HttpContentResolver, LibraryError};
use core_playback::{
    ChapterCoordinatorDeps, ChapterPlaybackCoordinator, PlaybackConfig, PlaybackEngine,
    PlaybackIntentBroker, Preferences, PreferencesPatch, PreferencesService, RecentlyPlayed,
    RecentlyPlayedHistory, VerseDeps, VersePlaybackCoordinator,
};
use core_runtime::events::{CoreEvent, EventBus};
use core_runtime::logging::{init_logging, LoggingConfig};
use tracing::info;

/// Capacity of the process-wide event bus.
const EVENT_BUS_CAPACITY: usize = 256;

/// Primary façade exposed to host applications.
///
/// Owns the chapter coordinator, the intent broker shared by every verse
/// widget, and the preference and history services. Cheap to clone.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    playback: PlaybackConfig,
    events: EventBus,
    broker: PlaybackIntentBroker,
    resolver: Arc<dyn ContentResolver>,
    preferences: Arc<PreferencesService>,
    history: Arc<RecentlyPlayedHistory>,
    verse_outputs: Arc<dyn AudioOutputFactory>,
    chapters: Arc<ChapterPlaybackCoordinator>,
}

impl CoreService {
    /// Build the service with the default playback timings.
    ///
    /// Must be called inside a tokio runtime; the coordinators spawn their
    /// event tasks immediately.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_playback_config(config, PlaybackConfig::default())
    }

    pub fn with_playback_config(config: CoreConfig, playback: PlaybackConfig) -> Result<Self> {
        playback
            .validate()
            .map_err(|e| CoreError::InitializationFailed(format!("playback config: {e}")))?;

        let resolver = resolve_content(&config)?;
        let events = EventBus::new(EVENT_BUS_CAPACITY);
        let broker = PlaybackIntentBroker::new().with_events(events.clone());
        let preferences = Arc::new(
            PreferencesService::new(config.settings_store.clone()).with_events(events.clone()),
        );
        let history = Arc::new(RecentlyPlayedHistory::new(
            config.settings_store.clone(),
            config.clock.clone(),
            playback.recent_history_limit,
        ));

        let engine = Arc::new(PlaybackEngine::with_event_capacity(
            config.chapter_output.clone(),
            "chapter",
            playback.event_buffer_size,
        ));
        let chapters = Arc::new(ChapterPlaybackCoordinator::new(ChapterCoordinatorDeps {
            engine,
            resolver: resolver.clone(),
            preferences: preferences.clone(),
            history: Some(history.clone()),
            surface: config.media_surface.clone(),
            broker: Some(broker.clone()),
            events: events.clone(),
            config: playback.clone(),
        }));

        info!(
            media_surface = config.media_surface.is_some(),
            api_base_url = %config.api_base_url,
            "Core service initialized"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                playback,
                events,
                broker,
                resolver,
                preferences,
                history,
                verse_outputs: config.verse_output_factory.clone(),
                chapters,
            }),
        })
    }

    /// The process-wide chapter coordinator.
    pub fn chapters(&self) -> &Arc<ChapterPlaybackCoordinator> {
        &self.inner.chapters
    }

    /// Mount one verse widget per verse of `chapter`.
    ///
    /// The verse count comes from the static catalog. Dropping the returned
    /// coordinator stops its widgets and releases any claim they hold.
    pub fn open_chapter_view(&self, chapter: u16) -> Result<VersePlaybackCoordinator> {
        let total_verses =
            catalog::verse_count(chapter).ok_or(LibraryError::InvalidChapter(chapter))?;
        self.open_chapter_view_with(chapter, total_verses)
    }

    /// Like [`open_chapter_view`](Self::open_chapter_view) with an explicit
    /// verse count.
    pub fn open_chapter_view_with(
        &self,
        chapter: u16,
        total_verses: u16,
    ) -> Result<VersePlaybackCoordinator> {
        let mut view = VersePlaybackCoordinator::new(chapter, total_verses, self.verse_deps())?;
        view.mount_all()?;
        Ok(view)
    }

    fn verse_deps(&self) -> VerseDeps {
        VerseDeps {
            broker: self.inner.broker.clone(),
            resolver: self.inner.resolver.clone(),
            preferences: self.inner.preferences.clone(),
            output_factory: self.inner.verse_outputs.clone(),
            events: self.inner.events.clone(),
            config: self.inner.playback.clone(),
        }
    }

    /// Current preferences, read from the settings store.
    pub async fn preferences(&self) -> Preferences {
        self.inner.preferences.get().await
    }

    /// Merge `patch` into the stored preferences.
    ///
    /// Playing verses stop at once when this switches verse autoplay off.
    pub async fn set_preferences(&self, patch: PreferencesPatch) -> Result<Preferences> {
        Ok(self.inner.preferences.set(patch).await?)
    }

    pub async fn recently_played(&self) -> Vec<RecentlyPlayed> {
        self.inner.history.list().await
    }

    pub async fn clear_recently_played(&self) -> Result<()> {
        Ok(self.inner.history.clear().await?)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    pub fn broker(&self) -> &PlaybackIntentBroker {
        &self.inner.broker
    }

    pub fn resolver(&self) -> Arc<dyn ContentResolver> {
        Arc::clone(&self.inner.resolver)
    }

    /// Stop chapter playback and release any verse claim.
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.broker.clear();
        self.inner.chapters.stop().await?;
        info!("Core service shut down");
        Ok(())
    }
}

fn resolve_content(config: &CoreConfig) -> Result<Arc<dyn ContentResolver>> {
    if let Some(resolver) = &config.content_resolver {
        return Ok(resolver.clone());
    }
    match &config.http_client {
        Some(http) => Ok(Arc::new(HttpContentResolver::new(
            http.clone(),
            config.api_base_url.clone(),
        ))),
        None => Err(CoreError::CapabilityMissing {
            capability: "ContentResolver".to_string(),
            message: "Provide a ContentResolver or an HttpClient".to_string(),
        }),
    }
}

/// Install the global tracing subscriber, forwarding to the configured
/// logger sink when one is set.
pub fn init_logging_for(config: &CoreConfig) -> Result<()> {
    let mut logging = LoggingConfig::default();
    if let Some(sink) = &config.logger_sink {
        logging = logging.with_logger_sink(sink.clone());
    }
    init_logging(logging)?;
    Ok(())
}
