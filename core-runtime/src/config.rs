//! # Core Configuration Module
//!
//! Collects the host bridges the playback core needs before it can start.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every injected capability. Validation is fail-fast: a missing
//! required bridge is reported at build time with an actionable message,
//! never later as a playback failure.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - preferences and recently-played history
//! - `ContentResolver` **or** `HttpClient` - audio URL resolution (a resolver
//!   is built over the HTTP client when none is injected)
//! - `AudioOutput` - the single output channel used for whole chapters
//! - `AudioOutputFactory` - one fresh output channel per verse widget
//!
//! ## Optional Dependencies
//!
//! - `MediaControlSurface` - OS lock-screen / hardware-key integration
//! - `Clock` - time source for history timestamps (defaults to `SystemClock`)
//! - `LoggerSink` - host log forwarding
//!
//! When the `desktop-shims` feature is enabled, `SettingsStore` and
//! `HttpClient` fall back to the `bridge-desktop` adapters if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(MySettingsStore))
//!     .http_client(Arc::new(MyHttpClient))
//!     .chapter_output(Arc::new(MyAudioElement::new()))
//!     .verse_output_factory(Arc::new(MyAudioElementFactory))
//!     .media_surface(Arc::new(MyMediaSession))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    AudioOutput, AudioOutputFactory, Clock, ContentResolver, HttpClient, LoggerSink,
    MediaControlSurface, SettingsStore, SystemClock,
};
use std::fmt;
use std::sync::Arc;

/// Base URL of the public chapter metadata API.
pub const DEFAULT_API_BASE_URL: &str = "https://quranapi.pages.dev/api";

/// Core configuration for the recitation playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Persistent key-value settings (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Audio URL resolution; `None` means "build one over `http_client`"
    pub content_resolver: Option<Arc<dyn ContentResolver>>,

    /// HTTP transport for the default resolver
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Output channel owned by the chapter coordinator (required)
    pub chapter_output: Arc<dyn AudioOutput>,

    /// Creates one output channel per verse widget (required)
    pub verse_output_factory: Arc<dyn AudioOutputFactory>,

    /// OS media controls (optional)
    pub media_surface: Option<Arc<dyn MediaControlSurface>>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Host log sink (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Base URL used by the default HTTP resolver
    pub api_base_url: String,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field(
                "content_resolver",
                &self
                    .content_resolver
                    .as_ref()
                    .map(|_| "ContentResolver { ... }"),
            )
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("chapter_output", &"AudioOutput { ... }")
            .field("verse_output_factory", &"AudioOutputFactory { ... }")
            .field(
                "media_surface",
                &self
                    .media_surface
                    .as_ref()
                    .map(|_| "MediaControlSurface { ... }"),
            )
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - some form of content resolution is available
    /// - the API base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.content_resolver.is_none() && self.http_client.is_none() {
            return Err(content_resolution_missing_error());
        }

        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(Error::Config(format!(
                "API base URL must be absolute http(s), got '{}'",
                base
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::capability_missing(
        "SettingsStore",
        "SettingsStore implementation is required for preferences and history. \
         Desktop: enable the 'desktop-shims' feature to use the default SqliteSettingsStore. \
         Web: inject a localStorage-based settings store.",
    )
}

fn content_resolution_missing_error() -> Error {
    Error::capability_missing(
        "ContentResolver",
        "Either a ContentResolver or an HttpClient is required to resolve audio URLs. \
         Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient.",
    )
}

fn chapter_output_missing_error() -> Error {
    Error::capability_missing(
        "AudioOutput",
        "An AudioOutput is required for chapter playback. \
         Web: wrap a single HTMLAudioElement. Native: wrap the platform player.",
    )
}

fn verse_output_factory_missing_error() -> Error {
    Error::capability_missing(
        "AudioOutputFactory",
        "An AudioOutputFactory is required so each verse widget gets its own output channel.",
    )
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store() -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use core_async::runtime::{block_on, Handle};
    use std::thread;

    let path = SqliteSettingsStore::default_path();

    let init_store = move || -> Result<SqliteSettingsStore> {
        block_on(SqliteSettingsStore::new(path))
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create runtime for default settings store: {}",
                    e
                ))
            })?
            .map_err(Error::from)
    };

    // block_on cannot nest inside a running runtime
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(init_store).join().map_err(|_| {
            Error::Internal("Thread panicked while creating default SettingsStore".to_string())
        })??,
        Err(_) => init_store()?,
    };

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store() -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Option<Arc<dyn HttpClient>> {
    Some(Arc::new(bridge_desktop::ReqwestHttpClient::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Option<Arc<dyn HttpClient>> {
    None
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) once every required bridge has
/// been supplied.
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    content_resolver: Option<Arc<dyn ContentResolver>>,
    http_client: Option<Arc<dyn HttpClient>>,
    chapter_output: Option<Arc<dyn AudioOutput>>,
    verse_output_factory: Option<Arc<dyn AudioOutputFactory>>,
    media_surface: Option<Arc<dyn MediaControlSurface>>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    api_base_url: Option<String>,
}

impl CoreConfigBuilder {
    /// Sets the settings store implementation (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets a custom content resolver.
    ///
    /// Takes precedence over [`http_client`](Self::http_client) for
    /// resolution.
    pub fn content_resolver(mut self, resolver: Arc<dyn ContentResolver>) -> Self {
        self.content_resolver = Some(resolver);
        self
    }

    /// Sets the HTTP client used by the default resolver.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the chapter output channel (required).
    pub fn chapter_output(mut self, output: Arc<dyn AudioOutput>) -> Self {
        self.chapter_output = Some(output);
        self
    }

    /// Sets the per-verse output factory (required).
    pub fn verse_output_factory(mut self, factory: Arc<dyn AudioOutputFactory>) -> Self {
        self.verse_output_factory = Some(factory);
        self
    }

    pub fn media_surface(mut self, surface: Arc<dyn MediaControlSurface>) -> Self {
        self.media_surface = Some(surface);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Overrides [`DEFAULT_API_BASE_URL`].
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - a required bridge is missing and no desktop default applies
    /// - the API base URL is malformed
    pub fn build(self) -> Result<CoreConfig> {
        let chapter_output = self
            .chapter_output
            .ok_or_else(chapter_output_missing_error)?;

        let verse_output_factory = self
            .verse_output_factory
            .ok_or_else(verse_output_factory_missing_error)?;

        let http_client = match (&self.content_resolver, self.http_client) {
            (_, Some(client)) => Some(client),
            (Some(_), None) => None,
            (None, None) => provide_default_http_client(),
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store()?,
        };

        let config = CoreConfig {
            settings_store,
            content_resolver: self.content_resolver,
            http_client,
            chapter_output,
            verse_output_factory,
            media_surface: self.media_surface,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
            api_base_url: self
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        };

        config.validate()?;

        Ok(config)
    }
}
