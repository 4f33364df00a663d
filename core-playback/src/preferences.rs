//! # User Preferences
//!
//! Autoplay flags, verse-audio visibility and the default volume, persisted
//! as one JSON document under the `preferences` settings key.
//!
//! Autoplay decisions always go through [`PreferencesService::get`], which
//! reads the store again instead of trusting a value captured earlier. The
//! watch channel exists only so running widgets can react to a change
//! (for example, stop when verse autoplay is switched off).

use std::sync::Arc;

use bridge_traits::SettingsStore;
use core_async::sync::{watch, Mutex as WriteLock};
use core_runtime::events::{CoreEvent, EventBus, PreferencesEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};

/// Settings key of the preferences document.
pub const PREFERENCES_KEY: &str = "preferences";

/// Persisted user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Continue to the next chapter (and verse) when one ends.
    pub global_autoplay: bool,
    /// Verse autoplay switched on from the chapter page.
    pub page_scoped_verse_autoplay: bool,
    /// Show verse play buttons at all.
    pub verse_audio_enabled: bool,
    /// Initial volume, 0..=100.
    pub default_volume_percent: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            global_autoplay: false,
            page_scoped_verse_autoplay: false,
            verse_audio_enabled: true,
            default_volume_percent: 70,
        }
    }
}

impl Preferences {
    /// Verse hand-off runs when either autoplay flag is set.
    pub fn verse_autoplay_enabled(&self) -> bool {
        verse_autoplay_eligible(self.global_autoplay, self.page_scoped_verse_autoplay)
    }

    pub fn chapter_autoplay_enabled(&self) -> bool {
        self.global_autoplay
    }

    /// Default volume as a gain in `[0, 1]`.
    pub fn volume(&self) -> f32 {
        f32::from(self.default_volume_percent.min(100)) / 100.0
    }
}

/// OR of the global and page-scoped autoplay flags.
pub fn verse_autoplay_eligible(global_autoplay: bool, page_scoped_verse_autoplay: bool) -> bool {
    global_autoplay || page_scoped_verse_autoplay
}

/// Partial update merged into the stored preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub global_autoplay: Option<bool>,
    pub page_scoped_verse_autoplay: Option<bool>,
    pub verse_audio_enabled: Option<bool>,
    pub default_volume_percent: Option<u8>,
}

impl PreferencesPatch {
    pub fn global_autoplay(mut self, enabled: bool) -> Self {
        self.global_autoplay = Some(enabled);
        self
    }

    pub fn page_scoped_verse_autoplay(mut self, enabled: bool) -> Self {
        self.page_scoped_verse_autoplay = Some(enabled);
        self
    }

    pub fn verse_audio_enabled(mut self, enabled: bool) -> Self {
        self.verse_audio_enabled = Some(enabled);
        self
    }

    pub fn default_volume_percent(mut self, percent: u8) -> Self {
        self.default_volume_percent = Some(percent);
        self
    }

    /// Apply on top of `base`. Volume is clamped to 100.
    pub fn apply(&self, base: Preferences) -> Preferences {
        Preferences {
            global_autoplay: self.global_autoplay.unwrap_or(base.global_autoplay),
            page_scoped_verse_autoplay: self
                .page_scoped_verse_autoplay
                .unwrap_or(base.page_scoped_verse_autoplay),
            verse_audio_enabled: self.verse_audio_enabled.unwrap_or(base.verse_audio_enabled),
            default_volume_percent: self
                .default_volume_percent
                .unwrap_or(base.default_volume_percent)
                .min(100),
        }
    }
}

/// Reads and writes preferences through the settings bridge.
pub struct PreferencesService {
    store: Arc<dyn SettingsStore>,
    changes: watch::Sender<Preferences>,
    events: Option<EventBus>,
    write_lock: WriteLock<()>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        let (changes, _) = watch::channel(Preferences::default());
        Self {
            store,
            changes,
            events: None,
            write_lock: WriteLock::new(()),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Read the stored preferences.
    ///
    /// Missing, unreadable or malformed documents yield the defaults.
    pub async fn get(&self) -> Preferences {
        match self.load().await {
            Ok(prefs) => {
                // Keep observers in step with writes made behind our back
                self.changes.send_if_modified(|current| {
                    if *current != prefs {
                        *current = prefs;
                        true
                    } else {
                        false
                    }
                });
                prefs
            }
            Err(e) => {
                warn!(error = %e, "Falling back to default preferences");
                Preferences::default()
            }
        }
    }

    async fn load(&self) -> Result<Preferences> {
        let Some(raw) = self.store.get_string(PREFERENCES_KEY).await? else {
            return Ok(Preferences::default());
        };
        let mut prefs: Preferences = serde_json::from_str(&raw)
            .map_err(|e| PlaybackError::Preferences(format!("malformed preferences: {e}")))?;
        prefs.default_volume_percent = prefs.default_volume_percent.min(100);
        Ok(prefs)
    }

    /// Merge `patch` into the stored preferences, persist and notify.
    pub async fn set(&self, patch: PreferencesPatch) -> Result<Preferences> {
        let _guard = self.write_lock.lock().await;

        let current = self.get().await;
        let updated = patch.apply(current);

        let raw = serde_json::to_string(&updated)
            .map_err(|e| PlaybackError::Preferences(e.to_string()))?;
        self.store.set_string(PREFERENCES_KEY, &raw).await?;

        debug!(
            global_autoplay = updated.global_autoplay,
            page_scoped_verse_autoplay = updated.page_scoped_verse_autoplay,
            verse_audio_enabled = updated.verse_audio_enabled,
            default_volume_percent = updated.default_volume_percent,
            "Preferences updated"
        );

        self.changes.send_replace(updated);
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Preferences(PreferencesEvent::Changed {
                global_autoplay: updated.global_autoplay,
                page_verse_autoplay: updated.page_scoped_verse_autoplay,
                verse_audio_enabled: updated.verse_audio_enabled,
                default_volume_percent: updated.default_volume_percent,
            }));
        }

        Ok(updated)
    }

    /// Last value seen by this service. Not a substitute for [`get`](Self::get).
    pub fn cached(&self) -> Preferences {
        *self.changes.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.changes.subscribe()
    }
}
