//! Recently played chapters, newest first.

use std::sync::Arc;

use bridge_traits::{Clock, SettingsStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PlaybackError, Result};
use crate::types::ChapterId;

/// Settings key of the history document.
pub const RECENTLY_PLAYED_KEY: &str = "recently_played";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyPlayed {
    pub chapter: ChapterId,
    pub played_at: DateTime<Utc>,
}

/// Persisted, deduplicated list of chapters that started playing.
pub struct RecentlyPlayedHistory {
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl RecentlyPlayedHistory {
    pub fn new(store: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>, limit: usize) -> Self {
        Self {
            store,
            clock,
            limit: limit.max(1),
        }
    }

    /// Move `chapter` to the front, stamped with the current time.
    pub async fn record(&self, chapter: ChapterId) -> Result<()> {
        let mut entries = self.list().await;
        entries.retain(|entry| entry.chapter != chapter);
        entries.insert(
            0,
            RecentlyPlayed {
                chapter,
                played_at: self.clock.now(),
            },
        );
        entries.truncate(self.limit);

        let raw = serde_json::to_string(&entries)
            .map_err(|e| PlaybackError::Internal(format!("history encode: {e}")))?;
        self.store.set_string(RECENTLY_PLAYED_KEY, &raw).await?;
        Ok(())
    }

    /// Stored entries; unreadable history counts as empty.
    pub async fn list(&self) -> Vec<RecentlyPlayed> {
        let raw = match self.store.get_string(RECENTLY_PLAYED_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read recently played");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<RecentlyPlayed>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.limit);
                entries
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed recently played list");
                Vec::new()
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.delete(RECENTLY_PLAYED_KEY).await?;
        Ok(())
    }
}
