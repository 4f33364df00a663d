//! # Playback-Intent Broker
//!
//! Holds the single `intended_verse_key` shared by every verse widget of the
//! process. A widget plays only while it is the intended key; claiming a new
//! key makes every other widget stop itself. Rapid successive claims may be
//! coalesced for observers, but the latest value always wins.

use std::sync::Arc;

use core_async::sync::watch;
use core_runtime::events::{CoreEvent, EventBus, VerseEvent};
use tracing::debug;

use crate::types::VerseKey;

/// Process-wide exclusivity for verse playback.
///
/// Cheap to clone; clones share the same slot.
#[derive(Clone)]
pub struct PlaybackIntentBroker {
    slot: Arc<watch::Sender<Option<VerseKey>>>,
    events: Option<EventBus>,
}

impl PlaybackIntentBroker {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            events: None,
        }
    }

    /// Mirror every change to `events` as [`VerseEvent::Intended`].
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// The verse that should be playing, if any.
    pub fn intended(&self) -> Option<VerseKey> {
        *self.slot.borrow()
    }

    pub fn is_intended(&self, key: &VerseKey) -> bool {
        self.slot.borrow().as_ref() == Some(key)
    }

    /// Make `key` the intended verse, displacing any other.
    pub fn claim(&self, key: VerseKey) {
        let previous = self.slot.send_replace(Some(key));
        if previous != Some(key) {
            debug!(verse_key = %key, "Verse claimed playback");
            self.publish(Some(key));
        }
    }

    /// Clear the slot if it still holds `key`.
    ///
    /// Returns `false` when another verse has claimed playback since.
    pub fn release(&self, key: &VerseKey) -> bool {
        let released = self.slot.send_if_modified(|current| {
            if current.as_ref() == Some(key) {
                *current = None;
                true
            } else {
                false
            }
        });
        if released {
            debug!(verse_key = %key, "Verse released playback");
            self.publish(None);
        }
        released
    }

    /// Clear the slot unconditionally.
    pub fn clear(&self) {
        if self.slot.send_replace(None).is_some() {
            self.publish(None);
        }
    }

    /// Observe changes. The current value is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<VerseKey>> {
        self.slot.subscribe()
    }

    fn publish(&self, key: Option<VerseKey>) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Verse(VerseEvent::Intended {
                verse_key: key.map(|k| k.to_string()),
            }));
        }
    }
}

impl Default for PlaybackIntentBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackIntentBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackIntentBroker")
            .field("intended", &self.intended())
            .finish()
    }
}
