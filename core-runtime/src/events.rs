//! # Event Bus System
//!
//! Typed notifications from the playback core to the host UI, carried over a
//! `tokio::sync::broadcast` channel.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps one enum per domain
//!   ([`ChapterEvent`], [`VerseEvent`], [`PreferencesEvent`])
//! - **EventBus**: cloneable publisher, every clone feeds the same channel
//! - **EventStream**: receiver wrapper with an optional filter
//!
//! Coordinators publish failures here; this is how the host renders the
//! non-blocking inline error indicator without polling coordinator state.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{ChapterEvent, CoreEvent, EventBus};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Chapter(ChapterEvent::Loading { chapter: 1 })).ok();
//! assert_eq!(
//!     rx.try_recv().unwrap(),
//!     CoreEvent::Chapter(ChapterEvent::Loading { chapter: 1 })
//! );
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep reading.
//! - **`RecvError::Closed`**: every publisher is gone; treat as shutdown.
//!
//! `emit` fails only when nobody is subscribed, which publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Whole-chapter playback
    Chapter(ChapterEvent),
    /// Per-verse playback
    Verse(VerseEvent),
    /// User preferences
    Preferences(PreferencesEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Chapter(e) => e.description(),
            CoreEvent::Verse(e) => e.description(),
            CoreEvent::Preferences(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Chapter(ChapterEvent::Failed { .. })
            | CoreEvent::Verse(VerseEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Verse(VerseEvent::Unavailable { .. }) => EventSeverity::Warning,
            CoreEvent::Chapter(ChapterEvent::Started { .. })
            | CoreEvent::Chapter(ChapterEvent::AutoplayScheduled { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Chapter Events
// ============================================================================

/// Events from the chapter playback coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ChapterEvent {
    /// Resolving and buffering a chapter.
    Loading { chapter: u16 },
    /// Audio is running.
    Started { chapter: u16 },
    /// Playback paused.
    Paused {
        chapter: u16,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// The chapter played to its natural end.
    Ended { chapter: u16 },
    /// The next chapter will start after `delay_ms` unless cancelled.
    AutoplayScheduled { from: u16, to: u16, delay_ms: u64 },
    /// A scheduled continuation was dropped (manual navigation, stop, or
    /// autoplay switched off before it fired).
    AutoplayCancelled { chapter: u16 },
    /// Resolution or load failure. Never retried automatically.
    Failed { chapter: u16, message: String },
    /// Playback stopped and reset to idle.
    Stopped { chapter: Option<u16> },
}

impl ChapterEvent {
    fn description(&self) -> &str {
        match self {
            ChapterEvent::Loading { .. } => "Chapter loading",
            ChapterEvent::Started { .. } => "Chapter playback started",
            ChapterEvent::Paused { .. } => "Chapter playback paused",
            ChapterEvent::Ended { .. } => "Chapter ended",
            ChapterEvent::AutoplayScheduled { .. } => "Next chapter scheduled",
            ChapterEvent::AutoplayCancelled { .. } => "Scheduled chapter cancelled",
            ChapterEvent::Failed { .. } => "Chapter playback failed",
            ChapterEvent::Stopped { .. } => "Chapter playback stopped",
        }
    }
}

// ============================================================================
// Verse Events
// ============================================================================

/// Events from verse widgets and the intent broker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum VerseEvent {
    /// The intended verse changed (`None` means no verse should play).
    Intended { verse_key: Option<String> },
    /// A verse started playing.
    Started { verse_key: String },
    /// A verse stopped (pause + reset) without ending.
    Stopped { verse_key: String },
    /// A verse played to its natural end.
    Ended { verse_key: String },
    /// The availability probe reported no recording.
    Unavailable { verse_key: String },
    /// Resolution or load failure for one verse.
    Failed { verse_key: String, message: String },
}

impl VerseEvent {
    fn description(&self) -> &str {
        match self {
            VerseEvent::Intended { .. } => "Intended verse changed",
            VerseEvent::Started { .. } => "Verse playback started",
            VerseEvent::Stopped { .. } => "Verse playback stopped",
            VerseEvent::Ended { .. } => "Verse ended",
            VerseEvent::Unavailable { .. } => "Verse audio unavailable",
            VerseEvent::Failed { .. } => "Verse playback failed",
        }
    }
}

// ============================================================================
// Preference Events
// ============================================================================

/// Events about persisted user preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PreferencesEvent {
    /// Preferences were written.
    Changed {
        global_autoplay: bool,
        page_verse_autoplay: bool,
        verse_audio_enabled: bool,
        default_volume_percent: u8,
    },
}

impl PreferencesEvent {
    fn description(&self) -> &str {
        match self {
            PreferencesEvent::Changed { .. } => "Preferences changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Clones share one channel. Slow subscribers see `RecvError::Lagged`
/// without slowing publishers down.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event, returning how many subscribers received it.
    ///
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let verses_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Verse(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
