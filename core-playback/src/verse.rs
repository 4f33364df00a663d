//! # Verse Playback
//!
//! One [`VerseWidget`] per rendered verse, each with its own engine and
//! output channel, and a [`VersePlaybackCoordinator`] that mounts the
//! widgets of one chapter view.
//!
//! ## Exclusivity
//!
//! Widgets never talk to each other. A widget that starts playing claims the
//! [`PlaybackIntentBroker`]; every widget watches the broker and stops itself
//! (pause + rewind) as soon as its key is no longer the intended one. A
//! widget that becomes the intended key while idle loads and plays itself,
//! which is how verse-to-verse autoplay hands off.
//!
//! ## Autoplay
//!
//! When a verse ends, preferences are read again. If either autoplay flag is
//! set and the chapter has a next verse, the next key is claimed after a
//! short delay; the delay re-checks preferences and intent before acting.
//! Otherwise the claim is released. Verse autoplay never crosses into the
//! next chapter.
//!
//! Switching autoplay off (or hiding verse audio) while a verse is playing
//! stops it at once instead of letting it finish.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bridge_traits::{AudioOutput, AudioOutputFactory, ContentResolver};
use core_async::runtime::Handle;
use core_async::sync::{broadcast, watch};
use core_async::task::{self, JoinHandle};
use core_async::time::DelayedTask;
use core_runtime::events::{CoreEvent, EventBus, VerseEvent};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::broker::PlaybackIntentBroker;
use crate::config::PlaybackConfig;
use crate::engine::{EngineEvent, PlayOutcome, PlaybackEngine};
use crate::error::{PlaybackError, Result};
use crate::preferences::{Preferences, PreferencesService};
use crate::types::{ChapterId, PlaybackStatus, PlaybackTarget, VerseKey};

/// Shared collaborators of every verse widget.
#[derive(Clone)]
pub struct VerseDeps {
    pub broker: PlaybackIntentBroker,
    pub resolver: Arc<dyn ContentResolver>,
    pub preferences: Arc<PreferencesService>,
    pub output_factory: Arc<dyn AudioOutputFactory>,
    pub events: EventBus,
    pub config: PlaybackConfig,
}

/// Result of the existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Unknown,
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Resolving, loading or waiting for the first play to settle.
    Activating,
    /// Source loaded; the engine may be playing, paused or ended.
    Active,
}

/// Snapshot of one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseWidgetState {
    pub key: VerseKey,
    pub status: PlaybackStatus,
    /// Whether the broker designates this verse.
    pub intended: bool,
    pub availability: Availability,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub last_error: Option<String>,
}

struct WidgetInner {
    key: VerseKey,
    total_verses: u16,
    engine: PlaybackEngine,
    broker: PlaybackIntentBroker,
    resolver: Arc<dyn ContentResolver>,
    preferences: Arc<PreferencesService>,
    events: EventBus,
    config: PlaybackConfig,
    phase: Mutex<Phase>,
    availability: Mutex<Availability>,
    handoff: Mutex<Option<DelayedTask>>,
    /// Bumped whenever an activation must not proceed any further.
    activation: AtomicU64,
    failed: AtomicBool,
    last_error: Mutex<Option<String>>,
}

/// Per-verse player.
pub struct VerseWidget {
    inner: Arc<WidgetInner>,
    task: JoinHandle<()>,
}

impl VerseWidget {
    /// Create the widget and start its background task (probe, broker and
    /// preference observation). Must be called inside a tokio runtime.
    pub fn new(
        key: VerseKey,
        total_verses: u16,
        output: Arc<dyn AudioOutput>,
        deps: &VerseDeps,
    ) -> Self {
        let engine = PlaybackEngine::with_event_capacity(
            output,
            format!("verse {key}"),
            deps.config.event_buffer_size,
        );
        let engine_events = engine.subscribe();
        let intents = deps.broker.subscribe();
        let prefs = deps.preferences.subscribe();

        let inner = Arc::new(WidgetInner {
            key,
            total_verses,
            engine,
            broker: deps.broker.clone(),
            resolver: deps.resolver.clone(),
            preferences: deps.preferences.clone(),
            events: deps.events.clone(),
            config: deps.config.clone(),
            phase: Mutex::new(Phase::Idle),
            availability: Mutex::new(Availability::Unknown),
            handoff: Mutex::new(None),
            activation: AtomicU64::new(0),
            failed: AtomicBool::new(false),
            last_error: Mutex::new(None),
        });

        let task = task::spawn(widget_loop(
            Arc::downgrade(&inner),
            intents,
            engine_events,
            prefs,
        ));

        Self { inner, task }
    }

    pub fn key(&self) -> VerseKey {
        self.inner.key
    }

    /// User click: pause when playing, resume when paused, otherwise claim
    /// the broker and start from the top.
    pub async fn toggle(&self) -> Result<()> {
        let phase = *self.inner.phase.lock();
        let wants = self.inner.engine.wants_playback();
        match phase {
            Phase::Active | Phase::Activating if wants => self.inner.engine.pause().await,
            Phase::Active if self.inner.resumable() => self.inner.resume().await,
            _ => self.inner.start().await,
        }
    }

    /// Start (or resume) this verse. No-op when already playing.
    pub async fn play(&self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }
        let phase = *self.inner.phase.lock();
        match phase {
            Phase::Active if self.inner.resumable() => self.inner.resume().await,
            Phase::Activating => {
                self.inner.engine.request_playback();
                Ok(())
            }
            _ => self.inner.start().await,
        }
    }

    pub async fn pause(&self) -> Result<()> {
        self.inner.engine.pause().await
    }

    /// Pause, rewind and give up the claim.
    pub async fn stop(&self) -> Result<()> {
        self.inner.cancel_handoff();
        self.inner.activation.fetch_add(1, Ordering::SeqCst);
        let was = std::mem::replace(&mut *self.inner.phase.lock(), Phase::Idle);
        let result = self.inner.engine.stop().await;
        self.inner.broker.release(&self.inner.key);
        if was != Phase::Idle {
            self.inner.emit(VerseEvent::Stopped {
                verse_key: self.inner.key.to_string(),
            });
        }
        result
    }

    /// Audio is running and this verse is the intended one.
    pub fn is_playing(&self) -> bool {
        self.inner.engine.status() == PlaybackStatus::Playing
            && self.inner.broker.is_intended(&self.inner.key)
    }

    /// Whether the play control should render at all.
    pub fn is_visible(&self) -> bool {
        let enabled = self.inner.preferences.cached().verse_audio_enabled;
        let unavailable = *self.inner.availability.lock() == Availability::Unavailable;
        let loading = *self.inner.phase.lock() == Phase::Activating;
        enabled && !(unavailable && !loading)
    }

    pub fn availability(&self) -> Availability {
        *self.inner.availability.lock()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    pub fn state(&self) -> VerseWidgetState {
        let snapshot = self.inner.engine.snapshot();
        let phase = *self.inner.phase.lock();
        let status = if self.inner.failed.load(Ordering::SeqCst) {
            PlaybackStatus::Error
        } else {
            match phase {
                Phase::Idle => PlaybackStatus::Idle,
                Phase::Activating => PlaybackStatus::Loading,
                Phase::Active => snapshot.status,
            }
        };

        VerseWidgetState {
            key: self.inner.key,
            status,
            intended: self.inner.broker.is_intended(&self.inner.key),
            availability: *self.inner.availability.lock(),
            position_secs: snapshot.position_secs,
            duration_secs: snapshot.duration_secs,
            last_error: self.inner.last_error.lock().clone(),
        }
    }

    pub fn target(&self) -> PlaybackTarget {
        PlaybackTarget::Verse(self.inner.key)
    }
}

impl Drop for VerseWidget {
    fn drop(&mut self) {
        self.inner.cancel_handoff();
        self.inner.activation.fetch_add(1, Ordering::SeqCst);
        self.inner.broker.release(&self.inner.key);
        self.task.abort();

        if let Ok(handle) = Handle::try_current() {
            let inner = self.inner.clone();
            handle.spawn(async move {
                let _ = inner.engine.stop().await;
            });
        }
    }
}

impl std::fmt::Debug for VerseWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerseWidget")
            .field("key", &self.inner.key)
            .field("phase", &*self.inner.phase.lock())
            .finish()
    }
}

impl WidgetInner {
    fn emit(&self, event: VerseEvent) {
        let _ = self.events.emit(CoreEvent::Verse(event));
    }

    fn cancel_handoff(&self) -> bool {
        match self.handoff.lock().take() {
            Some(pending) if pending.is_pending() => {
                pending.cancel();
                true
            }
            _ => false,
        }
    }

    fn resumable(&self) -> bool {
        self.broker.is_intended(&self.key)
            && matches!(
                self.engine.status(),
                PlaybackStatus::Paused | PlaybackStatus::Loading
            )
    }

    fn is_unavailable(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
            || *self.availability.lock() == Availability::Unavailable
    }

    /// Claim the broker and run a fresh activation.
    async fn start(&self) -> Result<()> {
        if self.is_unavailable() {
            return Err(PlaybackError::Unavailable(self.key.to_string()));
        }
        self.cancel_handoff();
        *self.phase.lock() = Phase::Activating;
        self.broker.claim(self.key);
        self.activate().await
    }

    async fn resume(&self) -> Result<()> {
        let play = self.engine.play();
        let prefs = self.preferences.get().await;
        self.engine.set_volume(prefs.volume())?;
        match play.await {
            Ok(_) => Ok(()),
            Err(PlaybackError::NotAllowed) => Err(PlaybackError::NotAllowed),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Resolve, load and play. The caller has already set the phase to
    /// `Activating`.
    async fn activate(&self) -> Result<()> {
        let generation = self.activation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = |inner: &Self| {
            inner.activation.load(Ordering::SeqCst) == generation
                && inner.broker.is_intended(&inner.key)
        };

        self.engine.request_playback();

        if self.is_unavailable() {
            self.abandon(generation);
            self.emit(VerseEvent::Unavailable {
                verse_key: self.key.to_string(),
            });
            return Err(PlaybackError::Unavailable(self.key.to_string()));
        }

        let prefs = self.preferences.get().await;
        if !prefs.verse_audio_enabled {
            debug!(verse_key = %self.key, "Verse audio disabled, not playing");
            self.abandon(generation);
            return Ok(());
        }

        let chapter = self.key.chapter().get();
        let url = match self.resolver.verse_audio_url(chapter, self.key.verse()).await {
            Ok(Some(url)) if !url.trim().is_empty() => url,
            Ok(_) => {
                let error = PlaybackError::Unavailable(self.key.to_string());
                self.fail(&error);
                return Err(error);
            }
            Err(e) => {
                let error = PlaybackError::ResolutionFailed {
                    target: PlaybackTarget::Verse(self.key).to_string(),
                    reason: e.to_string(),
                };
                self.fail(&error);
                return Err(error);
            }
        };

        if !current(self) {
            debug!(verse_key = %self.key, "Activation superseded during resolution");
            self.abandon(generation);
            return Ok(());
        }

        if let Err(e) = self.engine.load(&url).await {
            self.fail(&e);
            return Err(e);
        }
        self.engine.set_volume(prefs.volume())?;

        if !current(self) {
            self.abandon(generation);
            return Ok(());
        }
        if !self.engine.wants_playback() {
            // Paused while loading; stay loaded so it can resume
            self.settle_phase(generation);
            return Ok(());
        }

        match self.engine.play().await {
            Ok(PlayOutcome::Started) => {
                if self.settle_phase(generation) {
                    info!(verse_key = %self.key, "Verse playback started");
                    self.emit(VerseEvent::Started {
                        verse_key: self.key.to_string(),
                    });
                }
                Ok(())
            }
            Ok(PlayOutcome::Superseded) => {
                // Paused before it started; stay loaded so it can resume
                self.settle_phase(generation);
                Ok(())
            }
            Err(PlaybackError::NotAllowed) => {
                self.abandon(generation);
                self.broker.release(&self.key);
                Err(PlaybackError::NotAllowed)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Activating -> Active if this activation is still the live one.
    fn settle_phase(&self, generation: u64) -> bool {
        let mut phase = self.phase.lock();
        let live = self.activation.load(Ordering::SeqCst) == generation
            && *phase == Phase::Activating
            && self.broker.is_intended(&self.key);
        if live {
            *phase = Phase::Active;
        }
        live
    }

    fn abandon(&self, generation: u64) {
        let mut phase = self.phase.lock();
        if self.activation.load(Ordering::SeqCst) == generation && *phase == Phase::Activating {
            *phase = Phase::Idle;
        }
        drop(phase);
        if self.activation.load(Ordering::SeqCst) == generation {
            self.broker.release(&self.key);
        }
    }

    /// Terminal failure for this widget only.
    fn fail(&self, error: &PlaybackError) {
        self.activation.fetch_add(1, Ordering::SeqCst);
        self.cancel_handoff();
        *self.phase.lock() = Phase::Idle;
        *self.availability.lock() = Availability::Unavailable;
        self.broker.release(&self.key);

        if self.failed.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!(verse_key = %self.key, error = %error, "Verse playback failed");
        let message = error.to_string();
        *self.last_error.lock() = Some(message.clone());
        let verse_key = self.key.to_string();
        match error {
            PlaybackError::Unavailable(_) => self.emit(VerseEvent::Unavailable { verse_key }),
            _ => self.emit(VerseEvent::Failed { verse_key, message }),
        }
    }

    /// Record the existence probe's answer unless a failure already decided.
    fn record_availability(&self, probed: bridge_traits::error::Result<bool>) {
        let availability = match probed {
            Ok(true) => Availability::Available,
            Ok(false) => Availability::Unavailable,
            Err(e) => {
                debug!(verse_key = %self.key, error = %e, "Availability probe failed");
                Availability::Unavailable
            }
        };

        {
            let mut current = self.availability.lock();
            if *current == Availability::Unknown {
                *current = availability;
            }
        }
        if availability == Availability::Unavailable {
            self.emit(VerseEvent::Unavailable {
                verse_key: self.key.to_string(),
            });
        }
    }

    /// Stop local playback without touching the broker.
    async fn stop_locally(&self) {
        self.cancel_handoff();
        self.activation.fetch_add(1, Ordering::SeqCst);
        let was = std::mem::replace(&mut *self.phase.lock(), Phase::Idle);
        if was == Phase::Idle {
            return;
        }
        if let Err(e) = self.engine.stop().await {
            debug!(verse_key = %self.key, error = %e, "Stop failed");
        }
        self.emit(VerseEvent::Stopped {
            verse_key: self.key.to_string(),
        });
    }

    async fn on_intent_changed(self: &Arc<Self>, intended: Option<VerseKey>) {
        if intended == Some(self.key) {
            let should_activate = {
                let mut phase = self.phase.lock();
                if *phase == Phase::Idle {
                    *phase = Phase::Activating;
                    true
                } else {
                    false
                }
            };
            if should_activate {
                debug!(verse_key = %self.key, "Became intended verse, starting");
                let inner = self.clone();
                task::spawn(async move {
                    if let Err(e) = inner.activate().await {
                        debug!(verse_key = %inner.key, error = %e, "Hand-off activation failed");
                    }
                });
            }
        } else {
            if *self.phase.lock() != Phase::Idle {
                debug!(verse_key = %self.key, intended = ?intended, "Another verse intended, stopping");
            }
            self.stop_locally().await;
        }
    }

    async fn on_engine_event(self: &Arc<Self>, event: EngineEvent) {
        match event {
            EngineEvent::Ended => self.on_ended().await,
            EngineEvent::Errored(kind) => {
                if *self.phase.lock() != Phase::Idle {
                    self.fail(&PlaybackError::LoadFailed {
                        target: Some(PlaybackTarget::Verse(self.key).to_string()),
                        kind,
                    });
                }
            }
            _ => {}
        }
    }

    async fn on_ended(self: &Arc<Self>) {
        if *self.phase.lock() != Phase::Active {
            return;
        }
        self.emit(VerseEvent::Ended {
            verse_key: self.key.to_string(),
        });

        let prefs = self.preferences.get().await;
        let next = self.key.next_within(self.total_verses);
        let eligible = prefs.verse_audio_enabled && prefs.verse_autoplay_enabled();

        match next {
            Some(next) if eligible && self.broker.is_intended(&self.key) => {
                let delay = self.config.verse_autoplay_delay;
                debug!(
                    verse_key = %self.key,
                    next = %next,
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling next verse"
                );
                let weak = Arc::downgrade(self);
                let pending = DelayedTask::schedule(delay, move || async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.hand_off(next).await;
                    }
                });
                if let Some(previous) = self.handoff.lock().replace(pending) {
                    previous.cancel();
                }
            }
            _ => {
                debug!(verse_key = %self.key, eligible, "Verse chain ends here");
                *self.phase.lock() = Phase::Idle;
                self.broker.release(&self.key);
            }
        }
    }

    async fn hand_off(&self, next: VerseKey) {
        self.handoff.lock().take();

        let prefs = self.preferences.get().await;
        let eligible = prefs.verse_audio_enabled && prefs.verse_autoplay_enabled();
        let still_ours = self.broker.is_intended(&self.key)
            && *self.phase.lock() == Phase::Active
            && self.engine.status() == PlaybackStatus::Ended;

        if !still_ours {
            debug!(verse_key = %self.key, "Hand-off skipped, playback moved on");
            return;
        }

        *self.phase.lock() = Phase::Idle;
        if eligible {
            info!(from = %self.key, to = %next, "Verse autoplay hand-off");
            self.broker.claim(next);
        } else {
            debug!(verse_key = %self.key, "Hand-off skipped, autoplay disabled");
            self.broker.release(&self.key);
        }
    }

    /// React to a preferences write.
    async fn on_preferences_changed(&self, before: Preferences, after: Preferences) {
        let autoplay_switched_off =
            before.verse_autoplay_enabled() && !after.verse_autoplay_enabled();
        let audio_switched_off = before.verse_audio_enabled && !after.verse_audio_enabled;
        if !autoplay_switched_off && !audio_switched_off {
            return;
        }

        let busy = *self.phase.lock() != Phase::Idle || self.handoff.lock().is_some();
        if !busy {
            return;
        }

        info!(verse_key = %self.key, "Autoplay disabled, stopping verse");
        self.stop_locally().await;
        self.broker.release(&self.key);
    }
}

async fn widget_loop(
    inner: Weak<WidgetInner>,
    mut intents: watch::Receiver<Option<VerseKey>>,
    mut engine_events: broadcast::Receiver<EngineEvent>,
    mut prefs: watch::Receiver<Preferences>,
) {
    let Some(strong) = inner.upgrade() else {
        return;
    };

    // The probe is a network round trip; the broker must be watched meanwhile
    let probe = {
        let inner = inner.clone();
        let resolver = strong.resolver.clone();
        let key = strong.key;
        async move {
            let probed = resolver
                .verse_audio_available(key.chapter().get(), key.verse())
                .await;
            if let Some(strong) = inner.upgrade() {
                strong.record_availability(probed);
            }
        }
    };
    task::spawn(probe);

    let intended = *intents.borrow_and_update();
    strong.on_intent_changed(intended).await;

    // Changes published during this read stay unseen and reach the loop
    let mut last_prefs = strong.preferences.get().await;
    drop(strong);

    loop {
        tokio::select! {
            changed = intents.changed() => {
                if changed.is_err() {
                    break;
                }
                let intended = *intents.borrow_and_update();
                let Some(strong) = inner.upgrade() else {
                    break;
                };
                strong.on_intent_changed(intended).await;
            }
            event = engine_events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Verse widget lagged behind engine events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(strong) = inner.upgrade() else {
                    break;
                };
                strong.on_engine_event(event).await;
            }
            changed = prefs.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *prefs.borrow_and_update();
                let Some(strong) = inner.upgrade() else {
                    break;
                };
                strong.on_preferences_changed(last_prefs, current).await;
                last_prefs = current;
            }
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Mounts the verse widgets of one chapter view.
///
/// Holds no exclusivity state of its own; that lives in the broker.
pub struct VersePlaybackCoordinator {
    chapter: ChapterId,
    total_verses: u16,
    deps: VerseDeps,
    widgets: BTreeMap<u16, VerseWidget>,
}

impl VersePlaybackCoordinator {
    pub fn new(chapter: u16, total_verses: u16, deps: VerseDeps) -> Result<Self> {
        let chapter = ChapterId::new(chapter)?;
        if total_verses == 0 {
            return Err(PlaybackError::InvalidVerseKey(format!("{chapter}_0")));
        }
        Ok(Self {
            chapter,
            total_verses,
            deps,
            widgets: BTreeMap::new(),
        })
    }

    pub fn chapter(&self) -> ChapterId {
        self.chapter
    }

    pub fn total_verses(&self) -> u16 {
        self.total_verses
    }

    /// Mount the widget for `verse`. Mounting twice returns the same widget.
    pub fn mount(&mut self, verse: u16) -> Result<&VerseWidget> {
        let key = self.key(verse)?;
        if !self.widgets.contains_key(&verse) {
            let output = self.deps.output_factory.create_output()?;
            let widget = VerseWidget::new(key, self.total_verses, output, &self.deps);
            self.widgets.insert(verse, widget);
        }
        self.widgets
            .get(&verse)
            .ok_or_else(|| PlaybackError::Internal(format!("widget {key} missing after mount")))
    }

    /// Mount every verse of the chapter.
    pub fn mount_all(&mut self) -> Result<()> {
        for verse in 1..=self.total_verses {
            self.mount(verse)?;
        }
        debug!(chapter = %self.chapter, verses = self.total_verses, "Mounted verse widgets");
        Ok(())
    }

    pub fn widget(&self, verse: u16) -> Option<&VerseWidget> {
        self.widgets.get(&verse)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &VerseWidget> {
        self.widgets.values()
    }

    /// Start `verse`, displacing whatever verse was playing.
    pub async fn play_verse(&self, verse: u16) -> Result<()> {
        let key = self.key(verse)?;
        let widget = self
            .widgets
            .get(&verse)
            .ok_or_else(|| PlaybackError::InvalidVerseKey(format!("{key} is not mounted")))?;
        widget.play().await
    }

    pub async fn stop_all(&self) {
        for widget in self.widgets.values() {
            if let Err(e) = widget.stop().await {
                debug!(verse_key = %widget.key(), error = %e, "Stop failed");
            }
        }
    }

    /// The verse of this chapter that is actually playing, if any.
    pub fn playing_verse(&self) -> Option<VerseKey> {
        let intended = self.deps.broker.intended()?;
        if intended.chapter() != self.chapter {
            return None;
        }
        self.widgets
            .get(&intended.verse())
            .filter(|widget| widget.is_playing())
            .map(VerseWidget::key)
    }

    /// Drop every widget; each stops and releases its claim.
    pub fn unmount_all(&mut self) {
        self.widgets.clear();
    }

    fn key(&self, verse: u16) -> Result<VerseKey> {
        if verse == 0 || verse > self.total_verses {
            return Err(PlaybackError::InvalidVerseKey(format!(
                "{}_{}",
                self.chapter, verse
            )));
        }
        VerseKey::new(self.chapter.get(), verse)
    }
}
