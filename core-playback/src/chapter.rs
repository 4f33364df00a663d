//! # Chapter Playback Coordinator
//!
//! Drives whole-chapter recitation over the process-wide chapter engine.
//!
//! ## Overview
//!
//! - [`play_chapter`](ChapterPlaybackCoordinator::play_chapter) resolves the
//!   chapter audio URL, loads it and starts playback
//! - [`toggle_play_pause`](ChapterPlaybackCoordinator::toggle_play_pause),
//!   [`seek`](ChapterPlaybackCoordinator::seek) and friends delegate to the
//!   engine, which owns the play/pause ordering
//! - a clean `ended` with global autoplay on schedules the next chapter
//!   (wrapping 114 to 1) after a short cancellable delay; preferences and
//!   state are checked again when the delay fires
//! - the system media control surface gets metadata, playback state and
//!   position, and its commands are routed through the same entry points as
//!   in-app controls
//!
//! Errors never trigger autoplay and are never retried.
//!
//! ## Usage
//!
//! ```no_run
//! use core_playback::{ChapterCoordinatorDeps, ChapterPlaybackCoordinator};
//! # async fn example(deps: ChapterCoordinatorDeps) -> core_playback::Result<()> {
//! let coordinator = ChapterPlaybackCoordinator::new(deps);
//! coordinator.play_chapter(18).await?;
//! coordinator.toggle_play_pause().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bridge_traits::{
    ContentResolver, MediaAction, MediaActionDetails, MediaActionHandler, MediaControlSurface,
    MediaPlaybackState, NowPlayingMetadata, PositionState,
};
use core_async::sync::{broadcast, mpsc, watch};
use core_async::task::{self, JoinHandle};
use core_async::time::DelayedTask;
use core_runtime::events::{ChapterEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use crate::broker::PlaybackIntentBroker;
use crate::config::PlaybackConfig;
use crate::engine::{EngineEvent, PlayOutcome, PlaybackEngine};
use crate::error::{PlaybackError, Result};
use crate::history::RecentlyPlayedHistory;
use crate::preferences::PreferencesService;
use crate::types::{ChapterId, PlaybackState, PlaybackStatus, PlaybackTarget, VerseKey};

/// Collaborators of the chapter coordinator.
pub struct ChapterCoordinatorDeps {
    pub engine: Arc<PlaybackEngine>,
    pub resolver: Arc<dyn ContentResolver>,
    pub preferences: Arc<PreferencesService>,
    pub history: Option<Arc<RecentlyPlayedHistory>>,
    pub surface: Option<Arc<dyn MediaControlSurface>>,
    /// When set, chapter and verse playback exclude each other.
    pub broker: Option<PlaybackIntentBroker>,
    pub events: EventBus,
    pub config: PlaybackConfig,
}

/// Commands arriving from the media control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TransportCommand {
    Play,
    Pause,
    SeekBy(f64),
    SeekTo(f64),
}

struct ChapterInner {
    engine: Arc<PlaybackEngine>,
    resolver: Arc<dyn ContentResolver>,
    preferences: Arc<PreferencesService>,
    history: Option<Arc<RecentlyPlayedHistory>>,
    surface: Option<Arc<dyn MediaControlSurface>>,
    broker: Option<PlaybackIntentBroker>,
    events: EventBus,
    config: PlaybackConfig,
    state: watch::Sender<PlaybackState>,
    /// Bumped by every play_chapter and stop; stale continuations compare against it.
    request: AtomicU64,
    autoplay: Mutex<Option<DelayedTask>>,
    last_error: Mutex<Option<String>>,
    commands: mpsc::UnboundedSender<TransportCommand>,
}

/// Whole-chapter playback with autoplay chaining and media controls.
pub struct ChapterPlaybackCoordinator {
    inner: Arc<ChapterInner>,
    tasks: Vec<JoinHandle<()>>,
}

impl ChapterPlaybackCoordinator {
    /// Create the coordinator and start listening to the engine.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(deps: ChapterCoordinatorDeps) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let engine_events = deps.engine.subscribe();
        let initial = PlaybackState {
            volume: deps.engine.volume(),
            ..PlaybackState::default()
        };
        let (state, _) = watch::channel(initial);

        let inner = Arc::new(ChapterInner {
            engine: deps.engine,
            resolver: deps.resolver,
            preferences: deps.preferences,
            history: deps.history,
            surface: deps.surface,
            broker: deps.broker,
            events: deps.events,
            config: deps.config,
            state,
            request: AtomicU64::new(0),
            autoplay: Mutex::new(None),
            last_error: Mutex::new(None),
            commands,
        });

        let mut tasks = vec![
            task::spawn(engine_event_loop(Arc::downgrade(&inner), engine_events)),
            task::spawn(command_loop(Arc::downgrade(&inner), command_rx)),
        ];
        if let Some(broker) = &inner.broker {
            tasks.push(task::spawn(verse_claim_loop(
                Arc::downgrade(&inner),
                broker.subscribe(),
            )));
        }

        Self { inner, tasks }
    }

    /// Resolve, load and play `chapter`.
    ///
    /// Cancels a pending autoplay continuation. Resolution and load failures
    /// set the status to `Error` and are returned; they are not retried.
    pub async fn play_chapter(&self, chapter: u16) -> Result<()> {
        let chapter = ChapterId::new(chapter)?;
        self.inner.play_chapter(chapter).await
    }

    /// Pause when playback is wanted, otherwise play.
    ///
    /// Safe to call repeatedly before earlier calls settle; the engine
    /// settles on the last request.
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.inner.toggle_play_pause().await
    }

    pub async fn pause(&self) -> Result<()> {
        self.inner.pause().await
    }

    /// Seek to an absolute position. Returns the applied (clamped) position.
    pub fn seek(&self, position_secs: f64) -> Result<f64> {
        self.inner.seek(position_secs)
    }

    /// Seek relative to the current position.
    pub fn seek_relative(&self, delta_secs: f64) -> Result<f64> {
        self.inner.seek_relative(delta_secs)
    }

    /// Apply a volume to the chapter channel now. Clamped to `[0, 1]`.
    pub fn set_volume(&self, volume: f32) -> Result<f32> {
        let applied = self.inner.engine.set_volume(volume)?;
        self.inner.state.send_modify(|state| state.volume = applied);
        Ok(applied)
    }

    /// Stop playback, cancel autoplay and clear the media surface.
    pub async fn stop(&self) -> Result<()> {
        self.inner.stop().await
    }

    /// Play the chapter after the current one, wrapping 114 to 1.
    ///
    /// No-op when nothing has been played yet.
    pub async fn play_next(&self) -> Result<()> {
        let Some(current) = self.inner.current_chapter() else {
            debug!("play_next ignored, no current chapter");
            return Ok(());
        };
        let next = self.inner.next_chapter(current).await;
        self.inner.play_chapter(next).await
    }

    /// Play the chapter before the current one, wrapping 1 to 114.
    pub async fn play_previous(&self) -> Result<()> {
        let Some(current) = self.inner.current_chapter() else {
            debug!("play_previous ignored, no current chapter");
            return Ok(());
        };
        let previous = self.inner.previous_chapter(current).await;
        self.inner.play_chapter(previous).await
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state.subscribe()
    }

    /// Message of the last resolution or load failure, for the inline indicator.
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    /// Whether an autoplay continuation is waiting to fire.
    pub fn autoplay_pending(&self) -> bool {
        self.inner
            .autoplay
            .lock()
            .as_ref()
            .is_some_and(DelayedTask::is_pending)
    }

    pub fn engine(&self) -> &Arc<PlaybackEngine> {
        &self.inner.engine
    }
}

impl Drop for ChapterPlaybackCoordinator {
    fn drop(&mut self) {
        self.inner.cancel_autoplay();
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl ChapterInner {
    fn is_current(&self, request: u64) -> bool {
        self.request.load(Ordering::SeqCst) == request
    }

    fn current_chapter(&self) -> Option<ChapterId> {
        self.state.borrow().target.map(|target| target.chapter())
    }

    fn emit(&self, event: ChapterEvent) {
        let _ = self.events.emit(CoreEvent::Chapter(event));
    }

    fn cancel_autoplay(&self) -> bool {
        match self.autoplay.lock().take() {
            Some(pending) if pending.is_pending() => {
                pending.cancel();
                true
            }
            _ => false,
        }
    }

    #[instrument(skip(self), fields(chapter = %chapter))]
    async fn play_chapter(&self, chapter: ChapterId) -> Result<()> {
        if self.cancel_autoplay() {
            if let Some(previous) = self.current_chapter() {
                self.emit(ChapterEvent::AutoplayCancelled {
                    chapter: previous.get(),
                });
            }
        }
        let request = self.request.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_error.lock() = None;

        if let Some(broker) = &self.broker {
            broker.clear();
        }
        self.engine.request_playback();
        self.state.send_modify(|state| {
            state.target = Some(PlaybackTarget::Chapter(chapter));
            state.status = PlaybackStatus::Loading;
            state.position_secs = 0.0;
            state.duration_secs = None;
        });
        self.emit(ChapterEvent::Loading {
            chapter: chapter.get(),
        });

        let url = match self.resolver.chapter_audio_url(chapter.get()).await {
            Ok(Some(url)) if !url.trim().is_empty() => url,
            Ok(_) => {
                let error = PlaybackError::ResolutionFailed {
                    target: PlaybackTarget::Chapter(chapter).to_string(),
                    reason: "no audio url".to_string(),
                };
                self.fail(request, chapter, &error);
                return Err(error);
            }
            Err(e) => {
                let error = PlaybackError::ResolutionFailed {
                    target: PlaybackTarget::Chapter(chapter).to_string(),
                    reason: e.to_string(),
                };
                self.fail(request, chapter, &error);
                return Err(error);
            }
        };

        if !self.is_current(request) {
            debug!("Chapter request superseded during resolution");
            return Ok(());
        }

        debug!(url = %core_runtime::logging::strip_url(&url), "Loading chapter audio");
        if let Err(e) = self.engine.load(&url).await {
            self.fail(request, chapter, &e);
            return Err(e);
        }

        let prefs = self.preferences.get().await;
        let volume = self.engine.set_volume(prefs.volume())?;
        self.state.send_modify(|state| state.volume = volume);

        if !self.is_current(request) {
            return Ok(());
        }
        if !self.engine.wants_playback() {
            // Paused while resolving
            self.set_status_if(PlaybackStatus::Loading, PlaybackStatus::Paused);
            return Ok(());
        }

        match self.engine.play().await {
            Ok(PlayOutcome::Started) if self.is_current(request) => {
                // A pause queued behind this play may already have run
                self.sync_status(request);
                info!(volume, "Chapter playback started");
                self.on_chapter_started(chapter).await;
                Ok(())
            }
            Ok(_) => {
                self.sync_status(request);
                Ok(())
            }
            Err(PlaybackError::NotAllowed) => {
                self.set_status_if(PlaybackStatus::Loading, PlaybackStatus::Paused);
                Err(PlaybackError::NotAllowed)
            }
            Err(e) => {
                self.fail(request, chapter, &e);
                Err(e)
            }
        }
    }

    async fn on_chapter_started(&self, chapter: ChapterId) {
        if let Some(history) = &self.history {
            if let Err(e) = history.record(chapter).await {
                warn!(chapter = %chapter, error = %e, "Failed to record recently played");
            }
        }
        self.publish_metadata(chapter).await;
        self.publish_playback_state(MediaPlaybackState::Playing);
        self.publish_position();
    }

    /// Move to `Error` once per request and report it.
    fn fail(&self, request: u64, chapter: ChapterId, error: &PlaybackError) {
        if !self.is_current(request) {
            return;
        }

        let newly_failed = self.state.send_if_modified(|state| {
            if state.status == PlaybackStatus::Error {
                return false;
            }
            state.status = PlaybackStatus::Error;
            true
        });
        if !newly_failed {
            return;
        }

        warn!(chapter = %chapter, error = %error, "Chapter playback failed");
        let message = error.to_string();
        *self.last_error.lock() = Some(message.clone());
        self.emit(ChapterEvent::Failed {
            chapter: chapter.get(),
            message,
        });
        self.publish_playback_state(MediaPlaybackState::Paused);
    }

    fn set_status_if(&self, from: PlaybackStatus, to: PlaybackStatus) -> bool {
        self.state.send_if_modified(|state| {
            if state.status == from {
                state.status = to;
                true
            } else {
                false
            }
        })
    }

    /// Adopt the engine's view after a superseded play.
    fn sync_status(&self, request: u64) {
        if !self.is_current(request) {
            return;
        }
        let engine_status = self.engine.status();
        let wants = self.engine.wants_playback();
        self.state.send_if_modified(|state| {
            let status = match engine_status {
                PlaybackStatus::Loading | PlaybackStatus::Idle if !wants => PlaybackStatus::Paused,
                other => other,
            };
            if state.status != status && state.status != PlaybackStatus::Error {
                state.status = status;
                true
            } else {
                false
            }
        });
    }

    async fn toggle_play_pause(&self) -> Result<()> {
        if self.engine.wants_playback() {
            return self.pause().await;
        }

        let (target, status) = {
            let state = self.state.borrow();
            (state.target, state.status)
        };
        let Some(target) = target else {
            debug!("Toggle ignored, nothing loaded");
            return Ok(());
        };

        match status {
            PlaybackStatus::Idle | PlaybackStatus::Ended | PlaybackStatus::Error => {
                self.play_chapter(target.chapter()).await
            }
            _ => self.resume().await,
        }
    }

    async fn resume(&self) -> Result<()> {
        // Intent is recorded here, before anything else can interleave
        let play = self.engine.play();

        let prefs = self.preferences.get().await;
        let volume = self.engine.set_volume(prefs.volume())?;
        self.state.send_modify(|state| state.volume = volume);

        let request = self.request.load(Ordering::SeqCst);
        match play.await {
            Ok(_) => {
                self.sync_status(request);
                Ok(())
            }
            Err(PlaybackError::NotAllowed) => Err(PlaybackError::NotAllowed),
            Err(e) => {
                if let Some(chapter) = self.current_chapter() {
                    self.fail(request, chapter, &e);
                }
                Err(e)
            }
        }
    }

    async fn pause(&self) -> Result<()> {
        self.engine.pause().await?;
        if !self.engine.wants_playback() {
            self.set_status_if(PlaybackStatus::Loading, PlaybackStatus::Paused);
        }
        Ok(())
    }

    fn seek(&self, position_secs: f64) -> Result<f64> {
        let applied = self.engine.seek(position_secs)?;
        self.state.send_modify(|state| state.position_secs = applied);
        self.publish_position();
        Ok(applied)
    }

    fn seek_relative(&self, delta_secs: f64) -> Result<f64> {
        let current = self.engine.snapshot().position_secs;
        self.seek(current + delta_secs)
    }

    async fn stop(&self) -> Result<()> {
        let chapter = self.current_chapter();
        if self.cancel_autoplay() {
            if let Some(chapter) = chapter {
                self.emit(ChapterEvent::AutoplayCancelled {
                    chapter: chapter.get(),
                });
            }
        }
        self.request.fetch_add(1, Ordering::SeqCst);

        let result = self.engine.stop().await;

        self.state.send_modify(|state| {
            state.target = None;
            state.status = PlaybackStatus::Idle;
            state.position_secs = 0.0;
            state.duration_secs = None;
        });
        self.emit(ChapterEvent::Stopped {
            chapter: chapter.map(ChapterId::get),
        });
        self.clear_surface();
        info!(chapter = ?chapter.map(ChapterId::get), "Chapter playback stopped");

        result
    }

    async fn next_chapter(&self, current: ChapterId) -> ChapterId {
        self.neighbour(current, 1).await.unwrap_or_else(|| current.next())
    }

    async fn previous_chapter(&self, current: ChapterId) -> ChapterId {
        self.neighbour(current, -1)
            .await
            .unwrap_or_else(|| current.previous())
    }

    /// Neighbour in the resolver's ordering, wrapping at both ends.
    async fn neighbour(&self, current: ChapterId, step: isize) -> Option<ChapterId> {
        let ids = match self.resolver.chapter_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                debug!(error = %e, "Chapter ordering unavailable, using numeric order");
                return None;
            }
        };
        let position = ids.iter().position(|id| *id == current.get())?;
        let len = ids.len() as isize;
        let index = (position as isize + step).rem_euclid(len) as usize;
        ChapterId::new(ids[index]).ok()
    }

    // ------------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------------

    async fn handle_engine_event(self: &Arc<Self>, event: EngineEvent) {
        match event {
            EngineEvent::Loaded { duration } => {
                self.state.send_modify(|state| {
                    state.duration_secs = duration;
                    if let Some(duration) = duration {
                        state.position_secs = state.position_secs.min(duration);
                    }
                });
                self.publish_position();
            }
            EngineEvent::Position(position) => {
                let updated = self.state.send_if_modified(|state| {
                    if matches!(
                        state.status,
                        PlaybackStatus::Playing | PlaybackStatus::Paused
                    ) {
                        state.position_secs = position;
                        true
                    } else {
                        false
                    }
                });
                if updated {
                    self.publish_position();
                }
            }
            EngineEvent::Started => {
                let Some(chapter) = self.current_chapter() else {
                    return;
                };
                self.state.send_if_modified(|state| {
                    if matches!(
                        state.status,
                        PlaybackStatus::Loading | PlaybackStatus::Paused
                    ) {
                        state.status = PlaybackStatus::Playing;
                        true
                    } else {
                        false
                    }
                });
                self.emit(ChapterEvent::Started {
                    chapter: chapter.get(),
                });
                self.publish_playback_state(MediaPlaybackState::Playing);
            }
            EngineEvent::Paused => {
                let Some(chapter) = self.current_chapter() else {
                    return;
                };
                if self.set_status_if(PlaybackStatus::Playing, PlaybackStatus::Paused) {
                    let position = self.state.borrow().position_secs;
                    self.emit(ChapterEvent::Paused {
                        chapter: chapter.get(),
                        position_ms: (position * 1000.0) as u64,
                    });
                    self.publish_playback_state(MediaPlaybackState::Paused);
                }
            }
            EngineEvent::Ended => self.on_ended().await,
            EngineEvent::Errored(kind) => {
                if let Some(chapter) = self.current_chapter() {
                    let error = PlaybackError::LoadFailed {
                        target: Some(PlaybackTarget::Chapter(chapter).to_string()),
                        kind,
                    };
                    self.fail(self.request.load(Ordering::SeqCst), chapter, &error);
                }
            }
            EngineEvent::Buffering(buffering) => {
                trace!(buffering, "Chapter buffering");
            }
        }
    }

    async fn on_ended(self: &Arc<Self>) {
        let Some(current) = self.current_chapter() else {
            return;
        };
        let request = self.request.load(Ordering::SeqCst);

        self.state.send_modify(|state| {
            state.status = PlaybackStatus::Ended;
            state.position_secs = 0.0;
        });
        self.emit(ChapterEvent::Ended {
            chapter: current.get(),
        });
        self.publish_playback_state(MediaPlaybackState::Paused);

        let prefs = self.preferences.get().await;
        if !prefs.chapter_autoplay_enabled() {
            debug!(chapter = %current, "Chapter ended, autoplay off");
            self.set_status_if(PlaybackStatus::Ended, PlaybackStatus::Idle);
            return;
        }
        if !self.is_current(request) {
            return;
        }

        let next = self.next_chapter(current).await;
        let delay = self.config.chapter_autoplay_delay;
        info!(
            from = %current,
            to = %next,
            delay_ms = delay.as_millis() as u64,
            "Scheduling next chapter"
        );

        let weak = Arc::downgrade(self);
        let pending = DelayedTask::schedule(delay, move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.fire_autoplay(request, current, next).await;
            }
        });
        if let Some(previous) = self.autoplay.lock().replace(pending) {
            previous.cancel();
        }

        self.emit(ChapterEvent::AutoplayScheduled {
            from: current.get(),
            to: next.get(),
            delay_ms: delay.as_millis() as u64,
        });
    }

    /// Give up on an ended chapter's continuation: back to idle, reported once.
    fn abandon_autoplay(&self) {
        let chapter = {
            let state = self.state.borrow();
            match (state.status, state.target) {
                (PlaybackStatus::Ended, Some(PlaybackTarget::Chapter(chapter))) => Some(chapter),
                _ => None,
            }
        };
        let Some(chapter) = chapter else {
            return;
        };
        self.set_status_if(PlaybackStatus::Ended, PlaybackStatus::Idle);
        self.emit(ChapterEvent::AutoplayCancelled {
            chapter: chapter.get(),
        });
    }

    async fn fire_autoplay(&self, request: u64, from: ChapterId, next: ChapterId) {
        self.autoplay.lock().take();

        let still_ended = {
            let state = self.state.borrow();
            state.status == PlaybackStatus::Ended
                && state.target == Some(PlaybackTarget::Chapter(from))
        };
        if !self.is_current(request) || !still_ended {
            debug!(chapter = %from, "Autoplay skipped, playback moved on");
            return;
        }

        if let Some(verse_key) = self.broker.as_ref().and_then(PlaybackIntentBroker::intended) {
            debug!(chapter = %from, verse_key = %verse_key, "Autoplay skipped, a verse is playing");
            self.abandon_autoplay();
            return;
        }

        let prefs = self.preferences.get().await;
        if !prefs.chapter_autoplay_enabled() {
            debug!(chapter = %from, "Autoplay skipped, disabled during delay");
            self.abandon_autoplay();
            return;
        }

        // A verse may have claimed playback while preferences were read
        let verse_claimed = self
            .broker
            .as_ref()
            .is_some_and(|broker| broker.intended().is_some());
        if !self.is_current(request) || verse_claimed {
            self.abandon_autoplay();
            return;
        }

        if let Err(e) = self.play_chapter(next).await {
            warn!(chapter = %next, error = %e, "Autoplay could not start next chapter");
        }
    }

    // ------------------------------------------------------------------------
    // Media control surface
    // ------------------------------------------------------------------------

    async fn publish_metadata(&self, chapter: ChapterId) {
        let Some(surface) = &self.surface else {
            return;
        };

        let (title, album) = match self.resolver.chapter_info(chapter.get()).await {
            Ok(Some(info)) => (
                info.name,
                format!("{} - {}", info.name_arabic, info.translation),
            ),
            Ok(None) => (format!("Chapter {chapter}"), String::new()),
            Err(e) => {
                debug!(chapter = %chapter, error = %e, "Chapter info unavailable");
                (format!("Chapter {chapter}"), String::new())
            }
        };

        let metadata = NowPlayingMetadata {
            title,
            artist: self.config.artist.clone(),
            album,
            artwork: self.config.artwork.clone(),
        };
        if let Err(e) = surface.set_metadata(Some(metadata)) {
            warn!(error = %e, "Media surface rejected metadata");
        }

        for action in MediaAction::ALL {
            let handler = self.action_handler(action);
            if let Err(e) = surface.set_action_handler(action, Some(handler)) {
                warn!(?action, error = %e, "Media surface rejected action handler");
            }
        }
    }

    fn action_handler(&self, action: MediaAction) -> MediaActionHandler {
        let commands = self.commands.clone();
        let default_offset = self.config.seek_offset.as_secs_f64();
        Arc::new(move |details: MediaActionDetails| {
            let command = match action {
                MediaAction::Play => TransportCommand::Play,
                MediaAction::Pause => TransportCommand::Pause,
                MediaAction::SeekBackward => {
                    TransportCommand::SeekBy(-details.seek_offset.unwrap_or(default_offset))
                }
                MediaAction::SeekForward => {
                    TransportCommand::SeekBy(details.seek_offset.unwrap_or(default_offset))
                }
                MediaAction::SeekTo => match details.seek_time {
                    Some(time) => TransportCommand::SeekTo(time),
                    None => return,
                },
            };
            let _ = commands.send(command);
        })
    }

    async fn handle_command(&self, command: TransportCommand) {
        debug!(?command, "Media surface command");
        let result = match command {
            TransportCommand::Play if !self.engine.wants_playback() => {
                self.toggle_play_pause().await
            }
            TransportCommand::Pause if self.engine.wants_playback() => {
                self.toggle_play_pause().await
            }
            TransportCommand::Play | TransportCommand::Pause => Ok(()),
            TransportCommand::SeekBy(delta) => self.seek_relative(delta).map(|_| ()),
            TransportCommand::SeekTo(position) => self.seek(position).map(|_| ()),
        };
        if let Err(e) = result {
            warn!(?command, error = %e, "Media surface command failed");
        }
    }

    fn publish_playback_state(&self, playback: MediaPlaybackState) {
        if let Some(surface) = &self.surface {
            if let Err(e) = surface.set_playback_state(playback) {
                debug!(error = %e, "Media surface rejected playback state");
            }
        }
    }

    fn publish_position(&self) {
        let Some(surface) = &self.surface else {
            return;
        };
        let (position, duration) = {
            let state = self.state.borrow();
            (state.position_secs, state.duration_secs)
        };
        let Some(duration) = duration.filter(|d| d.is_finite()) else {
            return;
        };
        if !position.is_finite() {
            return;
        }
        let state = PositionState {
            duration,
            playback_rate: 1.0,
            position: position.clamp(0.0, duration),
        };
        if let Err(e) = surface.set_position_state(state) {
            trace!(error = %e, "Media surface rejected position");
        }
    }

    fn clear_surface(&self) {
        let Some(surface) = &self.surface else {
            return;
        };
        let _ = surface.set_metadata(None);
        for action in MediaAction::ALL {
            let _ = surface.set_action_handler(action, None);
        }
        let _ = surface.set_playback_state(MediaPlaybackState::None);
    }
}

async fn engine_event_loop(inner: Weak<ChapterInner>, mut events: broadcast::Receiver<EngineEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Chapter coordinator lagged behind engine events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_engine_event(event).await;
    }
}

/// Pause chapter audio whenever a verse claims playback.
async fn verse_claim_loop(
    inner: Weak<ChapterInner>,
    mut intents: watch::Receiver<Option<VerseKey>>,
) {
    while intents.changed().await.is_ok() {
        let intended = *intents.borrow_and_update();
        let Some(verse_key) = intended else {
            continue;
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.cancel_autoplay() {
            debug!(verse_key = %verse_key, "Verse claimed playback, chapter autoplay cancelled");
            inner.abandon_autoplay();
        }
        if inner.engine.wants_playback() {
            debug!(verse_key = %verse_key, "Verse claimed playback, pausing chapter");
            if let Err(e) = inner.pause().await {
                warn!(error = %e, "Failed to pause chapter for verse playback");
            }
        }
    }
}

async fn command_loop(
    inner: Weak<ChapterInner>,
    mut commands: mpsc::UnboundedReceiver<TransportCommand>,
) {
    while let Some(command) = commands.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_command(command).await;
    }
}
