//! # Playback Engine
//!
//! Race-safe transport over one [`AudioOutput`] channel.
//!
//! ## Ordering
//!
//! `play` and `pause` are serialized by a FIFO transport lock. A `play`
//! holds the lock until the output's play future settles, so a `pause`
//! issued while a play is in flight always waits for it instead of pausing a
//! channel that has not finished starting.
//!
//! Each `load` opens a new generation with its own cancellation token.
//! `load` and `stop` cancel the token of the previous generation first; an
//! in-flight play observes the cancellation, drops the output future and
//! reports [`PlayOutcome::Superseded`]. Interruptions never surface as
//! errors.
//!
//! The last requested intent (play or pause) is recorded synchronously when
//! the call is made. Queued requests that no longer match it are skipped,
//! so after any burst of toggles the channel settles on the last intent.
//!
//! ## Events
//!
//! A pump task translates raw [`OutputEvent`]s into [`EngineEvent`]s. The
//! engine must be created inside a tokio runtime.

use std::future::Future;
use std::sync::{Arc, Weak};

use bridge_traits::{AudioOutput, MediaErrorKind, OutputError, OutputEvent};
use core_async::sync::{broadcast, CancellationToken, Mutex as TransportLock};
use core_async::task::{self, JoinHandle};
use parking_lot::Mutex;
use tracing::{debug, instrument, trace, warn};

use crate::error::{PlaybackError, Result};
use crate::types::PlaybackStatus;

/// Lifecycle events surfaced to coordinators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Metadata loaded; duration when finite.
    Loaded { duration: Option<f64> },
    /// Playhead moved, in seconds.
    Position(f64),
    Started,
    Paused,
    /// Natural end of the source. Position is already reset to 0.
    Ended,
    /// Genuine failure. Status is `Error` until the next load.
    Errored(MediaErrorKind),
    Buffering(bool),
}

/// Result of a successful `play` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Audio is running.
    Started,
    /// A newer load, pause or stop won. Nothing to report.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Play,
    Pause,
}

/// Point-in-time copy of the engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub status: PlaybackStatus,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub volume: f32,
    pub source: Option<String>,
    pub generation: u64,
}

struct EngineState {
    status: PlaybackStatus,
    position: f64,
    duration: Option<f64>,
    volume: f32,
    source: Option<String>,
    generation: u64,
    intent: Intent,
    play_in_flight: bool,
    /// Set when we paused the output ourselves; its `Paused` echo may arrive
    /// after a newer play. Cleared by the next `Playing`.
    pause_echo: bool,
    token: CancellationToken,
}

impl EngineState {
    fn new() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            position: 0.0,
            duration: None,
            volume: 1.0,
            source: None,
            generation: 0,
            intent: Intent::Pause,
            play_in_flight: false,
            pause_echo: false,
            token: CancellationToken::new(),
        }
    }

    /// Cancel the in-flight play of the current generation and open a new one.
    fn supersede(&mut self) -> u64 {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.generation += 1;
        self.generation
    }

    fn clamp_position(&self, position: f64) -> f64 {
        let position = if position.is_finite() {
            position.max(0.0)
        } else {
            0.0
        };
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

struct EngineInner {
    label: String,
    output: Arc<dyn AudioOutput>,
    state: Mutex<EngineState>,
    transport: TransportLock<()>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineInner {
    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn handle_output_event(&self, event: OutputEvent) {
        let mut state = self.state.lock();
        let emitted = match event {
            OutputEvent::LoadStart => None,
            OutputEvent::LoadedMetadata { duration } => {
                let duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
                state.duration = duration;
                state.position = state.clamp_position(state.position);
                Some(EngineEvent::Loaded { duration })
            }
            OutputEvent::CanPlay => Some(EngineEvent::Buffering(false)),
            OutputEvent::Waiting => Some(EngineEvent::Buffering(true)),
            OutputEvent::TimeUpdate { position } => {
                if state.source.is_none() {
                    None
                } else {
                    state.position = state.clamp_position(position);
                    Some(EngineEvent::Position(state.position))
                }
            }
            OutputEvent::Playing => {
                state.pause_echo = false;
                let wanted = state.intent == Intent::Play;
                if wanted && !matches!(state.status, PlaybackStatus::Playing | PlaybackStatus::Error) {
                    state.status = PlaybackStatus::Playing;
                    Some(EngineEvent::Started)
                } else {
                    None
                }
            }
            OutputEvent::Paused => {
                // Only a pause nobody asked for (OS, device change) is news here
                if state.status == PlaybackStatus::Playing
                    && state.intent == Intent::Play
                    && !state.play_in_flight
                    && !state.pause_echo
                {
                    debug!(engine = %self.label, "Output paused externally");
                    state.status = PlaybackStatus::Paused;
                    state.intent = Intent::Pause;
                    Some(EngineEvent::Paused)
                } else {
                    None
                }
            }
            OutputEvent::Ended => {
                if matches!(
                    state.status,
                    PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Loading
                ) {
                    state.status = PlaybackStatus::Ended;
                    state.position = 0.0;
                    state.intent = Intent::Pause;
                    Some(EngineEvent::Ended)
                } else {
                    None
                }
            }
            OutputEvent::Error { kind } => {
                if kind == MediaErrorKind::Aborted {
                    debug!(engine = %self.label, "Fetch aborted by a newer request");
                    None
                } else if state.source.is_some() && state.status != PlaybackStatus::Error {
                    warn!(engine = %self.label, kind = %kind, "Output reported a media error");
                    state.status = PlaybackStatus::Error;
                    state.intent = Intent::Pause;
                    state.token.cancel();
                    Some(EngineEvent::Errored(kind))
                } else {
                    None
                }
            }
        };
        drop(state);

        if let Some(event) = emitted {
            trace!(engine = %self.label, ?event, "Engine event");
            self.emit(event);
        }
    }
}

async fn pump(inner: Weak<EngineInner>, mut rx: broadcast::Receiver<OutputEvent>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Engine lagged behind output events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_output_event(event);
    }
}

/// Transport wrapper around one output channel.
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
    pump: JoinHandle<()>,
}

impl PlaybackEngine {
    /// Wrap `output`. `label` tags every log line of this engine.
    pub fn new(output: Arc<dyn AudioOutput>, label: impl Into<String>) -> Self {
        Self::with_event_capacity(output, label, 100)
    }

    pub fn with_event_capacity(
        output: Arc<dyn AudioOutput>,
        label: impl Into<String>,
        capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        let raw = output.subscribe();
        let inner = Arc::new(EngineInner {
            label: label.into(),
            output,
            state: Mutex::new(EngineState::new()),
            transport: TransportLock::new(()),
            events,
        });

        let pump = task::spawn(pump(Arc::downgrade(&inner), raw));

        Self { inner, pump }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.inner.state.lock();
        EngineSnapshot {
            status: state.status,
            position_secs: state.position,
            duration_secs: state.duration,
            volume: state.volume,
            source: state.source.clone(),
            generation: state.generation,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.state.lock().status
    }

    pub fn volume(&self) -> f32 {
        self.inner.state.lock().volume
    }

    /// Whether the last transport request was a play.
    pub fn wants_playback(&self) -> bool {
        self.inner.state.lock().intent == Intent::Play
    }

    /// Record that playback is wanted before a source is ready.
    ///
    /// A later `pause` or `stop` clears it, which lets a caller that is
    /// still resolving a URL notice it was paused in the meantime.
    pub fn request_playback(&self) {
        self.inner.state.lock().intent = Intent::Play;
    }

    /// Replace the source.
    ///
    /// Supersedes any in-flight play, then runs the reset sequence on the
    /// output (pause, rewind, clear, load, assign, load). The recorded
    /// intent is left untouched.
    #[instrument(skip(self, url), fields(engine = %self.inner.label))]
    pub async fn load(&self, url: &str) -> Result<()> {
        let generation = {
            let mut state = self.inner.state.lock();
            let generation = state.supersede();
            state.status = PlaybackStatus::Loading;
            state.position = 0.0;
            state.duration = None;
            state.source = Some(url.to_string());
            state.pause_echo = true;
            generation
        };
        self.inner.emit(EngineEvent::Buffering(true));

        let _transport = self.inner.transport.lock().await;

        if self.inner.state.lock().generation != generation {
            debug!(generation, "Load superseded before it started");
            return Ok(());
        }

        let output = &self.inner.output;
        let reset = output
            .pause()
            .and_then(|_| output.seek(0.0))
            .and_then(|_| output.set_source(None))
            .and_then(|_| output.load())
            .and_then(|_| output.set_source(Some(url)))
            .and_then(|_| output.load());

        if let Err(e) = reset {
            warn!(generation, error = %e, "Output rejected the new source");
            let mut state = self.inner.state.lock();
            if state.generation == generation {
                state.status = PlaybackStatus::Error;
            }
            return Err(e.into());
        }

        debug!(generation, "Source loaded");
        Ok(())
    }

    /// Start or resume playback of the current source.
    ///
    /// The intent is recorded when this method is called, before the
    /// returned future is first polled.
    pub fn play(&self) -> impl Future<Output = Result<PlayOutcome>> + Send + '_ {
        self.request_playback();
        self.play_inner()
    }

    async fn play_inner(&self) -> Result<PlayOutcome> {
        let _transport = self.inner.transport.lock().await;

        let (token, generation, volume) = {
            let mut state = self.inner.state.lock();
            if state.intent != Intent::Play {
                debug!(engine = %self.inner.label, "Play skipped, a later pause won");
                return Ok(PlayOutcome::Superseded);
            }
            if state.source.is_none() {
                return Err(PlaybackError::NoSourceLoaded);
            }
            match state.status {
                PlaybackStatus::Error => return Err(PlaybackError::TerminalError),
                PlaybackStatus::Playing => return Ok(PlayOutcome::Started),
                _ => {}
            }
            state.play_in_flight = true;
            (state.token.clone(), state.generation, state.volume)
        };

        if let Err(e) = self.inner.output.set_volume(volume) {
            warn!(engine = %self.inner.label, error = %e, "Failed to apply volume");
        }

        let play = self.inner.output.play();
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(OutputError::Interrupted),
            result = play => result,
        };

        let mut state = self.inner.state.lock();
        state.play_in_flight = false;
        let current = state.generation == generation && !token.is_cancelled();

        match result {
            Ok(()) if current => {
                let started = state.status != PlaybackStatus::Playing;
                state.status = PlaybackStatus::Playing;
                drop(state);
                if started {
                    self.inner.emit(EngineEvent::Started);
                }
                debug!(engine = %self.inner.label, generation, "Playback started");
                Ok(PlayOutcome::Started)
            }
            Ok(()) => Ok(PlayOutcome::Superseded),
            Err(OutputError::Interrupted) => {
                debug!(engine = %self.inner.label, generation, "Play interrupted");
                Ok(PlayOutcome::Superseded)
            }
            Err(_) if !current => {
                debug!(engine = %self.inner.label, generation, "Play interrupted");
                Ok(PlayOutcome::Superseded)
            }
            Err(OutputError::NotAllowed) => {
                warn!(engine = %self.inner.label, "Platform refused to start playback");
                state.intent = Intent::Pause;
                if state.status != PlaybackStatus::Ended {
                    state.status = PlaybackStatus::Paused;
                }
                Err(PlaybackError::NotAllowed)
            }
            Err(OutputError::Failed(kind)) => {
                let target = state.source.as_deref().map(core_runtime::logging::strip_url).map(str::to_string);
                let newly_failed = state.status != PlaybackStatus::Error;
                state.status = PlaybackStatus::Error;
                state.intent = Intent::Pause;
                drop(state);
                warn!(engine = %self.inner.label, kind = %kind, "Play failed");
                if newly_failed {
                    self.inner.emit(EngineEvent::Errored(kind));
                }
                Err(PlaybackError::LoadFailed { target, kind })
            }
        }
    }

    /// Pause playback.
    ///
    /// Waits for an in-flight play to settle first. The intent is recorded
    /// when this method is called.
    pub fn pause(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        self.inner.state.lock().intent = Intent::Pause;
        self.pause_inner()
    }

    async fn pause_inner(&self) -> Result<()> {
        let _transport = self.inner.transport.lock().await;

        let was_playing = {
            let state = self.inner.state.lock();
            if state.intent != Intent::Pause {
                debug!(engine = %self.inner.label, "Pause skipped, a later play won");
                return Ok(());
            }
            if !matches!(
                state.status,
                PlaybackStatus::Playing | PlaybackStatus::Loading
            ) {
                return Ok(());
            }
            state.status == PlaybackStatus::Playing
        };

        self.inner.state.lock().pause_echo = true;
        self.inner.output.pause()?;

        self.inner.state.lock().status = PlaybackStatus::Paused;
        if was_playing {
            self.inner.emit(EngineEvent::Paused);
        }
        Ok(())
    }

    /// Cancel any in-flight play, pause, rewind to 0 and go idle.
    ///
    /// The source stays assigned so a later `play` restarts from the top.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            state.supersede();
            state.intent = Intent::Pause;
        }

        let _transport = self.inner.transport.lock().await;

        let was_playing = {
            let mut state = self.inner.state.lock();
            if state.intent == Intent::Play {
                // A play requested after this stop owns the channel now
                return Ok(());
            }
            let was_playing = state.status == PlaybackStatus::Playing;
            state.status = PlaybackStatus::Idle;
            state.position = 0.0;
            state.pause_echo = true;
            was_playing
        };

        let output = &self.inner.output;
        output.pause().and_then(|_| output.seek(0.0))?;

        if was_playing {
            self.inner.emit(EngineEvent::Paused);
        }
        self.inner.emit(EngineEvent::Position(0.0));
        Ok(())
    }

    /// Move the playhead. Clamped to `[0, duration]` when duration is known.
    ///
    /// Returns the applied position.
    pub fn seek(&self, position_secs: f64) -> Result<f64> {
        let position = {
            let state = self.inner.state.lock();
            if state.source.is_none() {
                return Err(PlaybackError::NoSourceLoaded);
            }
            state.clamp_position(position_secs)
        };

        self.inner.output.seek(position)?;
        self.inner.state.lock().position = position;
        self.inner.emit(EngineEvent::Position(position));
        Ok(position)
    }

    /// Set the gain. Clamped to `[0, 1]`; NaN is treated as 0.
    pub fn set_volume(&self, volume: f32) -> Result<f32> {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.inner.state.lock().volume = volume;
        self.inner.output.set_volume(volume)?;
        Ok(volume)
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.inner.state.lock().token.cancel();
        self.pump.abort();
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("label", &self.inner.label)
            .field("status", &self.status())
            .finish()
    }
}
