//! Shared fakes for the playback integration tests.
//!
//! - `FakeOutput`: an output channel whose play futures either resolve at
//!   once or wait for the test, and which records every pause issued while
//!   a play is still pending
//! - `MemorySettingsStore`, `RecordingSurface`, `FakeResolver`,
//!   `FakeFactory`
//! - harness builders for the chapter and verse coordinators

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioOutput, AudioOutputFactory, BridgeError, ChapterInfo, ContentResolver, MediaAction,
    MediaActionDetails, MediaActionHandler, MediaControlSurface, MediaErrorKind,
    MediaPlaybackState, NowPlayingMetadata, OutputError, OutputEvent, PlayFuture, PositionState,
    SettingsStore, SystemClock,
};
use core_playback::{
    ChapterCoordinatorDeps, ChapterPlaybackCoordinator, PlaybackConfig, PlaybackEngine,
    PlaybackIntentBroker, PreferencesPatch, PreferencesService, RecentlyPlayedHistory, VerseDeps,
    VersePlaybackCoordinator, VerseWidget,
};
use core_runtime::events::EventBus;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};

pub use std::time::Duration;

/// Let spawned tasks run without advancing the (paused) clock.
pub async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// FakeOutput
// ============================================================================

#[derive(Default)]
struct OutputState {
    source: Option<String>,
    volume: f32,
    volumes_at_play: Vec<f32>,
    position: f64,
    playing: bool,
    manual: bool,
    fail_next_play: Option<OutputError>,
    pending: VecDeque<oneshot::Sender<Result<(), OutputError>>>,
    calls: Vec<String>,
    violations: usize,
}

struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakeOutput {
    state: Mutex<OutputState>,
    pending_plays: Arc<AtomicUsize>,
    events: broadcast::Sender<OutputEvent>,
}

impl FakeOutput {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            state: Mutex::new(OutputState {
                volume: 1.0,
                ..Default::default()
            }),
            pending_plays: Arc::new(AtomicUsize::new(0)),
            events,
        })
    }

    /// Play futures wait for [`resolve_play`](Self::resolve_play).
    pub fn set_manual(&self, manual: bool) {
        self.state.lock().manual = manual;
    }

    /// The next play rejects with `error`.
    pub fn fail_next_play(&self, error: OutputError) {
        self.state.lock().fail_next_play = Some(error);
    }

    /// Resolve the oldest play still being awaited. Returns `false` if none.
    pub fn resolve_play(&self) -> bool {
        loop {
            let Some(sender) = self.state.lock().pending.pop_front() else {
                return false;
            };
            // Superseded plays dropped their receiver
            if sender.send(Ok(())).is_ok() {
                self.state.lock().playing = true;
                let _ = self.events.send(OutputEvent::Playing);
                return true;
            }
        }
    }

    /// Natural end of the source.
    pub fn finish(&self) {
        {
            let mut state = self.state.lock();
            state.playing = false;
            state.position = 0.0;
        }
        let _ = self.events.send(OutputEvent::Ended);
    }

    pub fn emit(&self, event: OutputEvent) {
        let _ = self.events.send(event);
    }

    pub fn fail(&self, kind: MediaErrorKind) {
        self.state.lock().playing = false;
        let _ = self.events.send(OutputEvent::Error { kind });
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn volumes_at_play(&self) -> Vec<f32> {
        self.state.lock().volumes_at_play.clone()
    }

    pub fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Pauses issued while a play future was unresolved.
    pub fn violations(&self) -> usize {
        self.state.lock().violations
    }

    pub fn pending_plays(&self) -> usize {
        self.pending_plays.load(Ordering::SeqCst)
    }
}

impl AudioOutput for FakeOutput {
    fn set_source(&self, url: Option<&str>) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.source = url.map(str::to_string);
        state.calls.push(format!("src:{}", url.unwrap_or("-")));
        Ok(())
    }

    fn load(&self) -> BridgeResult<()> {
        self.state.lock().calls.push("load".to_string());
        if self.state.lock().source.is_some() {
            let _ = self.events.send(OutputEvent::LoadStart);
        }
        Ok(())
    }

    fn play(&self) -> PlayFuture {
        let mut state = self.state.lock();
        state.calls.push("play".to_string());
        let volume = state.volume;
        state.volumes_at_play.push(volume);

        if let Some(error) = state.fail_next_play.take() {
            return async move { Err(error) }.boxed();
        }

        if !state.manual {
            state.playing = true;
            drop(state);
            let _ = self.events.send(OutputEvent::Playing);
            return async { Ok(()) }.boxed();
        }

        let (tx, rx) = oneshot::channel();
        state.pending.push_back(tx);
        self.pending_plays.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(self.pending_plays.clone());
        async move {
            let _guard = guard;
            rx.await.unwrap_or(Err(OutputError::Interrupted))
        }
        .boxed()
    }

    fn pause(&self) -> BridgeResult<()> {
        let was_playing = {
            let mut state = self.state.lock();
            if self.pending_plays.load(Ordering::SeqCst) > 0 {
                state.violations += 1;
            }
            state.calls.push("pause".to_string());
            std::mem::replace(&mut state.playing, false)
        };
        if was_playing {
            let _ = self.events.send(OutputEvent::Paused);
        }
        Ok(())
    }

    fn seek(&self, position_secs: f64) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.position = position_secs;
        state.calls.push(format!("seek:{position_secs}"));
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.state.lock().volume = volume;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn subscribe(&self) -> broadcast::Receiver<OutputEvent> {
        self.events.subscribe()
    }
}

/// Hands out fresh outputs and keeps them for inspection, in creation order.
#[derive(Default)]
pub struct FakeFactory {
    outputs: Mutex<Vec<Arc<FakeOutput>>>,
}

impl FakeFactory {
    pub fn output(&self, index: usize) -> Arc<FakeOutput> {
        self.outputs.lock()[index].clone()
    }
}

impl AudioOutputFactory for FakeFactory {
    fn create_output(&self) -> BridgeResult<Arc<dyn AudioOutput>> {
        let output = FakeOutput::new();
        self.outputs.lock().push(output.clone());
        Ok(output)
    }
}

// ============================================================================
// Settings, surface, resolver
// ============================================================================

#[derive(Default)]
pub struct MemorySettingsStore {
    strings: Mutex<HashMap<String, String>>,
    bools: Mutex<HashMap<String, bool>>,
    ints: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.strings.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.strings.lock().get(key).cloned())
    }

    async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()> {
        self.bools.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>> {
        Ok(self.bools.lock().get(key).copied())
    }

    async fn set_i64(&self, key: &str, value: i64) -> BridgeResult<()> {
        self.ints.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn get_i64(&self, key: &str) -> BridgeResult<Option<i64>> {
        Ok(self.ints.lock().get(key).copied())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.strings.lock().remove(key);
        self.bools.lock().remove(key);
        self.ints.lock().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let mut keys: Vec<String> = self.strings.lock().keys().cloned().collect();
        keys.extend(self.bools.lock().keys().cloned());
        keys.extend(self.ints.lock().keys().cloned());
        Ok(keys)
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    pub metadata: Mutex<Vec<Option<NowPlayingMetadata>>>,
    pub handlers: Mutex<HashMap<MediaAction, MediaActionHandler>>,
    pub playback_states: Mutex<Vec<MediaPlaybackState>>,
    pub positions: Mutex<Vec<PositionState>>,
}

impl RecordingSurface {
    pub fn last_metadata(&self) -> Option<NowPlayingMetadata> {
        self.metadata.lock().last().cloned().flatten()
    }

    pub fn last_playback_state(&self) -> Option<MediaPlaybackState> {
        self.playback_states.lock().last().copied()
    }

    pub fn last_position(&self) -> Option<PositionState> {
        self.positions.lock().last().copied()
    }

    /// Invoke the handler the coordinator installed for `action`.
    pub fn trigger(&self, action: MediaAction, details: MediaActionDetails) -> bool {
        let handler = self.handlers.lock().get(&action).cloned();
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }
}

impl MediaControlSurface for RecordingSurface {
    fn set_metadata(&self, metadata: Option<NowPlayingMetadata>) -> BridgeResult<()> {
        self.metadata.lock().push(metadata);
        Ok(())
    }

    fn set_action_handler(
        &self,
        action: MediaAction,
        handler: Option<MediaActionHandler>,
    ) -> BridgeResult<()> {
        let mut handlers = self.handlers.lock();
        match handler {
            Some(handler) => {
                handlers.insert(action, handler);
            }
            None => {
                handlers.remove(&action);
            }
        }
        Ok(())
    }

    fn set_playback_state(&self, state: MediaPlaybackState) -> BridgeResult<()> {
        self.playback_states.lock().push(state);
        Ok(())
    }

    fn set_position_state(&self, state: PositionState) -> BridgeResult<()> {
        self.positions.lock().push(state);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeResolver {
    pub failing_chapters: Mutex<HashSet<u16>>,
    pub missing_chapters: Mutex<HashSet<u16>>,
    pub unavailable_verses: Mutex<HashSet<(u16, u16)>>,
    /// How long each availability probe takes.
    pub probe_delay: Mutex<Option<Duration>>,
    pub chapter_requests: Mutex<Vec<u16>>,
    pub verse_requests: Mutex<Vec<(u16, u16)>>,
}

impl FakeResolver {
    pub fn chapter_requests(&self) -> Vec<u16> {
        self.chapter_requests.lock().clone()
    }

    pub fn last_chapter_request(&self) -> Option<u16> {
        self.chapter_requests.lock().last().copied()
    }
}

#[async_trait]
impl ContentResolver for FakeResolver {
    async fn chapter_audio_url(&self, chapter: u16) -> BridgeResult<Option<String>> {
        self.chapter_requests.lock().push(chapter);
        if self.failing_chapters.lock().contains(&chapter) {
            return Err(BridgeError::OperationFailed("audio api down".to_string()));
        }
        if self.missing_chapters.lock().contains(&chapter) {
            return Ok(None);
        }
        Ok(Some(format!("https://audio.test/chapters/{chapter:03}.mp3")))
    }

    async fn verse_audio_url(&self, chapter: u16, verse: u16) -> BridgeResult<Option<String>> {
        self.verse_requests.lock().push((chapter, verse));
        Ok(Some(format!("https://audio.test/verses/{chapter}_{verse}.mp3")))
    }

    async fn verse_audio_available(&self, chapter: u16, verse: u16) -> BridgeResult<bool> {
        let delay = *self.probe_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(!self.unavailable_verses.lock().contains(&(chapter, verse)))
    }

    async fn chapter_ids(&self) -> BridgeResult<Vec<u16>> {
        Ok((1..=114).collect())
    }

    async fn chapter_info(&self, chapter: u16) -> BridgeResult<Option<ChapterInfo>> {
        Ok(match chapter {
            1 => Some(ChapterInfo {
                id: 1,
                name: "Al-Fatiha".to_string(),
                name_arabic: "الفاتحة".to_string(),
                translation: "The Opening".to_string(),
                verse_count: 7,
            }),
            _ => None,
        })
    }
}

// ============================================================================
// Harnesses
// ============================================================================

pub struct ChapterHarness {
    pub coordinator: Arc<ChapterPlaybackCoordinator>,
    pub output: Arc<FakeOutput>,
    pub resolver: Arc<FakeResolver>,
    pub preferences: Arc<PreferencesService>,
    pub store: Arc<MemorySettingsStore>,
    pub surface: Arc<RecordingSurface>,
    pub history: Arc<RecentlyPlayedHistory>,
    pub broker: PlaybackIntentBroker,
    pub events: EventBus,
}

impl ChapterHarness {
    pub async fn set_prefs(&self, patch: PreferencesPatch) {
        self.preferences.set(patch).await.unwrap();
    }
}

pub fn chapter_harness() -> ChapterHarness {
    let output = FakeOutput::new();
    let resolver = Arc::new(FakeResolver::default());
    let store = Arc::new(MemorySettingsStore::default());
    let events = EventBus::new(256);
    let preferences =
        Arc::new(PreferencesService::new(store.clone()).with_events(events.clone()));
    let surface = Arc::new(RecordingSurface::default());
    let history = Arc::new(RecentlyPlayedHistory::new(
        store.clone(),
        Arc::new(SystemClock),
        10,
    ));
    let broker = PlaybackIntentBroker::new().with_events(events.clone());

    let coordinator = ChapterPlaybackCoordinator::new(ChapterCoordinatorDeps {
        engine: Arc::new(PlaybackEngine::new(output.clone(), "chapter")),
        resolver: resolver.clone(),
        preferences: preferences.clone(),
        history: Some(history.clone()),
        surface: Some(surface.clone()),
        broker: Some(broker.clone()),
        events: events.clone(),
        config: PlaybackConfig::default(),
    });

    ChapterHarness {
        coordinator: Arc::new(coordinator),
        output,
        resolver,
        preferences,
        store,
        surface,
        history,
        broker,
        events,
    }
}

pub struct VerseHarness {
    pub coordinator: VersePlaybackCoordinator,
    pub factory: Arc<FakeFactory>,
    pub resolver: Arc<FakeResolver>,
    pub preferences: Arc<PreferencesService>,
    pub broker: PlaybackIntentBroker,
    pub events: EventBus,
}

impl VerseHarness {
    pub fn widget(&self, verse: u16) -> &VerseWidget {
        self.coordinator.widget(verse).unwrap()
    }

    pub fn output(&self, verse: u16) -> Arc<FakeOutput> {
        self.factory.output(usize::from(verse) - 1)
    }

    pub async fn set_prefs(&self, patch: PreferencesPatch) {
        self.preferences.set(patch).await.unwrap();
    }

    /// Number of widgets reporting `is_playing`.
    pub fn playing_count(&self) -> usize {
        self.coordinator.widgets().filter(|w| w.is_playing()).count()
    }

    pub fn intended(&self) -> Option<String> {
        self.broker.intended().map(|key| key.to_string())
    }
}

/// Mount every verse of `chapter` and let the availability probes finish.
pub async fn verse_harness_with(
    chapter: u16,
    total_verses: u16,
    resolver: Arc<FakeResolver>,
    patch: PreferencesPatch,
) -> VerseHarness {
    let store = Arc::new(MemorySettingsStore::default());
    let events = EventBus::new(256);
    let preferences =
        Arc::new(PreferencesService::new(store).with_events(events.clone()));
    preferences.set(patch).await.unwrap();
    let factory = Arc::new(FakeFactory::default());
    let broker = PlaybackIntentBroker::new().with_events(events.clone());

    let deps = VerseDeps {
        broker: broker.clone(),
        resolver: resolver.clone(),
        preferences: preferences.clone(),
        output_factory: factory.clone(),
        events: events.clone(),
        config: PlaybackConfig::default(),
    };
    let mut coordinator = VersePlaybackCoordinator::new(chapter, total_verses, deps).unwrap();
    coordinator.mount_all().unwrap();
    settle().await;

    VerseHarness {
        coordinator,
        factory,
        resolver,
        preferences,
        broker,
        events,
    }
}

pub async fn verse_harness(chapter: u16, total_verses: u16, patch: PreferencesPatch) -> VerseHarness {
    verse_harness_with(chapter, total_verses, Arc::new(FakeResolver::default()), patch).await
}
