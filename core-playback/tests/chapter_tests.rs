//! Chapter coordinator behaviour: navigation, autoplay chaining, transport
//! races, volume, failures and the media control surface.

mod common;

use bridge_traits::{
    MediaAction, MediaActionDetails, MediaErrorKind, MediaPlaybackState, OutputEvent,
};
use common::*;
use core_playback::{PlaybackStatus, PlaybackTarget, PreferencesPatch, VerseKey, CHAPTER_COUNT};
use core_runtime::events::{ChapterEvent, CoreEvent};

fn target_chapter(harness: &ChapterHarness) -> Option<u16> {
    harness
        .coordinator
        .state()
        .target
        .map(|target| target.chapter().get())
}

fn chapter_events(rx: &mut tokio::sync::broadcast::Receiver<CoreEvent>) -> Vec<ChapterEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let CoreEvent::Chapter(event) = event {
            events.push(event);
        }
    }
    events
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_next_and_previous_wrap_for_every_chapter() {
    let harness = chapter_harness();

    for id in 1..=CHAPTER_COUNT {
        harness.coordinator.play_chapter(id).await.unwrap();

        harness.coordinator.play_next().await.unwrap();
        assert_eq!(target_chapter(&harness), Some(id % CHAPTER_COUNT + 1));

        harness.coordinator.play_previous().await.unwrap();
        assert_eq!(target_chapter(&harness), Some(id));
    }

    harness.coordinator.play_chapter(114).await.unwrap();
    harness.coordinator.play_next().await.unwrap();
    assert_eq!(target_chapter(&harness), Some(1));

    harness.coordinator.play_previous().await.unwrap();
    assert_eq!(target_chapter(&harness), Some(114));
}

#[tokio::test(start_paused = true)]
async fn test_navigation_without_current_chapter_is_noop() {
    let harness = chapter_harness();

    harness.coordinator.play_next().await.unwrap();
    harness.coordinator.play_previous().await.unwrap();
    harness.coordinator.toggle_play_pause().await.unwrap();

    assert!(harness.resolver.chapter_requests().is_empty());
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_chapter_is_rejected() {
    let harness = chapter_harness();
    assert!(harness.coordinator.play_chapter(0).await.is_err());
    assert!(harness.coordinator.play_chapter(115).await.is_err());
    assert!(harness.resolver.chapter_requests().is_empty());
}

// ============================================================================
// Playback
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_play_chapter_reaches_playing_and_records_history() {
    let harness = chapter_harness();
    let mut rx = harness.events.subscribe();

    harness.coordinator.play_chapter(36).await.unwrap();
    settle().await;

    let state = harness.coordinator.state();
    assert_eq!(state.status, PlaybackStatus::Playing);
    assert_eq!(
        state.target,
        Some(PlaybackTarget::Chapter(core_playback::ChapterId::new(36).unwrap()))
    );
    assert_eq!(
        harness.output.source().as_deref(),
        Some("https://audio.test/chapters/036.mp3")
    );

    let history = harness.history.list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].chapter.get(), 36);

    let events = chapter_events(&mut rx);
    assert!(events.contains(&ChapterEvent::Loading { chapter: 36 }));
    assert!(events.contains(&ChapterEvent::Started { chapter: 36 }));
}

#[tokio::test(start_paused = true)]
async fn test_load_resets_output_before_new_source() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(1).await.unwrap();

    let calls = harness.output.calls();
    let start = calls.iter().position(|c| c == "pause").unwrap();
    assert_eq!(
        &calls[start..start + 6],
        &[
            "pause",
            "seek:0",
            "src:-",
            "load",
            "src:https://audio.test/chapters/001.mp3",
            "load"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_volume_preference_applied_on_play() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().default_volume_percent(45))
        .await;

    harness.coordinator.play_chapter(2).await.unwrap();

    let at_play = harness.output.volumes_at_play();
    assert!((at_play.last().copied().unwrap() - 0.45).abs() < 1e-6);
    assert!((harness.coordinator.state().volume - 0.45).abs() < 1e-6);

    // Changed while playing: picked up by the next play, not before
    harness
        .set_prefs(PreferencesPatch::default().default_volume_percent(80))
        .await;
    assert!((harness.output.volume() - 0.45).abs() < 1e-6);

    harness.coordinator.toggle_play_pause().await.unwrap();
    settle().await;
    harness.coordinator.toggle_play_pause().await.unwrap();
    settle().await;

    let at_play = harness.output.volumes_at_play();
    assert!((at_play.last().copied().unwrap() - 0.8).abs() < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_seek_clamps_to_duration() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(1).await.unwrap();
    harness.output.emit(OutputEvent::LoadedMetadata {
        duration: Some(120.0),
    });
    settle().await;

    assert_eq!(harness.coordinator.seek(500.0).unwrap(), 120.0);
    assert_eq!(harness.coordinator.seek(-4.0).unwrap(), 0.0);
    assert_eq!(harness.coordinator.seek(30.0).unwrap(), 30.0);
    assert_eq!(harness.coordinator.seek_relative(15.0).unwrap(), 45.0);
    assert_eq!(harness.coordinator.state().position_secs, 45.0);
    assert_eq!(harness.coordinator.state().duration_secs, Some(120.0));
}

#[tokio::test(start_paused = true)]
async fn test_stop_resets_and_clears_surface() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(1).await.unwrap();
    settle().await;

    harness.coordinator.stop().await.unwrap();
    settle().await;

    let state = harness.coordinator.state();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert_eq!(state.target, None);
    assert!(!harness.output.is_playing());
    assert!(harness.surface.last_metadata().is_none());
    assert!(harness.surface.handlers.lock().is_empty());
    assert_eq!(
        harness.surface.last_playback_state(),
        Some(MediaPlaybackState::None)
    );
}

// ============================================================================
// Transport races
// ============================================================================

/// Issue `toggles` toggles while the first play is still unresolved.
async fn rapid_toggles(toggles: usize) -> ChapterHarness {
    let harness = chapter_harness();
    harness.output.set_manual(true);

    let first = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move { coordinator.play_chapter(1).await }
    });
    settle().await;
    assert_eq!(harness.output.pending_plays(), 1);

    let burst = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move {
            let mut calls = Vec::new();
            for _ in 0..toggles {
                calls.push(coordinator.toggle_play_pause());
            }
            futures::future::join_all(calls).await
        }
    });

    while !(first.is_finished() && burst.is_finished()) {
        settle().await;
        harness.output.resolve_play();
    }
    first.await.unwrap().unwrap();
    for result in burst.await.unwrap() {
        result.unwrap();
    }
    settle().await;

    harness
}

#[tokio::test(start_paused = true)]
async fn test_rapid_toggles_never_pause_in_flight_play() {
    for toggles in 1..=6 {
        let harness = rapid_toggles(toggles).await;

        assert_eq!(
            harness.output.violations(),
            0,
            "pause issued during pending play after {toggles} toggles"
        );

        // play_chapter counts as the first intent; odd bursts end paused
        let expect_playing = toggles % 2 == 0;
        let engine = harness.coordinator.engine();
        assert_eq!(engine.wants_playback(), expect_playing);
        assert_eq!(
            engine.status(),
            if expect_playing {
                PlaybackStatus::Playing
            } else {
                PlaybackStatus::Paused
            },
            "engine status after {toggles} toggles"
        );
        assert_eq!(harness.coordinator.state().status, engine.status());
        assert_eq!(harness.output.is_playing(), expect_playing);
    }
}

#[tokio::test(start_paused = true)]
async fn test_pause_waits_for_pending_play() {
    let harness = chapter_harness();
    harness.output.set_manual(true);

    let play = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move { coordinator.play_chapter(3).await }
    });
    settle().await;

    let pause = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move { coordinator.pause().await }
    });
    settle().await;

    // queued behind the unresolved play
    assert_eq!(harness.output.calls().last().map(String::as_str), Some("play"));
    assert!(!harness.coordinator.engine().wants_playback());

    harness.output.resolve_play();
    play.await.unwrap().unwrap();
    pause.await.unwrap().unwrap();
    settle().await;

    assert_eq!(harness.output.violations(), 0);
    assert_eq!(harness.output.calls().last().map(String::as_str), Some("pause"));
    assert!(!harness.output.is_playing());
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Paused);
}

#[tokio::test(start_paused = true)]
async fn test_new_chapter_interrupts_pending_play_silently() {
    let harness = chapter_harness();
    harness.output.set_manual(true);
    let mut rx = harness.events.subscribe();

    let first = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move { coordinator.play_chapter(1).await }
    });
    settle().await;

    let second = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        async move { coordinator.play_chapter(2).await }
    });
    settle().await;
    harness.output.resolve_play();

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    settle().await;

    assert_eq!(target_chapter(&harness), Some(2));
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Playing);
    assert_eq!(harness.coordinator.last_error(), None);
    assert!(!chapter_events(&mut rx)
        .iter()
        .any(|e| matches!(e, ChapterEvent::Failed { .. })));
}

// ============================================================================
// Autoplay
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_last_chapter_wraps_to_first_after_delay() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;
    let mut rx = harness.events.subscribe();

    harness.coordinator.play_chapter(114).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;

    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Ended);
    assert!(harness.coordinator.autoplay_pending());

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(harness.resolver.chapter_requests(), vec![114]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![114, 1]);
    assert_eq!(target_chapter(&harness), Some(1));
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Playing);
    assert!(chapter_events(&mut rx).contains(&ChapterEvent::AutoplayScheduled {
        from: 114,
        to: 1,
        delay_ms: 1000
    }));
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_target_is_next_modulo_count() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;

    for id in 1..=CHAPTER_COUNT {
        harness.coordinator.play_chapter(id).await.unwrap();
        settle().await;
        harness.output.finish();
        settle().await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;

        assert_eq!(
            harness.resolver.last_chapter_request(),
            Some(id % CHAPTER_COUNT + 1)
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_ended_without_autoplay_goes_idle() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(7).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;

    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(harness.resolver.chapter_requests(), vec![7]);
    let state = harness.coordinator.state();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert_eq!(state.position_secs, 0.0);
    assert_eq!(
        harness.surface.last_playback_state(),
        Some(MediaPlaybackState::Paused)
    );
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_rechecks_preferences_when_firing() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;
    let mut rx = harness.events.subscribe();

    harness.coordinator.play_chapter(10).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;
    assert!(harness.coordinator.autoplay_pending());

    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(false))
        .await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![10]);
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Idle);
    assert!(chapter_events(&mut rx).contains(&ChapterEvent::AutoplayCancelled { chapter: 10 }));
}

#[tokio::test(start_paused = true)]
async fn test_manual_navigation_cancels_pending_autoplay() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;

    harness.coordinator.play_chapter(20).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;

    harness.coordinator.play_chapter(50).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![20, 50]);
    assert_eq!(target_chapter(&harness), Some(50));
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_autoplay() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;

    harness.coordinator.play_chapter(3).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;

    harness.coordinator.stop().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![3]);
    assert!(!harness.coordinator.autoplay_pending());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_resolution_failure_sets_error_without_chaining() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;
    harness.resolver.failing_chapters.lock().insert(5);
    let mut rx = harness.events.subscribe();

    let err = harness.coordinator.play_chapter(5).await.unwrap_err();
    assert!(err.is_user_visible());

    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;

    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Error);
    assert!(harness.coordinator.last_error().is_some());
    assert_eq!(harness.resolver.chapter_requests(), vec![5]);
    let failures: Vec<_> = chapter_events(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, ChapterEvent::Failed { chapter: 5, .. }))
        .collect();
    assert_eq!(failures.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_resolution_is_a_failure() {
    let harness = chapter_harness();
    harness.resolver.missing_chapters.lock().insert(9);

    assert!(harness.coordinator.play_chapter(9).await.is_err());
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn test_media_error_during_playback_never_chains() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;

    harness.coordinator.play_chapter(12).await.unwrap();
    settle().await;
    harness.output.fail(MediaErrorKind::Network);
    settle().await;

    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Error);
    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;
    assert_eq!(harness.resolver.chapter_requests(), vec![12]);
    assert!(!harness.coordinator.autoplay_pending());

    // A fresh request recovers
    harness.coordinator.toggle_play_pause().await.unwrap();
    settle().await;
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Playing);
    assert_eq!(harness.coordinator.last_error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_play_is_reported_once() {
    let harness = chapter_harness();
    harness
        .output
        .fail_next_play(bridge_traits::OutputError::Failed(MediaErrorKind::Decode));
    let mut rx = harness.events.subscribe();

    let err = harness.coordinator.play_chapter(4).await.unwrap_err();
    assert!(matches!(
        err,
        core_playback::PlaybackError::LoadFailed {
            kind: MediaErrorKind::Decode,
            ..
        }
    ));
    settle().await;

    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Error);
    let failures = chapter_events(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, ChapterEvent::Failed { .. }))
        .count();
    assert_eq!(failures, 1);
}

// ============================================================================
// Media control surface
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_surface_receives_metadata_and_handlers() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(1).await.unwrap();
    settle().await;

    let metadata = harness.surface.last_metadata().unwrap();
    assert_eq!(metadata.title, "Al-Fatiha");
    assert_eq!(metadata.artist, "Mishary Rashid Al Afasy");
    assert_eq!(metadata.album, "الفاتحة - The Opening");
    assert_eq!(metadata.artwork.len(), 2);
    assert_eq!(harness.surface.handlers.lock().len(), MediaAction::ALL.len());
    assert_eq!(
        harness.surface.last_playback_state(),
        Some(MediaPlaybackState::Playing)
    );

    harness.coordinator.play_chapter(77).await.unwrap();
    settle().await;
    assert_eq!(harness.surface.last_metadata().unwrap().title, "Chapter 77");
}

#[tokio::test(start_paused = true)]
async fn test_surface_commands_use_coordinator_entry_points() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(1).await.unwrap();
    harness.output.emit(OutputEvent::LoadedMetadata {
        duration: Some(100.0),
    });
    settle().await;

    assert!(harness
        .surface
        .trigger(MediaAction::Pause, MediaActionDetails::default()));
    settle().await;
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Paused);
    assert_eq!(
        harness.surface.last_playback_state(),
        Some(MediaPlaybackState::Paused)
    );

    // A second pause from the surface must not flip back to playing
    harness
        .surface
        .trigger(MediaAction::Pause, MediaActionDetails::default());
    settle().await;
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Paused);

    harness
        .surface
        .trigger(MediaAction::Play, MediaActionDetails::default());
    settle().await;
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Playing);

    harness
        .surface
        .trigger(MediaAction::SeekForward, MediaActionDetails::default());
    settle().await;
    assert_eq!(harness.coordinator.state().position_secs, 10.0);

    harness.surface.trigger(
        MediaAction::SeekBackward,
        MediaActionDetails {
            seek_offset: Some(30.0),
            seek_time: None,
        },
    );
    settle().await;
    assert_eq!(harness.coordinator.state().position_secs, 0.0);

    harness.surface.trigger(
        MediaAction::SeekTo,
        MediaActionDetails {
            seek_offset: None,
            seek_time: Some(42.0),
        },
    );
    settle().await;
    assert_eq!(harness.coordinator.state().position_secs, 42.0);

    let position = harness.surface.last_position().unwrap();
    assert_eq!(position.duration, 100.0);
    assert_eq!(position.position, 42.0);
    assert_eq!(position.playback_rate, 1.0);
}

// ============================================================================
// Chapter / verse exclusion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_verse_claim_pauses_chapter() {
    let harness = chapter_harness();
    harness.coordinator.play_chapter(2).await.unwrap();
    settle().await;

    harness.broker.claim(VerseKey::new(2, 255).unwrap());
    settle().await;

    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Paused);
    assert!(!harness.output.is_playing());

    harness.coordinator.play_chapter(3).await.unwrap();
    assert_eq!(harness.broker.intended(), None);
}

#[tokio::test(start_paused = true)]
async fn test_verse_claim_cancels_pending_autoplay() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;
    let mut rx = harness.events.subscribe();

    harness.coordinator.play_chapter(1).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;
    assert!(harness.coordinator.autoplay_pending());

    let verse = VerseKey::new(5, 1).unwrap();
    harness.broker.claim(verse);
    settle().await;
    assert!(!harness.coordinator.autoplay_pending());

    tokio::time::sleep(Duration::from_millis(1100)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![1]);
    assert_eq!(harness.broker.intended(), Some(verse));
    let state = harness.coordinator.state();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert_eq!(target_chapter(&harness), Some(1));
    assert!(chapter_events(&mut rx).contains(&ChapterEvent::AutoplayCancelled { chapter: 1 }));
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_yields_to_verse_claimed_as_it_fires() {
    let harness = chapter_harness();
    harness
        .set_prefs(PreferencesPatch::default().global_autoplay(true))
        .await;

    harness.coordinator.play_chapter(7).await.unwrap();
    settle().await;
    harness.output.finish();
    settle().await;

    // Claimed just before the delay runs out
    tokio::time::sleep(Duration::from_millis(999)).await;
    let verse = VerseKey::new(7, 3).unwrap();
    harness.broker.claim(verse);
    tokio::time::sleep(Duration::from_millis(10)).await;
    settle().await;

    assert_eq!(harness.resolver.chapter_requests(), vec![7]);
    assert_eq!(harness.broker.intended(), Some(verse));
    assert_eq!(harness.coordinator.state().status, PlaybackStatus::Idle);
}

// ============================================================================
// Resolver fallbacks
// ============================================================================

mod resolver_fallbacks {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, ChapterInfo, ContentResolver};
    use core_playback::{
        ChapterCoordinatorDeps, ChapterPlaybackCoordinator, PlaybackConfig, PlaybackEngine,
        PreferencesService,
    };
    use core_runtime::events::EventBus;
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        Resolver {}

        #[async_trait]
        impl ContentResolver for Resolver {
            async fn chapter_audio_url(&self, chapter: u16) -> BridgeResult<Option<String>>;
            async fn verse_audio_url(&self, chapter: u16, verse: u16) -> BridgeResult<Option<String>>;
            async fn verse_audio_available(&self, chapter: u16, verse: u16) -> BridgeResult<bool>;
            async fn chapter_ids(&self) -> BridgeResult<Vec<u16>>;
            async fn chapter_info(&self, chapter: u16) -> BridgeResult<Option<ChapterInfo>>;
        }
    }

    fn coordinator(resolver: MockResolver, output: Arc<FakeOutput>) -> ChapterPlaybackCoordinator {
        ChapterPlaybackCoordinator::new(ChapterCoordinatorDeps {
            engine: Arc::new(PlaybackEngine::new(output, "chapter")),
            resolver: Arc::new(resolver),
            preferences: Arc::new(PreferencesService::new(Arc::new(
                MemorySettingsStore::default(),
            ))),
            history: None,
            surface: None,
            broker: None,
            events: EventBus::new(64),
            config: PlaybackConfig::default(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_numeric_order_when_listing_fails() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_chapter_audio_url()
            .returning(|chapter| Ok(Some(format!("https://cdn.test/{chapter}.mp3"))));
        resolver
            .expect_chapter_ids()
            .returning(|| Err(BridgeError::NotAvailable("offline".to_string())));
        resolver.expect_chapter_info().returning(|_| Ok(None));

        let output = FakeOutput::new();
        let coordinator = coordinator(resolver, output.clone());

        coordinator.play_chapter(114).await.unwrap();
        coordinator.play_next().await.unwrap();
        assert_eq!(output.source().as_deref(), Some("https://cdn.test/1.mp3"));

        coordinator.play_previous().await.unwrap();
        assert_eq!(output.source().as_deref(), Some("https://cdn.test/114.mp3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_url_is_not_loaded() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_chapter_audio_url()
            .times(1)
            .returning(|_| Ok(Some("   ".to_string())));

        let output = FakeOutput::new();
        let coordinator = coordinator(resolver, output.clone());

        assert!(coordinator.play_chapter(2).await.is_err());
        assert!(output.calls().is_empty());
        assert_eq!(coordinator.state().status, PlaybackStatus::Error);
    }
}
