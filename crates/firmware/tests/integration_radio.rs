//! Integration test: boot, knob selection, stall recovery and shutdown with
//! simulated stages and mock peripherals.
//!
//! Run with: cargo test -p firmware --test integration_radio

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
)]

use core::num::NonZeroU32;

use embassy_time::{Duration, Instant, Timer};
use firmware::input::{PollOutcome, StationSelector};
use firmware::monitor::ThroughputMonitor;
use firmware::sim::{nominal_format, SimShared, SimStageFactory};
use firmware::tasks::{station_tick, throughput_tick};
use firmware::{builtin_stations, Player, RequestChannel, ResyncSignal, Settings, StationRequest};
use platform::config::{STATION_INDEX_KEY, VOLUME_KEY};
use platform::mocks::{MemoryStore, MockPulseCounter, RecordingUi};
use platform::{PulseCounter, ScreenId, UiUpdate};
use playback::{EngineState, EventChannel, EventOutcome, PipelineStateMachine};

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

// -- Boot -----------------------------------------------------------------

#[tokio::test]
async fn boot_restores_settings_and_plays_saved_station() {
    let stations = builtin_stations();
    let store = MemoryStore::with(&[(VOLUME_KEY, 40), (STATION_INDEX_KEY, 3)]);
    let settings = Settings::restore(&store, stations.len());
    assert_eq!(settings.volume.get(), 40);
    assert_eq!(settings.station_index, 3);

    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();
    let factory = SimStageFactory::new(events.sender(), &shared, None);
    let mut player = Player::new(
        PipelineStateMachine::new(factory),
        &stations,
        settings.station_index,
        &ui,
        &store,
        &resync,
    )
    .unwrap();

    player.start().await.unwrap();
    assert_eq!(player.engine().state(), EngineState::Running);
    assert!(shared.is_streaming());
    assert_eq!(resync.try_take(), Some(3));

    let updates = ui.take();
    assert!(updates.contains(&UiUpdate::StationName(stations[3].call_sign.clone())));
    assert!(updates.contains(&UiUpdate::StationLocation(stations[3].location.clone())));
    assert!(updates.contains(&UiUpdate::StationRoller(3)));

    let event = events.try_receive().unwrap();
    assert_eq!(player.handle_event(event).await, EventOutcome::SinkConfigured);
    assert_eq!(player.engine().format(), Some(nominal_format(stations[3].codec)));
}

#[tokio::test]
async fn boot_with_corrupt_store_falls_back_to_first_station() {
    let stations = builtin_stations();
    let store = MemoryStore::with(&[(VOLUME_KEY, 250), (STATION_INDEX_KEY, 99)]);
    let settings = Settings::restore(&store, stations.len());
    assert_eq!(settings.volume.get(), 0);
    assert_eq!(settings.station_index, 0);
}

// -- Station knob ---------------------------------------------------------

#[tokio::test]
async fn knob_turn_settles_and_tunes() {
    let stations = builtin_stations();
    let store = MemoryStore::new();
    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();
    let requests = RequestChannel::new();
    let tx = requests.sender();
    let knob = MockPulseCounter::new();

    let factory = SimStageFactory::new(events.sender(), &shared, None);
    let mut player =
        Player::new(PipelineStateMachine::new(factory), &stations, 3, &ui, &store, &resync)
            .unwrap();
    player.start().await.unwrap();
    resync.reset();
    ui.take();

    let mut selector = StationSelector::new(stations.len(), 3, knob.count()).unwrap();
    knob.turn(2);
    assert_eq!(
        station_tick(&mut selector, knob.count(), at(0), &ui, &tx),
        PollOutcome::Moved(5)
    );
    assert_eq!(
        ui.take(),
        vec![
            UiUpdate::ShowScreen(ScreenId::StationSelect),
            UiUpdate::StationRoller(5)
        ]
    );
    // Nothing tunes while the knob is still turning.
    assert!(requests.try_receive().is_err());
    assert_eq!(player.current(), 3);

    assert_eq!(
        station_tick(&mut selector, knob.count(), at(1_500), &ui, &tx),
        PollOutcome::Commit(5)
    );
    let request = requests.try_receive().unwrap();
    assert_eq!(request, StationRequest::Select(5));

    player.handle_request(request).await.unwrap();
    assert_eq!(player.current(), 5);
    assert_eq!(store.peek(STATION_INDEX_KEY), Some(5));
    assert_eq!(resync.try_take(), Some(5));
    assert_eq!(player.engine().state(), EngineState::Running);
}

#[tokio::test]
async fn next_request_moves_knob_baseline() {
    let stations = builtin_stations();
    let store = MemoryStore::new();
    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();
    let requests = RequestChannel::new();
    let tx = requests.sender();
    let knob = MockPulseCounter::new();

    let factory = SimStageFactory::new(events.sender(), &shared, None);
    let mut player =
        Player::new(PipelineStateMachine::new(factory), &stations, 0, &ui, &store, &resync)
            .unwrap();
    let mut selector = StationSelector::new(stations.len(), 0, knob.count()).unwrap();

    player.handle_request(StationRequest::Next).await.unwrap();
    selector.resync(resync.try_take().unwrap(), knob.count());
    assert_eq!(selector.index(), 1);

    // One detent from the resynced baseline.
    knob.turn(1);
    assert_eq!(
        station_tick(&mut selector, knob.count(), at(0), &ui, &tx),
        PollOutcome::Moved(2)
    );
}

// -- Stall recovery -------------------------------------------------------

#[tokio::test]
async fn stalled_stream_reloads_station() {
    let stations = builtin_stations();
    let store = MemoryStore::new();
    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();
    let requests = RequestChannel::new();
    let tx = requests.sender();

    let factory = SimStageFactory::new(events.sender(), &shared, None);
    let mut player =
        Player::new(PipelineStateMachine::new(factory), &stations, 2, &ui, &store, &resync)
            .unwrap();
    player.start().await.unwrap();
    let first_generation = player.engine().generation();

    let mut monitor =
        ThroughputMonitor::with_timing(at(0), 0, 1_000, Duration::from_secs(15));
    let mut stalled_at = None;
    for second in 1..=20 {
        let report = throughput_tick(&mut monitor, 0, at(second * 1_000), &ui, &tx);
        if report.stalled {
            stalled_at = Some(second);
            break;
        }
    }
    assert_eq!(stalled_at, Some(16));

    let request = requests.try_receive().unwrap();
    assert_eq!(request, StationRequest::Reload);
    player.handle_request(request).await.unwrap();

    assert_eq!(player.current(), 2);
    assert_eq!(shared.source_runs(), 2);
    assert_ne!(player.engine().generation(), first_generation);
    assert_eq!(player.engine().state(), EngineState::Running);
}

#[tokio::test]
async fn injected_open_failure_restarts_in_place() {
    let stations = builtin_stations();
    let store = MemoryStore::new();
    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();

    let factory = SimStageFactory::new(events.sender(), &shared, NonZeroU32::new(2));
    let mut player =
        Player::new(PipelineStateMachine::new(factory), &stations, 0, &ui, &store, &resync)
            .unwrap();
    player.start().await.unwrap();
    while let Ok(event) = events.try_receive() {
        player.handle_event(event).await;
    }

    player.handle_request(StationRequest::Next).await.unwrap();
    assert!(!shared.is_streaming());
    let generation = player.engine().generation();

    let mut outcomes = Vec::new();
    while let Ok(event) = events.try_receive() {
        outcomes.push(player.handle_event(event).await);
    }
    assert!(outcomes.contains(&EventOutcome::Restarted));
    assert!(shared.is_streaming());
    // Restart reuses the pipeline.
    assert_eq!(player.engine().generation(), generation);
    assert_eq!(player.current(), 1);
}

// -- Shutdown -------------------------------------------------------------

#[tokio::test]
async fn run_until_serves_requests_then_tears_down() {
    let stations = builtin_stations();
    let store = MemoryStore::new();
    let events = EventChannel::new();
    let shared = SimShared::new();
    let ui = RecordingUi::new();
    let resync = ResyncSignal::new();
    let requests = RequestChannel::new();

    let factory = SimStageFactory::new(events.sender(), &shared, None);
    let mut player =
        Player::new(PipelineStateMachine::new(factory), &stations, 0, &ui, &store, &resync)
            .unwrap();
    player.start().await.unwrap();

    requests.try_send(StationRequest::Previous).unwrap();
    player
        .run_until(
            events.receiver(),
            requests.receiver(),
            Timer::after_millis(50),
        )
        .await;

    assert_eq!(player.current(), stations.len() - 1);
    assert!(!player.engine().has_pipeline());
    assert!(!shared.is_streaming());
    assert_eq!(store.peek(STATION_INDEX_KEY), Some(i32::try_from(stations.len() - 1).unwrap()));
}
