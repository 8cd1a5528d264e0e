//! Polling tasks.
//!
//! Each control runs as its own loop on an `embassy_time::Timer`. A loop
//! owns its control state outright; the only shared state is the selected
//! station, which belongs to the [`Player`](crate::player::Player) task and
//! reaches the others through channels and signals.
//!
//! The `*_tick` functions hold the logic of one iteration so tests can drive
//! them without a timer.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use platform::config::{BITRATE_INTERVAL_MS, BUTTON_DEBOUNCE_MS, BUTTON_POLL_MS, VOLUME_POLL_MS};
use platform::{
    AudioCodec, KeyValueStore, PulseCounter, PushButton, ScreenId, UiSink, UiUpdate,
    VolumePercent,
};
use playback::TransferCounter;
use ui::ScreenModel;

use crate::input::{Debouncer, MuteChange, PollOutcome, PollPhase, StationSelector, VolumeControl};
use crate::monitor::{ThroughputMonitor, ThroughputReport};
use crate::player::{ResyncSignal, StationRequest, REQUEST_QUEUE_DEPTH};
use crate::settings::save_volume;
use crate::ui_queue::UI_QUEUE_DEPTH;

/// Raised by the button task on each debounced mute press.
pub type MuteSignal = Signal<CriticalSectionRawMutex, ()>;

/// Sending half of a [`RequestChannel`](crate::player::RequestChannel).
pub type RequestSender<'a> =
    Sender<'a, CriticalSectionRawMutex, StationRequest, REQUEST_QUEUE_DEPTH>;

/// Receiving half of a [`UiChannel`](crate::ui_queue::UiChannel).
pub type UiReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, UiUpdate, UI_QUEUE_DEPTH>;

fn request(tx: &RequestSender<'_>, req: StationRequest) {
    if tx.try_send(req).is_err() {
        warn!("station request queue full, request dropped");
    }
}

async fn apply_volume<C: AudioCodec>(codec: &mut C, volume: VolumePercent) {
    if codec.set_volume(volume).await.is_err() {
        warn!("codec rejected volume {}", volume);
    }
}

// ── Volume ───────────────────────────────────────────────────────────────────

/// One volume knob poll: apply, show and persist a changed value.
pub async fn volume_tick<C, U, S>(
    control: &mut VolumeControl,
    raw: i32,
    codec: &mut C,
    ui: &U,
    store: &S,
) -> Option<VolumePercent>
where
    C: AudioCodec,
    U: UiSink,
    S: KeyValueStore,
{
    let volume = control.poll(raw)?;
    apply_volume(codec, volume).await;
    ui.post(UiUpdate::Volume(volume));
    save_volume(store, volume);
    Some(volume)
}

/// React to a mute press.
///
/// Muting applies 0 without persisting. Unmuting clears the knob's pulse
/// counter so the restored value becomes the new zero point.
pub async fn mute_toggled<K, C, U, S>(
    control: &mut VolumeControl,
    knob: &K,
    codec: &mut C,
    ui: &U,
    store: &S,
) -> MuteChange
where
    K: PulseCounter,
    C: AudioCodec,
    U: UiSink,
    S: KeyValueStore,
{
    let change = control.toggle_mute();
    match change {
        MuteChange::Muted => {
            info!("muted");
            apply_volume(codec, VolumePercent::MUTED).await;
            ui.post(UiUpdate::Volume(VolumePercent::MUTED));
        }
        MuteChange::Unmuted(volume) => {
            info!("unmuted at {}", volume);
            knob.clear();
            apply_volume(codec, volume).await;
            ui.post(UiUpdate::Volume(volume));
            save_volume(store, volume);
        }
    }
    change
}

/// Zero the knob so `control`'s restored value is the starting point, then
/// apply and show it.
pub async fn volume_start<K, C, U>(control: &VolumeControl, knob: &K, codec: &mut C, ui: &U)
where
    K: PulseCounter,
    C: AudioCodec,
    U: UiSink,
{
    knob.clear();
    apply_volume(codec, control.effective()).await;
    ui.post(UiUpdate::Volume(control.effective()));
}

/// Volume knob loop. Polls every [`VOLUME_POLL_MS`] and handles mute
/// presses in between.
pub async fn volume_task<K, C, U, S>(
    mut control: VolumeControl,
    knob: &K,
    mute: &MuteSignal,
    mut codec: C,
    ui: U,
    store: S,
)
where
    K: PulseCounter,
    C: AudioCodec,
    U: UiSink,
    S: KeyValueStore,
{
    volume_start(&control, knob, &mut codec, &ui).await;
    loop {
        match select(Timer::after_millis(VOLUME_POLL_MS), mute.wait()).await {
            Either::First(()) => {
                volume_tick(&mut control, knob.count(), &mut codec, &ui, &store).await;
            }
            Either::Second(()) => {
                mute_toggled(&mut control, knob, &mut codec, &ui, &store).await;
            }
        }
    }
}

/// Mute button loop: debounce and raise [`MuteSignal`] once per press.
pub async fn button_task<B: PushButton>(button: &B, mute: &MuteSignal) {
    let mut debouncer = Debouncer::new(Duration::from_millis(BUTTON_DEBOUNCE_MS));
    loop {
        Timer::after_millis(BUTTON_POLL_MS).await;
        if debouncer.sample(button.is_pressed(), Instant::now()) {
            mute.signal(());
        }
    }
}

// ── Station ──────────────────────────────────────────────────────────────────

/// One station knob poll.
///
/// The first movement opens the station select screen; the roller follows
/// every move; a commit returns home and asks the player to tune.
pub fn station_tick<U: UiSink>(
    selector: &mut StationSelector,
    raw: i32,
    now: Instant,
    ui: &U,
    requests: &RequestSender<'_>,
) -> PollOutcome {
    let was_resting = selector.phase() == PollPhase::Slow;
    let outcome = selector.poll(raw, now);
    match outcome {
        PollOutcome::Moved(index) => {
            if was_resting {
                ui.post(UiUpdate::ShowScreen(ScreenId::StationSelect));
            }
            ui.post(UiUpdate::StationRoller(index));
        }
        PollOutcome::Commit(index) => {
            debug!("station knob settled on {}", index);
            ui.post(UiUpdate::ShowScreen(ScreenId::Home));
            request(requests, StationRequest::Select(index));
        }
        PollOutcome::Idle => {}
    }
    outcome
}

/// Station knob loop with adaptive period.
pub async fn station_task<K: PulseCounter, U: UiSink>(
    mut selector: StationSelector,
    knob: &K,
    resync: &ResyncSignal,
    ui: U,
    requests: RequestSender<'_>,
) {
    loop {
        Timer::after(selector.interval()).await;
        if let Some(index) = resync.try_take() {
            selector.resync(index, knob.count());
        }
        station_tick(&mut selector, knob.count(), Instant::now(), &ui, &requests);
    }
}

// ── Throughput ───────────────────────────────────────────────────────────────

/// One throughput sample: update the bitrate label, reload on a stall.
pub fn throughput_tick<U: UiSink>(
    monitor: &mut ThroughputMonitor,
    total: u32,
    now: Instant,
    ui: &U,
    requests: &RequestSender<'_>,
) -> ThroughputReport {
    let report = monitor.sample(total, now);
    trace!("throughput {} kbps (avg {})", report.current_kbps, report.average_kbps);
    ui.post(UiUpdate::Bitrate(report.average_kbps));
    if report.stalled {
        error!("no stream data for a full window, reloading station");
        request(requests, StationRequest::Reload);
        monitor.rearm(now, total);
    }
    report
}

/// Throughput loop, once per [`BITRATE_INTERVAL_MS`].
pub async fn throughput_task<U: UiSink>(
    bytes: &TransferCounter,
    ui: U,
    requests: RequestSender<'_>,
) {
    let mut monitor = ThroughputMonitor::new(Instant::now(), bytes.total());
    loop {
        Timer::after_millis(BITRATE_INTERVAL_MS).await;
        throughput_tick(&mut monitor, bytes.total(), Instant::now(), &ui, &requests);
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

/// Drain UI updates into the screen model. Drawing belongs to the display
/// driver, which redraws from `model` whenever this reports a change.
pub async fn ui_task(rx: UiReceiver<'_>, model: &mut ScreenModel) {
    loop {
        let update = rx.receive().await;
        if model.apply(update) {
            let np = model.now_playing();
            debug!(
                "screen {}: {} / {} vol {} {}",
                model.screen().as_str(),
                np.station_name.as_str(),
                np.location.as_str(),
                np.volume,
                np.bitrate_text().as_str()
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use platform::config::{STATION_DWELL_MS, VOLUME_KEY};
    use platform::mocks::{MemoryStore, MockCodec, MockPulseCounter, RecordingUi};

    use crate::player::RequestChannel;

    fn vol(v: u8) -> VolumePercent {
        VolumePercent::new(v)
    }

    // ── Volume ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_volume_change_applied_shown_and_saved() {
        let mut control = VolumeControl::new(vol(70));
        let mut codec = MockCodec::new();
        let ui = RecordingUi::new();
        let store = MemoryStore::new();

        // +6 detents: 70 → 100
        let v = volume_tick(&mut control, 24, &mut codec, &ui, &store).await;
        assert_eq!(v, Some(vol(100)));
        assert_eq!(codec.volume(), Some(vol(100)));
        assert_eq!(ui.take(), [UiUpdate::Volume(vol(100))]);
        assert_eq!(store.peek(VOLUME_KEY), Some(100));

        // +1 more detent: clamped, nothing emitted.
        let v = volume_tick(&mut control, 28, &mut codec, &ui, &store).await;
        assert_eq!(v, None);
        assert!(ui.take().is_empty());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_start_clears_stale_knob_count() {
        let control = VolumeControl::new(vol(40));
        let knob = MockPulseCounter::new();
        knob.set(37);
        let mut codec = MockCodec::new();
        let ui = RecordingUi::new();

        volume_start(&control, &knob, &mut codec, &ui).await;
        assert_eq!(knob.count(), 0);
        assert_eq!(knob.clear_count(), 1);
        assert_eq!(codec.volume(), Some(vol(40)));
        assert_eq!(ui.take(), [UiUpdate::Volume(vol(40))]);

        // The first detent after boot moves one step from the restored value.
        let mut control = control;
        knob.turn(1);
        let v = volume_tick(&mut control, knob.count(), &mut codec, &ui, &MemoryStore::new()).await;
        assert_eq!(v, Some(vol(45)));
    }

    #[tokio::test]
    async fn test_unchanged_poll_writes_nothing() {
        let mut control = VolumeControl::new(vol(30));
        let mut codec = MockCodec::new();
        let store = MemoryStore::new();
        volume_tick(&mut control, 2, &mut codec, &RecordingUi::new(), &store).await;
        assert!(codec.history.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_mute_then_unmute_restores_and_clears_knob() {
        let mut control = VolumeControl::new(vol(30));
        let knob = MockPulseCounter::new();
        let mut codec = MockCodec::new();
        let ui = RecordingUi::new();
        let store = MemoryStore::new();

        knob.turn(2);
        volume_tick(&mut control, knob.count(), &mut codec, &ui, &store).await;
        assert_eq!(control.value(), vol(40));

        let change = mute_toggled(&mut control, &knob, &mut codec, &ui, &store).await;
        assert_eq!(change, MuteChange::Muted);
        assert_eq!(codec.volume(), Some(VolumePercent::MUTED));
        assert_eq!(store.peek(VOLUME_KEY), Some(40));

        let change = mute_toggled(&mut control, &knob, &mut codec, &ui, &store).await;
        assert_eq!(change, MuteChange::Unmuted(vol(40)));
        assert_eq!(knob.count(), 0);
        assert_eq!(knob.clear_count(), 1);
        assert_eq!(codec.volume(), Some(vol(40)));

        // Next detent continues from the restored value.
        knob.turn(1);
        let v = volume_tick(&mut control, knob.count(), &mut codec, &ui, &store).await;
        assert_eq!(v, Some(vol(45)));
    }

    #[tokio::test]
    async fn test_codec_failure_does_not_block_ui_or_store() {
        let mut control = VolumeControl::new(vol(10));
        let mut codec = MockCodec::new();
        codec.fail = true;
        let ui = RecordingUi::new();
        let store = MemoryStore::new();
        volume_tick(&mut control, 4, &mut codec, &ui, &store).await;
        assert_eq!(ui.take(), [UiUpdate::Volume(vol(15))]);
        assert_eq!(store.peek(VOLUME_KEY), Some(15));
    }

    // ── Station ──────────────────────────────────────────────────────────────

    #[test]
    fn test_station_turn_opens_select_then_commit_requests_switch() {
        let mut selector = StationSelector::new(16, 0, 0).unwrap();
        let ui = RecordingUi::new();
        let requests = RequestChannel::new();
        let tx = requests.sender();

        let t0 = Instant::from_millis(1_000);
        station_tick(&mut selector, 4, t0, &ui, &tx);
        station_tick(&mut selector, 8, t0 + Duration::from_millis(20), &ui, &tx);
        assert_eq!(
            ui.take(),
            [
                UiUpdate::ShowScreen(ScreenId::StationSelect),
                UiUpdate::StationRoller(1),
                UiUpdate::StationRoller(2),
            ]
        );
        assert!(requests.try_receive().is_err());

        let settled = t0 + Duration::from_millis(20 + STATION_DWELL_MS);
        let outcome = station_tick(&mut selector, 8, settled, &ui, &tx);
        assert_eq!(outcome, PollOutcome::Commit(2));
        assert_eq!(ui.take(), [UiUpdate::ShowScreen(ScreenId::Home)]);
        assert_eq!(requests.try_receive().unwrap(), StationRequest::Select(2));
    }

    #[test]
    fn test_request_queue_full_drops_without_blocking() {
        let requests = RequestChannel::new();
        let tx = requests.sender();
        for _ in 0..=REQUEST_QUEUE_DEPTH {
            request(&tx, StationRequest::Next);
        }
        assert_eq!(requests.len(), REQUEST_QUEUE_DEPTH);
    }

    // ── Throughput ───────────────────────────────────────────────────────────

    #[test]
    fn test_stall_requests_reload_once() {
        let mut monitor = ThroughputMonitor::new(Instant::from_millis(0), 0);
        let ui = RecordingUi::new();
        let requests = RequestChannel::new();
        let tx = requests.sender();

        let mut reloads = 0;
        for s in 1..=20u64 {
            let report = throughput_tick(&mut monitor, 0, Instant::from_millis(s * 1_000), &ui, &tx);
            if report.stalled {
                reloads += 1;
            }
        }
        assert_eq!(reloads, 1);
        assert_eq!(requests.try_receive().unwrap(), StationRequest::Reload);
        assert!(requests.try_receive().is_err());
        assert!(ui.updates().iter().all(|u| *u == UiUpdate::Bitrate(0)));
    }

    #[test]
    fn test_bitrate_label_follows_average() {
        let mut monitor = ThroughputMonitor::new(Instant::from_millis(0), 0);
        let ui = RecordingUi::new();
        let requests = RequestChannel::new();
        let tx = requests.sender();
        let mut total = 0u32;
        for s in 1..=10u64 {
            total = total.wrapping_add(16_000);
            throughput_tick(&mut monitor, total, Instant::from_millis(s * 1_000), &ui, &tx);
        }
        assert_eq!(ui.updates().last(), Some(&UiUpdate::Bitrate(128)));
    }
}
