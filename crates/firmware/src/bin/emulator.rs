//! Airwave desktop emulator
//!
//! Runs the real control tasks and player against simulated stages, with
//! the knobs and mute button driven from stdin.
//!
//! Run with: cargo run -p firmware --bin emulator --features emulator
//!
//! ```text
//! +  / -   volume knob one detent up / down
//! >  / <   station knob one detent forward / back
//! m        press mute
//! n  / p   next / previous station
//! r        reload the current station
//! q        quit
//! ```

// Desktop binary: unwrap/expect acceptable, missing docs on private items fine.
#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

use std::convert::Infallible;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use embassy_futures::join::{join3, join5};
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use platform::mocks::{MockButton, MockPulseCounter};
use platform::storage_local::FileKeyValueStore;
use platform::{AudioCodec, PulseCounter, VolumePercent};
use playback::{EventChannel, PipelineStateMachine, TransferCounter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use ui::ScreenModel;

use firmware::input::{StationSelector, VolumeControl};
use firmware::sim::{self, SimShared, SimStageFactory};
use firmware::tasks::{self, MuteSignal, RequestSender};
use firmware::{builtin_stations, Player, RequestChannel, ResyncSignal, Settings, StationRequest};
use firmware::{UiChannel, UiQueue};

/// How long a console `m` holds the button down.
const PRESS_MS: u64 = 80;

#[derive(Parser)]
#[command(name = "emulator")]
#[command(about = "Airwave radio desktop emulator", long_about = None)]
#[command(version)]
struct Args {
    /// Start on this station instead of the saved one
    #[arg(long)]
    station: Option<usize>,

    /// JSON file holding persisted volume and station
    #[arg(long, default_value = "airwave-state.json")]
    state: PathBuf,

    /// Fail every N-th source open to exercise in-place restarts
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..))]
    fail_every: Option<u32>,
}

/// Codec stand-in that logs the applied level.
struct ConsoleCodec;

impl AudioCodec for ConsoleCodec {
    type Error = Infallible;

    async fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Infallible> {
        info!(%volume, "codec volume");
        Ok(())
    }
}

/// Emulated front panel.
struct Panel {
    volume_knob: MockPulseCounter,
    station_knob: MockPulseCounter,
    mute: MockButton,
}

type QuitSignal = Signal<CriticalSectionRawMutex, ()>;

async fn press(button: &MockButton) {
    button.set_pressed(true);
    tokio::time::sleep(Duration::from_millis(PRESS_MS)).await;
    button.set_pressed(false);
}

fn send(requests: &RequestSender<'_>, request: StationRequest) {
    if requests.try_send(request).is_err() {
        warn!("request queue full");
    }
}

/// Read commands from stdin until `q` or end of input.
async fn console_task(panel: &Panel, requests: RequestSender<'_>, quit: &QuitSignal) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("stdin: {e}");
                break;
            }
        };
        for command in line.trim().chars() {
            match command {
                '+' => panel.volume_knob.turn(1),
                '-' => panel.volume_knob.turn(-1),
                '>' => panel.station_knob.turn(1),
                '<' => panel.station_knob.turn(-1),
                'm' => press(&panel.mute).await,
                'n' => send(&requests, StationRequest::Next),
                'p' => send(&requests, StationRequest::Previous),
                'r' => send(&requests, StationRequest::Reload),
                'q' => {
                    quit.signal(());
                    return;
                }
                other => warn!("unknown command {other}"),
            }
        }
    }
    quit.signal(());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,firmware=debug")),
        )
        .init();

    let stations = builtin_stations();
    let store = FileKeyValueStore::open(&args.state)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("opening {}", args.state.display()))?;

    let mut settings = Settings::restore(&store, stations.len());
    if let Some(index) = args.station {
        if index >= stations.len() {
            bail!("station {index} out of range (0..{})", stations.len());
        }
        settings.station_index = index;
    }
    info!(
        station = settings.station_index,
        volume = %settings.volume,
        state = %store.path().display(),
        "booting"
    );

    // Channels
    let events = EventChannel::new();
    let requests = RequestChannel::new();
    let ui_channel = UiChannel::new();
    let resync = ResyncSignal::new();
    let mute = MuteSignal::new();
    let quit = QuitSignal::new();

    // Emulated hardware
    let panel = Panel {
        volume_knob: MockPulseCounter::new(),
        station_knob: MockPulseCounter::new(),
        mute: MockButton::new(),
    };
    let shared = SimShared::new();
    let bytes = TransferCounter::new();
    let ui = UiQueue::new(&ui_channel);
    let mut model = ScreenModel::new();

    let factory = SimStageFactory::new(
        events.sender(),
        &shared,
        args.fail_every.and_then(NonZeroU32::new),
    );
    let mut player = Player::new(
        PipelineStateMachine::new(factory),
        &stations,
        settings.station_index,
        ui,
        &store,
        &resync,
    )
    .map_err(|e| anyhow!("{e}"))?;

    if let Err(e) = player.start().await {
        error!("boot station failed: {e}");
    }

    let selector = StationSelector::new(
        stations.len(),
        settings.station_index,
        panel.station_knob.count(),
    )
    .context("station list is empty")?;

    let shutdown = async {
        select(tokio::signal::ctrl_c(), quit.wait()).await;
    };

    let started = Instant::now();
    select(
        player.run_until(events.receiver(), requests.receiver(), shutdown),
        join5(
            tasks::volume_task(
                VolumeControl::new(settings.volume),
                &panel.volume_knob,
                &mute,
                ConsoleCodec,
                ui,
                &store,
            ),
            tasks::button_task(&panel.mute, &mute),
            tasks::station_task(
                selector,
                &panel.station_knob,
                &resync,
                ui,
                requests.sender(),
            ),
            tasks::throughput_task(&bytes, ui, requests.sender()),
            join3(
                tasks::ui_task(ui_channel.receiver(), &mut model),
                sim::stream_task(&shared, &bytes),
                console_task(&panel, requests.sender(), &quit),
            ),
        ),
    )
    .await;

    info!(
        uptime_s = started.elapsed().as_secs(),
        bytes = bytes.total(),
        "emulator stopped"
    );
    Ok(())
}
