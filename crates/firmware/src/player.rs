//! Station switch orchestrator.
//!
//! [`Player`] is the single owner of the pipeline engine, the selected
//! station index and the station list. Every request that changes what is
//! playing (knob commit, next/previous, boot restore, stall reload) goes
//! through one transition:
//!
//! ```text
//! validate ─▶ same index? ─yes─▶ done
//!                 │ no
//!                 ▼
//! destroy ─▶ select ─▶ resync knob ─▶ persist ─▶ labels ─▶ build ─▶ run
//! ```
//!
//! A failed build or run leaves nothing playing. The labels already show the
//! new station; there is no fallback to the previous one and no retry.

use core::future::Future;
use core::pin::pin;

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_sync::signal::Signal;
use platform::{KeyValueStore, UiSink, UiUpdate};
use playback::events::EVENT_QUEUE_DEPTH;
use playback::{EventOutcome, PipelineError, PipelineEvent, PipelineStateMachine, StageFactory};

use crate::settings::save_station_index;
use crate::stations::Station;

/// Depth of the station request channel.
pub const REQUEST_QUEUE_DEPTH: usize = 4;

/// A request to change what is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationRequest {
    /// Tune to this index.
    Select(usize),
    /// Next station, wrapping.
    Next,
    /// Previous station, wrapping.
    Previous,
    /// Tear down and rebuild the current station.
    Reload,
}

/// Channel carrying [`StationRequest`]s to the player task.
pub type RequestChannel = Channel<CriticalSectionRawMutex, StationRequest, REQUEST_QUEUE_DEPTH>;

/// Receiving half of a [`RequestChannel`].
pub type RequestReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, StationRequest, REQUEST_QUEUE_DEPTH>;

/// Receiving half of a [`playback::EventChannel`].
pub type EventReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, PipelineEvent, EVENT_QUEUE_DEPTH>;

/// Carries the newly selected index to the station knob task.
pub type ResyncSignal = Signal<CriticalSectionRawMutex, usize>;

/// Owns the engine and the selection.
pub struct Player<'a, F: StageFactory, U: UiSink, S: KeyValueStore> {
    engine: PipelineStateMachine<F>,
    stations: &'a [Station],
    current: usize,
    ui: U,
    store: S,
    resync: &'a ResyncSignal,
}

impl<'a, F: StageFactory, U: UiSink, S: KeyValueStore> Player<'a, F, U, S> {
    /// Player over `stations` with `current` selected. Nothing plays until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] if the list is empty or `current`
    /// is out of range.
    pub fn new(
        engine: PipelineStateMachine<F>,
        stations: &'a [Station],
        current: usize,
        ui: U,
        store: S,
        resync: &'a ResyncSignal,
    ) -> Result<Self, PipelineError> {
        if current >= stations.len() {
            return Err(PipelineError::InvalidArgument);
        }
        Ok(Self {
            engine,
            stations,
            current,
            ui,
            store,
            resync,
        })
    }

    /// Selected index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Selected station.
    pub fn station(&self) -> Option<&Station> {
        self.stations.get(self.current)
    }

    /// The pipeline engine.
    pub fn engine(&self) -> &PipelineStateMachine<F> {
        &self.engine
    }

    /// Play the selected station. Used once at boot.
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        self.switch_to(self.current).await
    }

    /// Switch to `index`. A no-op when it is already selected.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] for an index out of range, else
    /// whatever build or run returned.
    pub async fn change_station(&mut self, index: usize) -> Result<(), PipelineError> {
        if index >= self.stations.len() {
            warn!("station index {} out of range", index);
            return Err(PipelineError::InvalidArgument);
        }
        if index == self.current {
            debug!("station {} already selected", index);
            return Ok(());
        }
        self.switch_to(index).await
    }

    /// Advance one station, wrapping at the end.
    pub async fn next_station(&mut self) -> Result<(), PipelineError> {
        let next = self
            .current
            .checked_add(1)
            .and_then(|i| i.checked_rem(self.stations.len()))
            .unwrap_or(0);
        self.change_station(next).await
    }

    /// Go back one station, wrapping at the start.
    pub async fn previous_station(&mut self) -> Result<(), PipelineError> {
        let prev = self
            .current
            .checked_sub(1)
            .unwrap_or_else(|| self.stations.len().saturating_sub(1));
        self.change_station(prev).await
    }

    /// Rebuild the current station from scratch.
    pub async fn reload(&mut self) -> Result<(), PipelineError> {
        info!("reloading station {}", self.current);
        self.switch_to(self.current).await
    }

    async fn switch_to(&mut self, index: usize) -> Result<(), PipelineError> {
        let stations = self.stations;
        let station = stations.get(index).ok_or(PipelineError::InvalidArgument)?;

        self.engine.destroy().await;

        self.current = index;
        self.resync.signal(index);
        save_station_index(&self.store, index);
        self.ui.post(UiUpdate::StationName(station.call_sign.clone()));
        self.ui.post(UiUpdate::StationLocation(station.location.clone()));
        self.ui.post(UiUpdate::StationRoller(index));

        info!(
            "tuning to {} ({}) {}",
            station.call_sign.as_str(),
            station.location.as_str(),
            station.codec
        );
        self.engine.build(station.codec, &station.uri)?;
        if let Err(e) = self.engine.run().await {
            error!("station {} failed to start: {}", station.call_sign.as_str(), e);
            self.engine.destroy().await;
            return Err(e);
        }
        Ok(())
    }

    /// Apply one request.
    pub async fn handle_request(&mut self, request: StationRequest) -> Result<(), PipelineError> {
        match request {
            StationRequest::Select(index) => self.change_station(index).await,
            StationRequest::Next => self.next_station().await,
            StationRequest::Previous => self.previous_station().await,
            StationRequest::Reload => self.reload().await,
        }
    }

    /// Forward one stage event to the engine.
    pub async fn handle_event(&mut self, event: PipelineEvent) -> EventOutcome {
        let outcome = self.engine.handle_event(event).await;
        if outcome == EventOutcome::RestartFailed {
            error!("station {} could not be restarted", self.current);
        }
        outcome
    }

    /// Serve events and requests until `shutdown` completes, then tear the
    /// pipeline down.
    pub async fn run_until(
        &mut self,
        events: EventReceiver<'_>,
        requests: RequestReceiver<'_>,
        shutdown: impl Future,
    ) {
        let mut shutdown = pin!(shutdown);
        loop {
            match select3(events.receive(), requests.receive(), &mut shutdown).await {
                Either3::First(event) => {
                    self.handle_event(event).await;
                }
                Either3::Second(request) => {
                    // Failures are logged inside the transition.
                    let _ = self.handle_request(request).await;
                }
                Either3::Third(_) => break,
            }
        }
        info!("player shutting down");
        self.engine.destroy().await;
    }
}
