//! Pipeline state machine.
//!
//! `PipelineStateMachine` owns the stage factory and at most one
//! [`Pipeline`]. It builds a chain for a codec/URI pair, starts it, recovers
//! in place from transport open failures and tears the chain down in the
//! mandatory stop → wait → terminate → deinit order.
//!
//! ```text
//! Idle ─build─▶ Building ─ok─▶ Linked ─run─▶ Running
//!   ▲              │ err                        │ SourceOpenFailed
//!   │              ▼                            ▼
//!   └──────────── Idle                      Restarting ─▶ Linked ─run─▶ Running
//!   ▲
//!   └─ Destroying ◀─destroy── (any state holding a pipeline)
//! ```
//!
//! It has no knowledge of stations, persistence or UI; the orchestrator in
//! the application crate decides what to build and when.

use platform::AudioConfig;

use crate::codec::{CodecKind, TransportKind};
use crate::error::PipelineError;
use crate::events::{PipelineEvent, PipelineEventKind};
use crate::pipeline::{Pipeline, PipelineBuilder, RunState};
use crate::stage::{Generation, SinkProfile, StageFactory, StageKind, StageSpec};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// No pipeline.
    Idle,
    /// Stages are being allocated and linked.
    Building,
    /// A linked pipeline exists but is not running.
    Linked,
    /// The pipeline is running.
    Running,
    /// In-place recovery after a transport failure.
    Restarting,
    /// Teardown in progress.
    Destroying,
}

impl EngineState {
    /// Short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Linked => "linked",
            Self::Running => "running",
            Self::Restarting => "restarting",
            Self::Destroying => "destroying",
        }
    }
}

/// Result of feeding one event to [`PipelineStateMachine::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventOutcome {
    /// The event does not apply in the current state.
    Ignored,
    /// The event came from a pipeline that no longer exists.
    Stale,
    /// The pipeline was restarted in place and is running again.
    Restarted,
    /// The restart's run step failed; the pipeline is linked but stopped.
    RestartFailed,
    /// The sink was reclocked for a new stream format.
    SinkConfigured,
}

/// Counters for observability and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Successful builds.
    pub builds: u32,
    /// Builds that rolled back.
    pub failed_builds: u32,
    /// Successful run calls, restarts included.
    pub runs: u32,
    /// In-place restarts after a transport failure.
    pub restarts: u32,
    /// Completed teardowns.
    pub destroys: u32,
}

/// Builds, runs, restarts and destroys the stage chain.
///
/// Tear down with [`destroy`](Self::destroy) before dropping; drop alone
/// skips the stop and terminate calls.
pub struct PipelineStateMachine<F: StageFactory> {
    factory: F,
    sink: SinkProfile,
    pipeline: Option<Pipeline<F::Stage>>,
    state: EngineState,
    next_generation: Generation,
    format: Option<AudioConfig>,
    stats: EngineStats,
}

impl<F: StageFactory> PipelineStateMachine<F> {
    /// Create an idle engine for the installed sink profile.
    pub fn new(factory: F) -> Self {
        Self::with_sink(factory, SinkProfile::INSTALLED)
    }

    /// Create an idle engine writing to `sink`.
    pub fn with_sink(factory: F, sink: SinkProfile) -> Self {
        Self {
            factory,
            sink,
            pipeline: None,
            state: EngineState::Idle,
            next_generation: 1,
            format: None,
            stats: EngineStats::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// `true` while a pipeline exists, running or not.
    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Generation of the current pipeline, if any.
    pub fn generation(&self) -> Option<Generation> {
        self.pipeline.as_ref().map(Pipeline::generation)
    }

    /// The current pipeline, for inspection.
    pub fn pipeline(&self) -> Option<&Pipeline<F::Stage>> {
        self.pipeline.as_ref()
    }

    /// Last stream format applied to the sink.
    pub fn format(&self) -> Option<AudioConfig> {
        self.format
    }

    /// Counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// The stage factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The stage factory, mutably.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Build a linked pipeline for `codec` streamed from `uri`.
    ///
    /// On any failure every stage created so far is destroyed in reverse
    /// order and the engine returns to `Idle` with no pipeline.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidState`] if a pipeline already exists
    /// - [`PipelineError::InvalidArgument`] for an empty or unknown URI
    /// - whatever the factory or a stage's `link`/`set_uri` returned
    pub fn build(&mut self, codec: CodecKind, uri: &str) -> Result<(), PipelineError> {
        if self.pipeline.is_some() || self.state != EngineState::Idle {
            warn!("build rejected in state {}", self.state.as_str());
            return Err(PipelineError::InvalidState);
        }
        self.state = EngineState::Building;
        match self.assemble(codec, uri) {
            Ok(pipeline) => {
                info!(
                    "pipeline {} linked: {} stages, codec {}",
                    pipeline.generation(),
                    pipeline.len(),
                    codec.as_str()
                );
                self.pipeline = Some(pipeline);
                self.format = None;
                self.state = EngineState::Linked;
                self.stats.builds = self.stats.builds.saturating_add(1);
                Ok(())
            }
            Err(e) => {
                error!("pipeline build failed: {}", e);
                self.state = EngineState::Idle;
                self.stats.failed_builds = self.stats.failed_builds.saturating_add(1);
                Err(e)
            }
        }
    }

    fn assemble(
        &mut self,
        codec: CodecKind,
        uri: &str,
    ) -> Result<Pipeline<F::Stage>, PipelineError> {
        let transport = TransportKind::for_uri(uri)?;
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1).max(1);

        let mut builder = PipelineBuilder::new(&mut self.factory, generation);
        match transport {
            TransportKind::Http => builder.add(StageSpec::HttpReader)?,
            TransportKind::RawSocket => {
                builder.add(StageSpec::SocketReader { uri })?;
                builder.add(StageSpec::FrameSync)?;
            }
        }
        builder.add(StageSpec::Decoder(codec))?;
        builder.add(StageSpec::Sink(self.sink))?;
        builder.link()?;
        if transport.needs_uri() {
            builder.set_source_uri(uri)?;
        }
        builder.finish()
    }

    /// Start the linked pipeline. No retry.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidState`] unless `Linked`; otherwise the first
    /// stage error. On failure the engine stays `Linked`.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        if self.state != EngineState::Linked {
            return Err(PipelineError::InvalidState);
        }
        let pipeline = self.pipeline.as_mut().ok_or(PipelineError::InvalidState)?;
        pipeline.run().await?;
        self.state = EngineState::Running;
        self.stats.runs = self.stats.runs.saturating_add(1);
        debug!("pipeline {} running", pipeline.generation());
        Ok(())
    }

    /// React to one stage event.
    ///
    /// `SourceOpenFailed` while running triggers an in-place restart: no
    /// stage is destroyed or rebuilt. `FormatResolved` reclocks the sink in
    /// any state that holds a pipeline.
    pub async fn handle_event(&mut self, event: PipelineEvent) -> EventOutcome {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return EventOutcome::Ignored;
        };
        if event.generation != pipeline.generation() {
            debug!(
                "dropping event from pipeline {} (current {})",
                event.generation,
                pipeline.generation()
            );
            return EventOutcome::Stale;
        }
        match event.kind {
            PipelineEventKind::SourceOpenFailed => {
                if self.state == EngineState::Running {
                    self.restart().await
                } else {
                    EventOutcome::Ignored
                }
            }
            PipelineEventKind::FormatResolved(format) => {
                if let Err(e) = format.validate() {
                    warn!("decoder reported unusable format: {}", e);
                    return EventOutcome::Ignored;
                }
                match pipeline.apply_format(format) {
                    Ok(()) => {
                        info!("sink clock set to {}", format);
                        self.format = Some(format);
                        EventOutcome::SinkConfigured
                    }
                    Err(e) => {
                        warn!("sink rejected format: {}", e);
                        EventOutcome::Ignored
                    }
                }
            }
        }
    }

    async fn restart(&mut self) -> EventOutcome {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return EventOutcome::Ignored;
        };
        warn!("source open failed, restarting pipeline {}", pipeline.generation());
        self.state = EngineState::Restarting;

        if let Err(e) = pipeline.stop().await {
            warn!("restart: stop reported {}", e);
        }
        for kind in [StageKind::Decoder, StageKind::SinkWriter] {
            if let Err(e) = pipeline.reset_state(kind) {
                warn!("restart: could not reset {}: {}", kind, e);
            }
        }
        pipeline.reset_buffers();
        self.state = EngineState::Linked;
        self.stats.restarts = self.stats.restarts.saturating_add(1);

        match self.run().await {
            Ok(()) => EventOutcome::Restarted,
            Err(e) => {
                error!("restart: run failed: {}", e);
                EventOutcome::RestartFailed
            }
        }
    }

    /// Tear down the current pipeline, if any, and return to `Idle`.
    pub async fn destroy(&mut self) {
        let Some(pipeline) = self.pipeline.take() else {
            self.state = EngineState::Idle;
            return;
        };
        self.state = EngineState::Destroying;
        let generation = pipeline.generation();
        pipeline.teardown(&mut self.factory).await;
        self.format = None;
        self.state = EngineState::Idle;
        self.stats.destroys = self.stats.destroys.saturating_add(1);
        debug!("pipeline {} destroyed", generation);
    }

    /// Aggregate run state of the current pipeline.
    pub fn run_state(&self) -> Option<RunState> {
        self.pipeline.as_ref().map(Pipeline::run_state)
    }
}

/// Dropping an engine that still holds a pipeline releases its handles to
/// the factory without the stop handshake. Call [`destroy`] for an orderly
/// teardown.
///
/// [`destroy`]: PipelineStateMachine::destroy
impl<F: StageFactory> Drop for PipelineStateMachine<F> {
    fn drop(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            warn!("engine dropped with pipeline {} live, releasing stages", pipeline.generation());
            pipeline.release(&mut self.factory);
        }
    }
}
