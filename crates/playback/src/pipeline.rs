//! Pipeline container and the rollback-on-drop builder that produces it.
//!
//! A [`Pipeline`] only exists fully linked. [`PipelineBuilder`] accumulates
//! stages while building and, if it is dropped before
//! [`finish`](PipelineBuilder::finish), hands every stage it created back to
//! the factory in reverse creation order. Callers can therefore bail out of
//! any build step with `?` and never observe a half-built chain.

use platform::AudioConfig;

use crate::error::PipelineError;
use crate::stage::{Generation, Stage, StageFactory, StageKind, StageSpec, StageState, StageTag};

/// Longest chain: socket reader, frame sync, decoder, sink.
pub const MAX_STAGES: usize = 4;

/// Shortest chain: reader, decoder, sink.
pub const MIN_STAGES: usize = 3;

/// Aggregate run state of the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Linked but not started, or fully stopped.
    Idle,
    /// Every stage started.
    Running,
    /// A stop is in flight.
    Stopping,
    /// A stage failed to start.
    Error,
}

struct Slot<S> {
    stage: S,
    tag: StageTag,
    state: StageState,
}

type Slots<S> = heapless::Vec<Slot<S>, MAX_STAGES>;

/// A linked chain of stages for one station.
pub struct Pipeline<S: Stage> {
    slots: Slots<S>,
    run_state: RunState,
    generation: Generation,
}

impl<S: Stage> Pipeline<S> {
    /// Generation stamped on every stage of this chain.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Aggregate run state.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Never true for a built pipeline; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Tags and lifecycle states in chain order.
    pub fn stages(&self) -> impl Iterator<Item = (StageTag, StageState)> + '_ {
        self.slots.iter().map(|s| (s.tag, s.state))
    }

    /// Kinds in chain order.
    pub fn kinds(&self) -> impl Iterator<Item = StageKind> + '_ {
        self.slots.iter().map(|s| s.stage.kind())
    }

    /// Start every stage, source first.
    ///
    /// Stops at the first failure and marks the chain [`RunState::Error`];
    /// stages already started are left for teardown.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        for slot in &mut self.slots {
            if let Err(e) = slot.stage.run().await {
                warn!("stage {} failed to start: {}", slot.tag, e);
                self.run_state = RunState::Error;
                return Err(e);
            }
            slot.state = StageState::Running;
        }
        self.run_state = RunState::Running;
        Ok(())
    }

    /// Stop every stage and wait for all of them to acknowledge.
    ///
    /// Every stage is asked and awaited even when one fails; the first error
    /// is returned.
    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        self.run_state = RunState::Stopping;
        let mut first_err = None;
        for slot in &mut self.slots {
            if let Err(e) = slot.stage.stop().await {
                warn!("stage {} rejected stop: {}", slot.tag, e);
                first_err.get_or_insert(e);
            }
        }
        for slot in &mut self.slots {
            match slot.stage.wait_for_stop().await {
                Ok(()) => slot.state = StageState::Stopped,
                Err(e) => {
                    warn!("stage {} did not stop cleanly: {}", slot.tag, e);
                    first_err.get_or_insert(e);
                }
            }
        }
        self.run_state = RunState::Idle;
        first_err.map_or(Ok(()), Err)
    }

    /// Reset internal state of every stage of `kind`.
    pub fn reset_state(&mut self, kind: StageKind) -> Result<(), PipelineError> {
        for slot in self.slots.iter_mut().filter(|s| s.stage.kind() == kind) {
            slot.stage.reset_state()?;
        }
        Ok(())
    }

    /// Flush inter-stage ring buffers and queued item state on every stage.
    pub fn reset_buffers(&mut self) {
        for slot in &mut self.slots {
            slot.stage.reset_buffers();
        }
    }

    /// Reclock the sink for `format`.
    pub fn apply_format(&mut self, format: AudioConfig) -> Result<(), PipelineError> {
        let sink = self
            .slots
            .iter_mut()
            .find(|s| s.stage.kind() == StageKind::SinkWriter)
            .ok_or(PipelineError::InvalidState)?;
        sink.stage.set_format(format)
    }

    /// Full teardown: stop, wait for stop, terminate, then release every
    /// handle to `factory` in reverse creation order. Never short-circuits;
    /// errors are logged.
    pub async fn teardown<F>(mut self, factory: &mut F)
    where
        F: StageFactory<Stage = S>,
    {
        if let Err(e) = self.stop().await {
            warn!("teardown continuing after stop error: {}", e);
        }
        for slot in &mut self.slots {
            if let Err(e) = slot.stage.terminate().await {
                warn!("stage {} failed to terminate: {}", slot.tag, e);
            }
        }
        while let Some(slot) = self.slots.pop() {
            trace!("deinit stage {}", slot.tag);
            factory.destroy(slot.stage);
        }
    }

    /// Hand every handle back to `factory` in reverse creation order without
    /// stopping anything first. Only for paths that cannot await.
    pub fn release<F>(mut self, factory: &mut F)
    where
        F: StageFactory<Stage = S>,
    {
        while let Some(slot) = self.slots.pop() {
            factory.destroy(slot.stage);
        }
    }
}

/// Accumulates stages for one pipeline; destroys them all on drop unless
/// [`finish`](Self::finish) succeeded.
pub struct PipelineBuilder<'f, F: StageFactory> {
    factory: &'f mut F,
    slots: Slots<F::Stage>,
    generation: Generation,
}

impl<'f, F: StageFactory> PipelineBuilder<'f, F> {
    /// Start a pipeline of `generation`.
    pub fn new(factory: &'f mut F, generation: Generation) -> Self {
        Self {
            factory,
            slots: heapless::Vec::new(),
            generation,
        }
    }

    /// Number of stages created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` before the first [`add`](Self::add).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocate a stage for `spec` and register it.
    ///
    /// # Errors
    ///
    /// Whatever the factory returns, or [`PipelineError::LinkFailure`] when
    /// the tag is already registered or the chain is full. In the latter
    /// cases the new stage is destroyed before returning.
    pub fn add(&mut self, spec: StageSpec<'_>) -> Result<(), PipelineError> {
        let stage = self.factory.create(spec, self.generation)?;
        let tag = stage.tag();
        if self.slots.iter().any(|s| s.tag == tag) {
            error!("duplicate stage tag {}", tag);
            self.factory.destroy(stage);
            return Err(PipelineError::LinkFailure);
        }
        let slot = Slot {
            stage,
            tag,
            state: StageState::Registered,
        };
        if let Err(rejected) = self.slots.push(slot) {
            self.factory.destroy(rejected.stage);
            return Err(PipelineError::LinkFailure);
        }
        trace!("registered stage {}", tag);
        Ok(())
    }

    /// Wire every registered stage to its neighbours in registration order.
    pub fn link(&mut self) -> Result<(), PipelineError> {
        if self.slots.len() < MIN_STAGES {
            return Err(PipelineError::LinkFailure);
        }
        let tags: heapless::Vec<StageTag, MAX_STAGES> = self.slots.iter().map(|s| s.tag).collect();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let upstream = i.checked_sub(1).and_then(|j| tags.get(j)).copied();
            let downstream = i.checked_add(1).and_then(|j| tags.get(j)).copied();
            slot.stage.link(upstream, downstream)?;
            slot.state = StageState::Linked;
        }
        Ok(())
    }

    /// Set `uri` on the source (first) stage.
    pub fn set_source_uri(&mut self, uri: &str) -> Result<(), PipelineError> {
        let source = self
            .slots
            .first_mut()
            .filter(|s| s.stage.kind() == StageKind::SourceReader)
            .ok_or(PipelineError::LinkFailure)?;
        source.stage.set_uri(uri)
    }

    /// Hand over the linked chain. The builder no longer owns any stage.
    pub fn finish(mut self) -> Result<Pipeline<F::Stage>, PipelineError> {
        if self.slots.iter().any(|s| s.state != StageState::Linked) {
            return Err(PipelineError::LinkFailure);
        }
        Ok(Pipeline {
            slots: core::mem::take(&mut self.slots),
            run_state: RunState::Idle,
            generation: self.generation,
        })
    }
}

impl<F: StageFactory> Drop for PipelineBuilder<'_, F> {
    fn drop(&mut self) {
        if !self.slots.is_empty() {
            debug!("rolling back {} stage(s)", self.slots.len());
        }
        while let Some(slot) = self.slots.pop() {
            self.factory.destroy(slot.stage);
        }
    }
}
