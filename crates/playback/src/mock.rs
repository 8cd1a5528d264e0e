//! Recording stage factory for host tests.
//!
//! Every call a stage or the factory receives is appended to a shared
//! [`StageLog`], so tests can assert allocation/destruction balance and call
//! ordering after the factory has been moved into the engine. Failures are
//! injected through the same log.

use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use platform::AudioConfig;

use crate::error::PipelineError;
use crate::stage::{Generation, Stage, StageFactory, StageKind, StageSpec, StageTag};

/// One recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOp {
    /// Factory allocated the stage.
    Create,
    /// `link`
    Link,
    /// `set_uri`
    SetUri,
    /// `run`
    Run,
    /// `stop`
    Stop,
    /// `wait_for_stop`
    WaitForStop,
    /// `terminate`
    Terminate,
    /// `reset_state`
    ResetState,
    /// `reset_buffers`
    ResetBuffers,
    /// `set_format`
    SetFormat,
    /// Factory released the stage.
    Destroy,
}

/// Where to inject a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePlan {
    /// `create` fails for this kind.
    pub create: Option<StageKind>,
    /// `link` fails on this tag.
    pub link: Option<StageTag>,
    /// `set_uri` fails.
    pub set_uri: bool,
    /// `run` fails on this tag.
    pub run: Option<StageTag>,
    /// Give every stage this tag, forcing a duplicate registration.
    pub duplicate_tag: Option<StageTag>,
}

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<(StageTag, StageOp)>,
    uris: Vec<std::string::String>,
    formats: Vec<AudioConfig>,
    plan: FailurePlan,
}

/// Shared record of everything the mock stages saw.
#[derive(Debug, Clone, Default)]
pub struct StageLog {
    inner: Arc<Mutex<LogInner>>,
}

impl StageLog {
    fn lock(&self) -> Option<MutexGuard<'_, LogInner>> {
        self.inner.lock().ok()
    }

    fn record(&self, tag: StageTag, op: StageOp) {
        if let Some(mut inner) = self.lock() {
            inner.calls.push((tag, op));
        }
    }

    fn plan(&self) -> FailurePlan {
        self.lock().map(|i| i.plan).unwrap_or_default()
    }

    /// Replace the failure plan.
    pub fn set_plan(&self, plan: FailurePlan) {
        if let Some(mut inner) = self.lock() {
            inner.plan = plan;
        }
    }

    /// Every call in order.
    pub fn calls(&self) -> Vec<(StageTag, StageOp)> {
        self.lock().map(|i| i.calls.clone()).unwrap_or_default()
    }

    /// Calls of one kind, in order.
    pub fn calls_of(&self, op: StageOp) -> Vec<StageTag> {
        self.calls()
            .into_iter()
            .filter(|(_, o)| *o == op)
            .map(|(t, _)| t)
            .collect()
    }

    /// How many times `op` was recorded.
    pub fn count(&self, op: StageOp) -> usize {
        self.calls().iter().filter(|(_, o)| *o == op).count()
    }

    /// Stages created minus stages destroyed.
    pub fn live(&self) -> usize {
        self.count(StageOp::Create)
            .saturating_sub(self.count(StageOp::Destroy))
    }

    /// URIs pushed into sources.
    pub fn uris(&self) -> Vec<std::string::String> {
        self.lock().map(|i| i.uris.clone()).unwrap_or_default()
    }

    /// Formats applied to sinks.
    pub fn formats(&self) -> Vec<AudioConfig> {
        self.lock().map(|i| i.formats.clone()).unwrap_or_default()
    }

    /// Forget recorded calls, keeping the plan.
    pub fn clear(&self) {
        if let Some(mut inner) = self.lock() {
            inner.calls.clear();
            inner.uris.clear();
            inner.formats.clear();
        }
    }
}

/// Stage handle produced by [`MockStageFactory`].
#[derive(Debug)]
pub struct MockStage {
    kind: StageKind,
    tag: StageTag,
    generation: Generation,
    log: StageLog,
}

impl MockStage {
    /// Pipeline generation this stage was created for.
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl Stage for MockStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn tag(&self) -> StageTag {
        self.tag
    }

    fn link(
        &mut self,
        _upstream: Option<StageTag>,
        _downstream: Option<StageTag>,
    ) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::Link);
        if self.log.plan().link == Some(self.tag) {
            return Err(PipelineError::LinkFailure);
        }
        Ok(())
    }

    fn set_uri(&mut self, uri: &str) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::SetUri);
        if self.log.plan().set_uri {
            return Err(PipelineError::InvalidArgument);
        }
        if let Some(mut inner) = self.log.lock() {
            inner.uris.push(uri.to_owned());
        }
        Ok(())
    }

    async fn run(&mut self) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::Run);
        if self.log.plan().run == Some(self.tag) {
            return Err(PipelineError::TransportOpenFailure);
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::Stop);
        Ok(())
    }

    async fn wait_for_stop(&mut self) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::WaitForStop);
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::Terminate);
        Ok(())
    }

    fn reset_state(&mut self) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::ResetState);
        Ok(())
    }

    fn reset_buffers(&mut self) {
        self.log.record(self.tag, StageOp::ResetBuffers);
    }

    fn set_format(&mut self, format: AudioConfig) -> Result<(), PipelineError> {
        self.log.record(self.tag, StageOp::SetFormat);
        if let Some(mut inner) = self.log.lock() {
            inner.formats.push(format);
        }
        Ok(())
    }
}

/// Factory producing [`MockStage`]s that record into one [`StageLog`].
#[derive(Debug, Clone, Default)]
pub struct MockStageFactory {
    log: StageLog,
}

impl MockStageFactory {
    /// Create a factory with an empty log and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared log.
    pub fn log(&self) -> StageLog {
        self.log.clone()
    }
}

impl StageFactory for MockStageFactory {
    type Stage = MockStage;

    fn create(
        &mut self,
        spec: StageSpec<'_>,
        generation: Generation,
    ) -> Result<MockStage, PipelineError> {
        let plan = self.log.plan();
        let kind = spec.kind();
        if plan.create == Some(kind) {
            return Err(PipelineError::AllocationFailure(kind));
        }
        let tag = plan.duplicate_tag.unwrap_or_else(|| spec.tag());
        self.log.record(tag, StageOp::Create);
        Ok(MockStage {
            kind,
            tag,
            generation,
            log: self.log.clone(),
        })
    }

    fn destroy(&mut self, stage: MockStage) {
        self.log.record(stage.tag, StageOp::Destroy);
    }
}
