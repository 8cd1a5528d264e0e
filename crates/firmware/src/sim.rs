//! Simulated stages for the desktop emulator.
//!
//! No audio flows. The source marks the stream live while running so
//! [`stream_task`] can feed the byte counter at a nominal rate, the decoder
//! reports a stream format as soon as it starts, and every `fail_every`-th
//! source start reports a transport open failure instead.

use core::num::NonZeroU32;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_time::Timer;
use platform::AudioConfig;
use playback::{
    try_publish, CodecKind, EventSender, Generation, PipelineError, PipelineEvent, Stage,
    StageFactory, StageKind, StageSpec, StageTag, TransferCounter,
};

/// State shared by every simulated stage.
#[derive(Debug, Default)]
pub struct SimShared {
    streaming: AtomicBool,
    source_runs: AtomicU32,
}

impl SimShared {
    /// Idle, no source started yet.
    pub const fn new() -> Self {
        Self {
            streaming: AtomicBool::new(false),
            source_runs: AtomicU32::new(0),
        }
    }

    /// `true` while a source stage is running.
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Relaxed)
    }

    /// Source starts so far, failed ones included.
    pub fn source_runs(&self) -> u32 {
        self.source_runs.load(Ordering::Relaxed)
    }
}

/// Nominal format a decoder reports for `codec`.
pub fn nominal_format(codec: CodecKind) -> AudioConfig {
    let (sample_rate, bit_depth) = match codec {
        CodecKind::Aac => (48_000, 16),
        CodecKind::Flac => (44_100, 24),
        CodecKind::Mp3 | CodecKind::Ogg => (44_100, 16),
    };
    AudioConfig {
        sample_rate,
        channels: 2,
        bit_depth,
    }
}

/// One simulated stage.
pub struct SimStage<'a> {
    kind: StageKind,
    tag: StageTag,
    generation: Generation,
    codec: Option<CodecKind>,
    events: EventSender<'a>,
    shared: &'a SimShared,
    fail_every: Option<NonZeroU32>,
}

impl SimStage<'_> {
    fn start_source(&self) {
        let n = self
            .shared
            .source_runs
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1);
        let fails = self
            .fail_every
            .is_some_and(|every| n.checked_rem(every.get()) == Some(0));
        if fails {
            warn!("sim: source open failure injected (start {})", n);
            self.shared.streaming.store(false, Ordering::Relaxed);
            try_publish(&self.events, PipelineEvent::source_open_failed(self.generation));
        } else {
            self.shared.streaming.store(true, Ordering::Relaxed);
        }
    }
}

impl Stage for SimStage<'_> {
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
        Ok(())
    }

    fn set_uri(&mut self, uri: &str) -> Result<(), PipelineError> {
        debug!("sim: {} uri {}", self.tag, uri);
        Ok(())
    }

    async fn run(&mut self) -> Result<(), PipelineError> {
        match self.kind {
            StageKind::SourceReader => self.start_source(),
            StageKind::Decoder => {
                let format = nominal_format(self.codec.unwrap_or(CodecKind::Mp3));
                try_publish(
                    &self.events,
                    PipelineEvent::format_resolved(self.generation, format),
                );
            }
            StageKind::FrameFilter | StageKind::SinkWriter => {}
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), PipelineError> {
        if self.kind == StageKind::SourceReader {
            self.shared.streaming.store(false, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn wait_for_stop(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    fn reset_state(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    fn reset_buffers(&mut self) {}

    fn set_format(&mut self, format: AudioConfig) -> Result<(), PipelineError> {
        debug!("sim: sink clocked at {}", format);
        Ok(())
    }
}

/// Factory for [`SimStage`]s.
pub struct SimStageFactory<'a> {
    events: EventSender<'a>,
    shared: &'a SimShared,
    fail_every: Option<NonZeroU32>,
}

impl<'a> SimStageFactory<'a> {
    /// Stages publish into `events`. With `fail_every = Some(n)`, every n-th
    /// source start fails.
    pub fn new(
        events: EventSender<'a>,
        shared: &'a SimShared,
        fail_every: Option<NonZeroU32>,
    ) -> Self {
        Self {
            events,
            shared,
            fail_every,
        }
    }
}

impl<'a> StageFactory for SimStageFactory<'a> {
    type Stage = SimStage<'a>;

    fn create(
        &mut self,
        spec: StageSpec<'_>,
        generation: Generation,
    ) -> Result<SimStage<'a>, PipelineError> {
        let codec = match spec {
            StageSpec::Decoder(codec) => Some(codec),
            _ => None,
        };
        trace!("sim: create {}", spec.tag());
        Ok(SimStage {
            kind: spec.kind(),
            tag: spec.tag(),
            generation,
            codec,
            events: self.events,
            shared: self.shared,
            fail_every: self.fail_every,
        })
    }

    fn destroy(&mut self, stage: SimStage<'a>) {
        trace!("sim: destroy {}", stage.tag);
    }
}

/// Bytes added per 100 ms tick while streaming: 128 kbit/s.
const BYTES_PER_TICK: usize = 1_600;

/// Feed `bytes` at a nominal 128 kbit/s while a source is running.
pub async fn stream_task(shared: &SimShared, bytes: &TransferCounter) {
    loop {
        Timer::after_millis(100).await;
        if shared.is_streaming() {
            bytes.add(BYTES_PER_TICK);
        }
    }
}
