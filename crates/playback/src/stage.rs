//! Stage abstraction: the units a pipeline links together.
//!
//! Concrete stages (HTTP reader, socket reader, MP3 sync filter, decoders,
//! I²S/PDM writers) live behind [`StageFactory`]. The pipeline only sees the
//! lifecycle contract in [`Stage`].

use platform::AudioConfig;

use crate::codec::CodecKind;
use crate::error::PipelineError;

/// Pipeline build number. Events tagged with an older generation are stale.
pub type Generation = u32;

/// Stage variants, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageKind {
    /// Network source.
    SourceReader,
    /// Byte-stream frame synchronizer.
    FrameFilter,
    /// Compressed audio decoder.
    Decoder,
    /// Hardware audio output.
    SinkWriter,
}

impl core::fmt::Display for StageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::SourceReader => "source reader",
            Self::FrameFilter => "frame filter",
            Self::Decoder => "decoder",
            Self::SinkWriter => "sink writer",
        })
    }
}

/// Lifecycle of one stage as tracked by its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageState {
    /// Not yet created.
    Uninitialized,
    /// Created and registered with the pipeline.
    Registered,
    /// Wired to its neighbours.
    Linked,
    /// Processing data.
    Running,
    /// Acknowledged a stop.
    Stopped,
    /// Released back to the factory.
    Destroyed,
}

/// Registration tag, unique within a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StageTag(pub &'static str);

impl StageTag {
    /// HTTP reader.
    pub const HTTP: Self = Self("http");
    /// Raw socket reader.
    pub const SOCKET: Self = Self("socket");
    /// MP3 frame synchronizer.
    pub const FRAME_SYNC: Self = Self("mp3_sync");
    /// Decoder.
    pub const DECODER: Self = Self("decoder");
    /// Audio sink.
    pub const SINK: Self = Self("sink");

    /// The tag text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for StageTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Audio output hardware. Exactly one is installed per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkProfile {
    /// Standard I²S to an external codec.
    I2s,
    /// PDM output to a class-D amplifier.
    Pdm,
}

impl SinkProfile {
    /// The profile selected by the `pdm-sink` feature.
    #[cfg(feature = "pdm-sink")]
    pub const INSTALLED: Self = Self::Pdm;
    /// The profile selected by the `pdm-sink` feature.
    #[cfg(not(feature = "pdm-sink"))]
    pub const INSTALLED: Self = Self::I2s;
}

/// What to ask the factory for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSpec<'a> {
    /// HTTP(S) reader with playlist support; URI is set after linking.
    HttpReader,
    /// TCP reader bound to `uri` at construction.
    SocketReader {
        /// `tcp://host:port`
        uri: &'a str,
    },
    /// MP3 frame synchronizer.
    FrameSync,
    /// Decoder for one codec.
    Decoder(CodecKind),
    /// Writer for the installed output hardware.
    Sink(SinkProfile),
}

impl StageSpec<'_> {
    /// Which variant this spec produces.
    #[must_use]
    pub fn kind(&self) -> StageKind {
        match self {
            Self::HttpReader | Self::SocketReader { .. } => StageKind::SourceReader,
            Self::FrameSync => StageKind::FrameFilter,
            Self::Decoder(_) => StageKind::Decoder,
            Self::Sink(_) => StageKind::SinkWriter,
        }
    }

    /// Registration tag for the produced stage.
    #[must_use]
    pub fn tag(&self) -> StageTag {
        match self {
            Self::HttpReader => StageTag::HTTP,
            Self::SocketReader { .. } => StageTag::SOCKET,
            Self::FrameSync => StageTag::FRAME_SYNC,
            Self::Decoder(_) => StageTag::DECODER,
            Self::Sink(_) => StageTag::SINK,
        }
    }
}

/// Lifecycle contract of one stage handle.
///
/// Stages run their own execution contexts internally; these calls only
/// start, stop and reset them. Handles are never reused: once a pipeline is
/// torn down every handle goes back to [`StageFactory::destroy`].
pub trait Stage {
    /// Variant of this stage.
    fn kind(&self) -> StageKind;

    /// Registration tag.
    fn tag(&self) -> StageTag;

    /// Wire to neighbours. `None` at either end of the chain.
    fn link(
        &mut self,
        upstream: Option<StageTag>,
        downstream: Option<StageTag>,
    ) -> Result<(), PipelineError>;

    /// Point a source stage at `uri`.
    fn set_uri(&mut self, uri: &str) -> Result<(), PipelineError>;

    /// Start processing.
    async fn run(&mut self) -> Result<(), PipelineError>;

    /// Ask the stage to stop. Returns once the request is queued.
    async fn stop(&mut self) -> Result<(), PipelineError>;

    /// Wait until the stage has acknowledged a stop. No timeout.
    async fn wait_for_stop(&mut self) -> Result<(), PipelineError>;

    /// Release the stage's task. Only valid once stopped.
    async fn terminate(&mut self) -> Result<(), PipelineError>;

    /// Drop decoder/clock state so the next run starts clean.
    fn reset_state(&mut self) -> Result<(), PipelineError>;

    /// Flush the input ring buffer and any queued item state.
    fn reset_buffers(&mut self);

    /// Reconfigure output clocking. Only meaningful on the sink.
    fn set_format(&mut self, format: AudioConfig) -> Result<(), PipelineError>;
}

/// Allocates and releases stage handles.
pub trait StageFactory {
    /// Concrete handle type.
    type Stage: Stage;

    /// Allocate a stage for `spec` belonging to pipeline `generation`.
    fn create(
        &mut self,
        spec: StageSpec<'_>,
        generation: Generation,
    ) -> Result<Self::Stage, PipelineError>;

    /// Release a handle (deinit). Consumes it so it cannot be reused.
    fn destroy(&mut self, stage: Self::Stage);
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_kinds_follow_chain_order() {
        assert_eq!(StageSpec::HttpReader.kind(), StageKind::SourceReader);
        assert_eq!(
            StageSpec::SocketReader { uri: "tcp://h:1" }.kind(),
            StageKind::SourceReader
        );
        assert_eq!(StageSpec::FrameSync.kind(), StageKind::FrameFilter);
        assert_eq!(StageSpec::Decoder(CodecKind::Aac).kind(), StageKind::Decoder);
        assert_eq!(StageSpec::Sink(SinkProfile::I2s).kind(), StageKind::SinkWriter);
    }

    #[test]
    fn test_tags_are_distinct() {
        let tags = [
            StageTag::HTTP,
            StageTag::SOCKET,
            StageTag::FRAME_SYNC,
            StageTag::DECODER,
            StageTag::SINK,
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in tags.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[cfg(not(feature = "pdm-sink"))]
    #[test]
    fn test_default_sink_is_i2s() {
        assert_eq!(SinkProfile::INSTALLED, SinkProfile::I2s);
    }
}
