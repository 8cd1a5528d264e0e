//! Pipeline error taxonomy.

use crate::stage::StageKind;

/// Errors returned while building, running or reconfiguring a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// A required input was empty or out of range (empty URI, bad index,
    /// unknown URI scheme).
    InvalidArgument,
    /// The stage factory returned no handle for this stage kind.
    AllocationFailure(StageKind),
    /// The stage chain could not be registered or wired.
    LinkFailure,
    /// The source could not open its transport. Recovered in place by the
    /// state machine and never surfaced past it.
    TransportOpenFailure,
    /// Codec identifier outside the supported set. Not retried.
    Unsupported,
    /// The operation is not valid in the engine's current state.
    InvalidState,
}

impl core::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::AllocationFailure(kind) => write!(f, "could not allocate {kind}"),
            Self::LinkFailure => f.write_str("stage chain could not be linked"),
            Self::TransportOpenFailure => f.write_str("transport open failed"),
            Self::Unsupported => f.write_str("unsupported codec"),
            Self::InvalidState => f.write_str("invalid engine state"),
        }
    }
}
