//! Media pipeline control: stage chain lifecycle, in-place transport
//! recovery and MP3 frame synchronization.
//!
//! ```text
//! source reader ─▶ [frame sync] ─▶ decoder ─▶ sink writer
//! ```
//!
//! The crate never touches sockets or codecs itself. Concrete stages come
//! from a [`StageFactory`]; this crate decides which to create, wires them,
//! and owns their lifecycle.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[macro_use]
mod fmt;

pub mod codec;
pub mod engine;
pub mod error;
pub mod events;
pub mod frame_sync;
pub mod pipeline;
pub mod stage;
pub mod transfer;

#[cfg(any(test, feature = "std"))]
pub mod mock;

pub use codec::{CodecKind, TransportKind};
pub use engine::{EngineState, EngineStats, EventOutcome, PipelineStateMachine};
pub use error::PipelineError;
pub use events::{try_publish, EventChannel, EventSender, PipelineEvent, PipelineEventKind};
pub use frame_sync::{find_frame_header, FrameHeader, FrameSync};
pub use pipeline::{Pipeline, PipelineBuilder, RunState};
pub use stage::{
    Generation, SinkProfile, Stage, StageFactory, StageKind, StageSpec, StageState, StageTag,
};
pub use transfer::TransferCounter;
