//! Hardware Abstraction Layer (HAL) for the Airwave network radio
//!
//! This crate provides the narrow trait-based interfaces the control core
//! consumes, enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Feature Layers (playback, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (codec, pulse counters, NVS, display)
//! ```
//!
//! # Interfaces
//!
//! - [`AudioCodec`] - Hardware codec volume
//! - [`PulseCounter`] - Raw rotary-encoder pulse counts
//! - [`PushButton`] - Level-sampled push buttons
//! - [`KeyValueStore`] - Integer persistence by key
//! - [`UiSink`] - Fire-and-forget display updates
//!
//! # Features
//!
//! - `std`: Desktop backends ([`storage_local`]) and recording [`mocks`]
//! - `hardware`: Physical hardware target marker
//! - `defmt`: Enable defmt logging derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod display;
pub mod input;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{AudioCodec, AudioConfig};
pub use audio_types::{OutOfRangeError, SampleRateHz, VolumePercent};
pub use display::{label, Label, ScreenId, UiSink, UiUpdate};
pub use input::{PulseCounter, PushButton};
pub use storage::{KeyValueStore, StoreError};
