//! Airwave internet radio firmware
//!
//! Two knobs, one button, one display, one stream at a time.
//!
//! # Architecture
//!
//! ```text
//! volume_task ──▶ codec, store ─┐
//! button_task ──▶ MuteSignal    │
//! station_task ─▶ RequestChannel ─▶ Player ─▶ PipelineStateMachine ─▶ stages
//! throughput_task ─▶ (Reload)   │      ▲                                │
//!                               │      └──────── EventChannel ◀─────────┘
//!            every task ──▶ UiChannel ─▶ ui_task ─▶ ScreenModel
//! ```
//!
//! The [`player::Player`] task is the only owner of the pipeline and of the
//! selected station. Every other task talks to it through bounded channels.
//!
//! # Features
//!
//! - `hardware` - Build for the device (defmt logging, 32 kHz tick)
//! - `emulator` - Build the desktop emulator binary (tokio, tracing, clap)
//! - `std` - Enable standard library (for emulator and testing)
//! - `pdm-sink` - Drive a PDM amplifier instead of an I²S codec
//!
//! # Emulator
//!
//! ```bash
//! cargo run -p firmware --bin emulator --features emulator -- --station 3
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[macro_use]
mod fmt;

pub mod input;
pub mod monitor;
pub mod player;
pub mod settings;
pub mod stations;
pub mod tasks;
pub mod ui_queue;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use player::{Player, RequestChannel, ResyncSignal, StationRequest};
pub use settings::Settings;
pub use stations::{builtin_stations, Station, StationList};
pub use ui_queue::{UiChannel, UiQueue};
