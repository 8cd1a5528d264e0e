//! Knob and button interpretation.
//!
//! | Control        | Type                | Source                    |
//! |----------------|---------------------|---------------------------|
//! | Volume knob    | [`VolumeControl`]   | pulse counter, 100 ms     |
//! | Mute button    | [`Debouncer`]       | push button, 10 ms        |
//! | Station knob   | [`StationSelector`] | pulse counter, 20/1000 ms |
//!
//! Everything here is pure state: raw readings and timestamps go in, changes
//! come out. The polling loops in [`crate::tasks`] own the hardware.

pub mod button;
pub mod poll;
pub mod station;
pub mod volume;

pub use button::Debouncer;
pub use poll::{AdaptivePoll, PollPhase};
pub use station::{CyclicCounter, PollOutcome, StationSelector};
pub use volume::{BoundedCounter, MuteChange, VolumeControl};
