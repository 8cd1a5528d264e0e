//! Application UI layer: screen model, navigation state, now-playing state.
//!
//! The control core posts [`platform::UiUpdate`] messages; [`ScreenModel`]
//! folds them into what the display should show. Drawing belongs to the
//! display driver.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod navigation;
pub mod now_playing;
pub mod screen;

pub use navigation::Navigator;
pub use now_playing::NowPlayingState;
pub use screen::ScreenModel;
