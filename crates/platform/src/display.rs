//! UI update surface.
//!
//! The control core never renders. It posts [`UiUpdate`] messages to a
//! [`UiSink`] and moves on; whether the display keeps up is not its concern.

use crate::audio_types::VolumePercent;

/// Maximum length of a text label in bytes.
pub const LABEL_CAPACITY: usize = 32;

/// Fixed-capacity text label.
pub type Label = heapless::String<LABEL_CAPACITY>;

/// Build a [`Label`], truncating at a character boundary when `text` does
/// not fit.
#[must_use]
pub fn label(text: &str) -> Label {
    let mut out = Label::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    /// Now-playing view: station, location, bitrate, volume.
    Home,
    /// Station roller shown while the selection knob is turning.
    StationSelect,
}

impl ScreenId {
    /// Short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::StationSelect => "station-select",
        }
    }
}

/// One display side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Smoothed stream bitrate in kbit/s.
    Bitrate(u32),
    /// Active station call sign.
    StationName(Label),
    /// Active station location.
    StationLocation(Label),
    /// Volume slider position.
    Volume(VolumePercent),
    /// Highlighted entry in the station roller.
    StationRoller(usize),
    /// Switch the visible screen.
    ShowScreen(ScreenId),
}

/// Fire-and-forget UI update surface.
///
/// `post` never blocks and never fails from the caller's point of view; a
/// full queue drops the update.
pub trait UiSink {
    /// Queue `update` for the display.
    fn post(&self, update: UiUpdate);
}

impl<T: UiSink + ?Sized> UiSink for &T {
    fn post(&self, update: UiUpdate) {
        (**self).post(update);
    }
}
