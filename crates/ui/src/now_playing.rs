//! Home screen state: station labels, volume slider, bitrate, roller.

use core::fmt::Write as _;

use platform::{Label, VolumePercent};

/// Rendered bitrate label, e.g. `"128 kbps"`.
pub type BitrateText = heapless::String<16>;

/// State for the home (now playing) screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlayingState {
    /// Station call sign.
    pub station_name: Label,
    /// Station location.
    pub location: Label,
    /// Volume slider position.
    pub volume: VolumePercent,
    /// Smoothed stream rate.
    pub bitrate_kbps: u32,
    /// Index highlighted on the station roller.
    pub roller: usize,
}

impl NowPlayingState {
    /// Bitrate label text.
    #[must_use]
    pub fn bitrate_text(&self) -> BitrateText {
        let mut out = BitrateText::new();
        // u32::MAX is 10 digits plus " kbps": always fits.
        let _ = write!(out, "{} kbps", self.bitrate_kbps);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::NowPlayingState;

    #[test]
    fn test_default_is_blank() {
        let state = NowPlayingState::default();
        assert!(state.station_name.is_empty());
        assert_eq!(state.volume.get(), 0);
        assert_eq!(state.bitrate_kbps, 0);
    }

    #[test]
    fn test_bitrate_text() {
        let state = NowPlayingState {
            bitrate_kbps: 128,
            ..NowPlayingState::default()
        };
        assert_eq!(state.bitrate_text().as_str(), "128 kbps");
    }

    #[test]
    fn test_bitrate_text_max_fits() {
        let state = NowPlayingState {
            bitrate_kbps: u32::MAX,
            ..NowPlayingState::default()
        };
        assert_eq!(state.bitrate_text().as_str(), "4294967295 kbps");
    }
}
