//! Screen model: folds [`UiUpdate`] messages into display state.

use platform::{ScreenId, UiUpdate};

use crate::navigation::Navigator;
use crate::now_playing::NowPlayingState;

/// Everything the display needs to draw the current frame.
#[derive(Default)]
pub struct ScreenModel {
    nav: Navigator,
    now_playing: NowPlayingState,
}

impl ScreenModel {
    /// Model showing an empty home screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible screen.
    #[must_use]
    pub fn screen(&self) -> ScreenId {
        self.nav.current()
    }

    /// Home screen state.
    #[must_use]
    pub fn now_playing(&self) -> &NowPlayingState {
        &self.now_playing
    }

    /// Apply one update. Returns `true` if anything visible changed.
    pub fn apply(&mut self, update: UiUpdate) -> bool {
        let np = &mut self.now_playing;
        match update {
            UiUpdate::ShowScreen(screen) => self.nav.show(screen),
            UiUpdate::Bitrate(kbps) => replace(&mut np.bitrate_kbps, kbps),
            UiUpdate::StationName(name) => replace(&mut np.station_name, name),
            UiUpdate::StationLocation(location) => replace(&mut np.location, location),
            UiUpdate::Volume(volume) => replace(&mut np.volume, volume),
            UiUpdate::StationRoller(index) => replace(&mut np.roller, index),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::{label, VolumePercent};

    #[test]
    fn test_starts_on_home() {
        assert_eq!(ScreenModel::new().screen(), ScreenId::Home);
    }

    #[test]
    fn test_station_labels_applied() {
        let mut m = ScreenModel::new();
        assert!(m.apply(UiUpdate::StationName(label("KEXP"))));
        assert!(m.apply(UiUpdate::StationLocation(label("Seattle"))));
        assert_eq!(m.now_playing().station_name.as_str(), "KEXP");
        assert_eq!(m.now_playing().location.as_str(), "Seattle");
    }

    #[test]
    fn test_repeated_value_reports_no_change() {
        let mut m = ScreenModel::new();
        assert!(m.apply(UiUpdate::Volume(VolumePercent::new(40))));
        assert!(!m.apply(UiUpdate::Volume(VolumePercent::new(40))));
    }

    #[test]
    fn test_knob_turn_then_commit_returns_home() {
        let mut m = ScreenModel::new();
        m.apply(UiUpdate::ShowScreen(ScreenId::StationSelect));
        m.apply(UiUpdate::StationRoller(3));
        assert_eq!(m.screen(), ScreenId::StationSelect);
        m.apply(UiUpdate::ShowScreen(ScreenId::Home));
        assert_eq!(m.screen(), ScreenId::Home);
        assert_eq!(m.now_playing().roller, 3);
    }

    #[test]
    fn test_bitrate_applied() {
        let mut m = ScreenModel::new();
        m.apply(UiUpdate::Bitrate(96));
        assert_eq!(m.now_playing().bitrate_text().as_str(), "96 kbps");
    }
}
