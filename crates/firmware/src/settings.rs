//! Persisted user settings: volume and selected station.
//!
//! Each value is restored and validated independently. A missing, corrupt or
//! out-of-range value falls back to its default with a warning; a broken
//! store never stops the radio from starting. Saves are fire-and-forget.

use platform::config::{DEFAULT_STATION_INDEX, DEFAULT_VOLUME, STATION_INDEX_KEY, VOLUME_KEY};
use platform::{KeyValueStore, VolumePercent};

/// Settings restored at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Last volume.
    pub volume: VolumePercent,
    /// Last station index, valid for the list it was restored against.
    pub station_index: usize,
}

impl Settings {
    /// Read both values from `store`, validating the station index against
    /// `station_count`.
    pub fn restore(store: &impl KeyValueStore, station_count: usize) -> Self {
        let volume = match store.get_i32(VOLUME_KEY) {
            Ok(Some(raw)) => VolumePercent::try_from_i32(raw).unwrap_or_else(|e| {
                warn!("stored volume invalid ({}), using default", e);
                VolumePercent::new(DEFAULT_VOLUME)
            }),
            Ok(None) => {
                info!("no stored volume, using default");
                VolumePercent::new(DEFAULT_VOLUME)
            }
            Err(e) => {
                warn!("volume read failed: {}", e);
                VolumePercent::new(DEFAULT_VOLUME)
            }
        };

        let station_index = match store.get_i32(STATION_INDEX_KEY) {
            Ok(Some(raw)) => match usize::try_from(raw) {
                Ok(index) if index < station_count => index,
                _ => {
                    warn!("stored station index {} invalid, using default", raw);
                    DEFAULT_STATION_INDEX
                }
            },
            Ok(None) => {
                info!("no stored station index, using default");
                DEFAULT_STATION_INDEX
            }
            Err(e) => {
                warn!("station index read failed: {}", e);
                DEFAULT_STATION_INDEX
            }
        };

        Self {
            volume,
            station_index,
        }
    }
}

/// Persist the volume. Errors are logged.
pub fn save_volume(store: &impl KeyValueStore, volume: VolumePercent) {
    if let Err(e) = store.set_i32(VOLUME_KEY, i32::from(volume.get())) {
        warn!("could not save volume: {}", e);
    }
}

/// Persist the station index. Errors are logged.
pub fn save_station_index(store: &impl KeyValueStore, index: usize) {
    let Ok(raw) = i32::try_from(index) else {
        return;
    };
    if let Err(e) = store.set_i32(STATION_INDEX_KEY, raw) {
        warn!("could not save station index: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::MemoryStore;

    #[test]
    fn test_restore_valid_values() {
        let store = MemoryStore::with(&[(VOLUME_KEY, 35), (STATION_INDEX_KEY, 4)]);
        let s = Settings::restore(&store, 16);
        assert_eq!(s.volume, VolumePercent::new(35));
        assert_eq!(s.station_index, 4);
    }

    #[test]
    fn test_missing_values_default() {
        let s = Settings::restore(&MemoryStore::new(), 16);
        assert_eq!(s.volume, VolumePercent::new(DEFAULT_VOLUME));
        assert_eq!(s.station_index, DEFAULT_STATION_INDEX);
    }

    #[test]
    fn test_out_of_range_values_default_independently() {
        let store = MemoryStore::with(&[(VOLUME_KEY, 140), (STATION_INDEX_KEY, 3)]);
        let s = Settings::restore(&store, 16);
        assert_eq!(s.volume, VolumePercent::new(DEFAULT_VOLUME));
        assert_eq!(s.station_index, 3);

        let store = MemoryStore::with(&[(VOLUME_KEY, 60), (STATION_INDEX_KEY, 16)]);
        let s = Settings::restore(&store, 16);
        assert_eq!(s.volume, VolumePercent::new(60));
        assert_eq!(s.station_index, DEFAULT_STATION_INDEX);
    }

    #[test]
    fn test_negative_station_index_defaults() {
        let store = MemoryStore::with(&[(STATION_INDEX_KEY, -1)]);
        assert_eq!(Settings::restore(&store, 16).station_index, 0);
    }

    #[test]
    fn test_failing_store_defaults() {
        let store = MemoryStore::with(&[(VOLUME_KEY, 50)]);
        store.set_failing(true);
        let s = Settings::restore(&store, 16);
        assert_eq!(s.volume, VolumePercent::new(DEFAULT_VOLUME));
    }

    #[test]
    fn test_save_writes_keys() {
        let store = MemoryStore::new();
        save_volume(&store, VolumePercent::new(70));
        save_station_index(&store, 9);
        assert_eq!(store.peek(VOLUME_KEY), Some(70));
        assert_eq!(store.peek(STATION_INDEX_KEY), Some(9));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.set_failing(true);
        save_volume(&store, VolumePercent::new(70));
        assert_eq!(store.peek(VOLUME_KEY), None);
    }
}
