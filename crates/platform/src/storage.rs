//! Key/value persistence abstraction (NVS on hardware, a JSON file on desktop)

/// Error returned by a [`KeyValueStore`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The backend could not be read or written.
    Io,
    /// Stored data exists but could not be decoded.
    Corrupt,
    /// No room left for another key.
    Full,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Io => "storage I/O failed",
            Self::Corrupt => "stored value is corrupt",
            Self::Full => "storage is full",
        })
    }
}

/// Integer persistence by key.
///
/// Both methods take `&self`: one store is shared by several tasks and every
/// backend serializes access internally.
pub trait KeyValueStore {
    /// Read `key`. `Ok(None)` when the key has never been written.
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StoreError>;

    /// Write `key`, committing before returning.
    fn set_i32(&self, key: &str, value: i32) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StoreError> {
        (**self).get_i32(key)
    }

    fn set_i32(&self, key: &str, value: i32) -> Result<(), StoreError> {
        (**self).set_i32(key, value)
    }
}
