//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `VolumePercent`: clamps 0–100, the only volume type crossing a crate boundary
//! - `SampleRateHz`: validates 8000–768000 Hz range

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: i64,
    /// The inclusive minimum allowed value.
    pub min: i64,
    /// The inclusive maximum allowed value.
    pub max: i64,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} outside {}..={}", self.value, self.min, self.max)
    }
}

// ── VolumePercent ────────────────────────────────────────────────────────────

/// Volume as a percentage, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
/// Construct with [`VolumePercent::new`] (clamping) or
/// [`VolumePercent::try_from_i32`] (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Silence.
    pub const MUTED: Self = Self(0);
    /// Full scale.
    pub const MAX: Self = Self(100);

    /// Create a `VolumePercent`, clamping values above 100 to 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Create from a signed value read back from persistence.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for anything outside `0..=100`.
    pub fn try_from_i32(value: i32) -> Result<Self, OutOfRangeError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(OutOfRangeError {
                value: i64::from(value),
                min: 0,
                max: 100,
            })
    }

    /// Create from a signed value, saturating into `0..=100`.
    #[must_use]
    pub fn saturating_from_i32(value: i32) -> Self {
        let clamped = value.clamp(0, 100);
        Self(u8::try_from(clamped).unwrap_or(100))
    }

    /// Return the inner volume value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for VolumePercent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range the audio sink can clock.
///
/// Valid range: 8000–768000 Hz (8 kHz to 768 kHz PCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz.
    pub const MAX_HZ: u32 = 768_000;

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: i64::from(hz),
                min: i64::from(Self::MIN_HZ),
                max: i64::from(Self::MAX_HZ),
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_from_persisted_value() {
        assert_eq!(VolumePercent::try_from_i32(35).unwrap().get(), 35);
        assert!(VolumePercent::try_from_i32(-1).is_err());
        assert!(VolumePercent::try_from_i32(101).is_err());
        assert!(VolumePercent::try_from_i32(i32::MAX).is_err());
    }

    #[test]
    fn test_volume_saturating_from_i32() {
        assert_eq!(VolumePercent::saturating_from_i32(-40), VolumePercent::MUTED);
        assert_eq!(VolumePercent::saturating_from_i32(250), VolumePercent::MAX);
        assert_eq!(VolumePercent::saturating_from_i32(42).get(), 42);
    }

    #[test]
    fn test_out_of_range_display() {
        let err = VolumePercent::try_from_i32(300).unwrap_err();
        assert_eq!(format!("{err}"), "300 outside 0..=100");
    }
}
