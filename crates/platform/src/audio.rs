//! Audio codec abstraction

use crate::audio_types::{OutOfRangeError, SampleRateHz, VolumePercent};

/// Hardware audio codec (the analog side of the sink).
///
/// Only volume crosses this boundary; clocking and sample transport belong to
/// the pipeline's sink stage.
pub trait AudioCodec {
    /// Error type
    type Error: core::fmt::Debug;

    /// Set output volume. `VolumePercent::MUTED` silences the output.
    async fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Self::Error>;
}

/// Stream format resolved by a decoder and applied to the sink clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u8,
    /// Bits per sample (16, 24 or 32)
    pub bit_depth: u8,
}

impl AudioConfig {
    /// Check every field against what the sink can be clocked for.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), OutOfRangeError> {
        SampleRateHz::new(self.sample_rate)?;
        if !(1..=2).contains(&self.channels) {
            return Err(OutOfRangeError {
                value: i64::from(self.channels),
                min: 1,
                max: 2,
            });
        }
        if !matches!(self.bit_depth, 16 | 24 | 32) {
            return Err(OutOfRangeError {
                value: i64::from(self.bit_depth),
                min: 16,
                max: 32,
            });
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bit_depth: 16,
        }
    }
}

impl core::fmt::Display for AudioConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} Hz/{}-bit/{}ch",
            self.sample_rate, self.bit_depth, self.channels
        )
    }
}

#[cfg(test)]
mod tests {
    use super::AudioConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AudioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_three_channels() {
        let cfg = AudioConfig {
            channels: 3,
            ..AudioConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_odd_bit_depth() {
        let cfg = AudioConfig {
            bit_depth: 20,
            ..AudioConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let cfg = AudioConfig {
            sample_rate: 0,
            ..AudioConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
