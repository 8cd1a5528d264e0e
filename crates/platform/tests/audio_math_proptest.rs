//! Property-based tests for audio domain math.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

use platform::audio_types::{SampleRateHz, VolumePercent};
use platform::label;

proptest::proptest! {
    /// VolumePercent::new never panics for any u8 input (clamps to 100).
    #[test]
    fn volume_percent_new_never_panics(pct in 0u8..=255u8) {
        let v = VolumePercent::new(pct);
        assert!(v.get() <= 100);
    }

    /// Saturating conversion from any persisted i32 stays in range.
    #[test]
    fn volume_percent_saturating_always_in_range(raw in proptest::num::i32::ANY) {
        let v = VolumePercent::saturating_from_i32(raw);
        assert!(v.get() <= 100);
    }

    /// Strict conversion accepts exactly 0..=100.
    #[test]
    fn volume_percent_try_from_i32_matches_range(raw in -1000i32..1000i32) {
        assert_eq!(VolumePercent::try_from_i32(raw).is_ok(), (0..=100).contains(&raw));
    }

    /// SampleRateHz valid range [8000, 768000] always succeeds.
    #[test]
    fn sample_rate_hz_valid_range_always_ok(hz in 8000u32..=768_000u32) {
        assert!(SampleRateHz::new(hz).is_ok(),
            "SampleRateHz::new({}) should be Ok within [8000, 768000]", hz);
    }

    /// SampleRateHz out of range always fails.
    #[test]
    fn sample_rate_hz_out_of_range_always_err(hz in 768_001u32..=u32::MAX) {
        assert!(SampleRateHz::new(hz).is_err());
    }

    /// Labels never exceed capacity and are always a prefix of the input.
    #[test]
    fn label_is_bounded_prefix(text in "\\PC{0,64}") {
        let l = label(&text);
        assert!(l.len() <= platform::display::LABEL_CAPACITY);
        assert!(text.starts_with(l.as_str()));
    }
}
