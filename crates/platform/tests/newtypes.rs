//! Type system enforcement tests for audio domain newtypes.
//! These newtypes keep out-of-range volumes and clock rates from ever reaching
//! the codec or the sink.

// ── VolumePercent ────────────────────────────────────────────────────────────

#[test]
fn volume_percent_new_clamps_over_100() {
    use platform::audio_types::VolumePercent;
    let v = VolumePercent::new(150);
    assert_eq!(v.get(), 100, "VolumePercent::new(150) should clamp to 100");
}

#[test]
fn volume_percent_new_allows_0() {
    use platform::audio_types::VolumePercent;
    let v = VolumePercent::new(0);
    assert_eq!(v.get(), 0);
}

#[test]
fn volume_percent_try_from_i32_rejects_over_100() {
    use platform::audio_types::VolumePercent;
    assert!(VolumePercent::try_from_i32(101).is_err());
    assert!(VolumePercent::try_from_i32(255).is_err());
}

#[test]
fn volume_percent_try_from_i32_accepts_valid_range() {
    use platform::audio_types::VolumePercent;
    assert!(VolumePercent::try_from_i32(0).is_ok());
    assert!(VolumePercent::try_from_i32(50).is_ok());
    assert!(VolumePercent::try_from_i32(100).is_ok());
}

#[test]
fn volume_percent_is_one_byte() {
    use platform::audio_types::VolumePercent;
    assert_eq!(core::mem::size_of::<VolumePercent>(), 1);
}

#[test]
fn volume_percent_display_has_unit() {
    use platform::audio_types::VolumePercent;
    assert_eq!(format!("{}", VolumePercent::new(65)), "65%");
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

#[test]
fn sample_rate_hz_rejects_zero() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(0).is_err());
}

#[test]
fn sample_rate_hz_accepts_stream_rates() {
    use platform::audio_types::SampleRateHz;
    for hz in [22_050, 32_000, 44_100, 48_000, 96_000] {
        assert!(SampleRateHz::new(hz).is_ok(), "{hz} Hz should be accepted");
    }
}

#[test]
fn sample_rate_hz_rejects_above_maximum() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(768_001).is_err());
}

#[test]
fn sample_rate_hz_get_returns_value() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(SampleRateHz::new(44_100).map(SampleRateHz::get), Ok(44_100));
}

// ── AudioConfig ──────────────────────────────────────────────────────────────

#[test]
fn audio_config_display_is_compact() {
    use platform::AudioConfig;
    let cfg = AudioConfig {
        sample_rate: 48_000,
        channels: 2,
        bit_depth: 24,
    };
    assert_eq!(format!("{cfg}"), "48000 Hz/24-bit/2ch");
}
