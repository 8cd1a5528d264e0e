//! Application configuration and constants
//!
//! This module defines central configuration values used across the application.
//! All naming, timing and persistence keys should reference these constants
//! rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Airwave";

/// The application type/category
pub const APP_TYPE: &str = "Network Radio";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Rotary input ─────────────────────────────────────────────────────────────

/// Raw quadrature counts produced by one mechanical detent.
pub const PULSES_PER_DETENT: i32 = 4;

/// Volume percentage points per detent.
pub const VOLUME_STEP: i32 = 5;

/// Volume encoder poll period.
pub const VOLUME_POLL_MS: u64 = 100;

/// Station encoder poll period while the knob is turning.
pub const STATION_FAST_POLL_MS: u64 = 20;

/// Station encoder poll period while idle.
pub const STATION_SLOW_POLL_MS: u64 = 1_000;

/// Inactivity after the last detent before a selection is committed.
pub const STATION_DWELL_MS: u64 = 1_000;

/// Mute button sample period.
pub const BUTTON_POLL_MS: u64 = 10;

/// A press must hold this long to count.
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// ── Stream health ────────────────────────────────────────────────────────────

/// Throughput sampling period.
pub const BITRATE_INTERVAL_MS: u64 = 1_000;

/// Samples in the weighted bitrate average.
pub const BITRATE_HISTORY: usize = 10;

/// Zero throughput before this much uptime is not treated as a stall.
pub const STARTUP_GRACE_MS: u64 = 15_000;

// ── Persistence ──────────────────────────────────────────────────────────────

/// Key holding the last volume (0–100).
pub const VOLUME_KEY: &str = "volume";

/// Key holding the last station index (0..N).
pub const STATION_INDEX_KEY: &str = "station_idx";

/// Volume used when nothing valid is stored.
pub const DEFAULT_VOLUME: u8 = 0;

/// Station used when nothing valid is stored.
pub const DEFAULT_STATION_INDEX: usize = 0;
