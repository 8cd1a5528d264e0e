//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests and the desktop emulator.
//! Every mock records the calls it receives for later assertion.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::*;

/// Mock pulse counter driven by the test.
#[derive(Debug, Default)]
pub struct MockPulseCounter {
    count: AtomicI32,
    clears: AtomicUsize,
}

impl MockPulseCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw count.
    pub fn set(&self, count: i32) {
        self.count.store(count, Ordering::Relaxed);
    }

    /// Turn the knob by `detents` clicks.
    pub fn turn(&self, detents: i32) {
        let delta = detents.wrapping_mul(config::PULSES_PER_DETENT);
        let _ = self
            .count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                Some(c.wrapping_add(delta))
            });
    }

    /// Number of times [`PulseCounter::clear`] was called.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }
}

impl PulseCounter for MockPulseCounter {
    fn count(&self) -> i32 {
        self.count.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

/// Mock push button.
#[derive(Debug, Default)]
pub struct MockButton {
    pressed: AtomicBool,
}

impl MockButton {
    /// Create a released button.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold or release the button.
    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Relaxed);
    }
}

impl PushButton for MockButton {
    fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Relaxed)
    }
}

/// In-memory key/value store with write counting and failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, i32>>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with(entries: &[(&str, i32)]) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            for (k, v) in entries {
                values.insert((*k).to_owned(), *v);
            }
        }
        store
    }

    /// Make every subsequent call fail with [`StoreError::Io`].
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// Number of successful `set_i32` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Current value of `key`, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<i32> {
        self.values.lock().ok().and_then(|v| v.get(key).copied())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::Io);
        }
        let values = self.values.lock().map_err(|_| StoreError::Io)?;
        Ok(values.get(key).copied())
    }

    fn set_i32(&self, key: &str, value: i32) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::Io);
        }
        let mut values = self.values.lock().map_err(|_| StoreError::Io)?;
        values.insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// UI sink that records every update in order.
#[derive(Debug, Default)]
pub struct RecordingUi {
    updates: Mutex<Vec<UiUpdate>>,
}

impl RecordingUi {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything posted so far.
    pub fn take(&self) -> Vec<UiUpdate> {
        self.updates
            .lock()
            .map(|mut u| core::mem::take(&mut *u))
            .unwrap_or_default()
    }

    /// Copy of everything posted so far.
    pub fn updates(&self) -> Vec<UiUpdate> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl UiSink for RecordingUi {
    fn post(&self, update: UiUpdate) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(update);
        }
    }
}

/// Error returned by [`MockCodec`] when failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCodecError;

/// Mock hardware codec: records every volume write.
#[derive(Debug, Default)]
pub struct MockCodec {
    /// Every volume applied, oldest first.
    pub history: Vec<VolumePercent>,
    /// When set, `set_volume` fails without recording.
    pub fail: bool,
}

impl MockCodec {
    /// Create a codec with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last volume applied.
    pub fn volume(&self) -> Option<VolumePercent> {
        self.history.last().copied()
    }
}

impl AudioCodec for MockCodec {
    type Error = MockCodecError;

    async fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockCodecError);
        }
        self.history.push(volume);
        Ok(())
    }
}
