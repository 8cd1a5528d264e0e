//! Volume knob: a bounded counter over a raw pulse count, plus mute.
//!
//! The pulse counter drifts freely; the counter stays in 0–100 by moving its
//! adjustment offset whenever the raw reading would push it past a bound.
//! Turning back therefore responds on the very next detent.

use platform::config::{PULSES_PER_DETENT, VOLUME_STEP};
use platform::VolumePercent;

const MAX: i32 = 100;

/// `floor(raw / PULSES_PER_DETENT)`.
pub(crate) fn detents(raw: i32) -> i32 {
    raw.checked_div_euclid(PULSES_PER_DETENT).unwrap_or(0)
}

/// Value in 0–100 derived from a raw pulse count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedCounter {
    value: VolumePercent,
    adjust: i32,
    step: i32,
}

impl BoundedCounter {
    /// Counter reading `initial` while the raw count is zero.
    pub fn new(initial: VolumePercent, step: i32) -> Self {
        Self {
            value: initial,
            adjust: i32::from(initial.get()),
            step,
        }
    }

    /// Current value.
    pub fn value(&self) -> VolumePercent {
        self.value
    }

    /// Recompute from `raw`. Returns the new value only if it changed.
    pub fn update(&mut self, raw: i32) -> Option<VolumePercent> {
        let base = detents(raw).saturating_mul(self.step);
        let mut value = base.saturating_add(self.adjust);
        if value > MAX {
            self.adjust = MAX.saturating_sub(base);
            value = MAX;
        } else if value < 0 {
            self.adjust = base.saturating_neg();
            value = 0;
        }
        let value = VolumePercent::saturating_from_i32(value);
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(value)
    }

    /// Re-anchor at `value`. The caller must have cleared the raw counter.
    pub fn rebase(&mut self, value: VolumePercent) {
        self.value = value;
        self.adjust = i32::from(value.get());
    }
}

/// Result of a mute toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuteChange {
    /// Output silenced; apply 0 to codec and UI, persist nothing.
    Muted,
    /// Output restored to this value; the raw counter must be cleared.
    Unmuted(VolumePercent),
}

/// Volume knob state: counter plus mute latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeControl {
    counter: BoundedCounter,
    muted: Option<VolumePercent>,
}

impl VolumeControl {
    /// Control restored at `initial`, unmuted, default step.
    pub fn new(initial: VolumePercent) -> Self {
        Self {
            counter: BoundedCounter::new(initial, VOLUME_STEP),
            muted: None,
        }
    }

    /// Counter value, ignoring mute.
    pub fn value(&self) -> VolumePercent {
        self.counter.value()
    }

    /// What the codec should be playing at.
    pub fn effective(&self) -> VolumePercent {
        if self.muted.is_some() {
            VolumePercent::MUTED
        } else {
            self.counter.value()
        }
    }

    /// `true` while muted.
    pub fn is_muted(&self) -> bool {
        self.muted.is_some()
    }

    /// Feed one raw reading. A change while muted unmutes implicitly.
    pub fn poll(&mut self, raw: i32) -> Option<VolumePercent> {
        let changed = self.counter.update(raw)?;
        if self.muted.take().is_some() {
            debug!("volume knob moved while muted, unmuting");
        }
        Some(changed)
    }

    /// Flip the mute latch.
    ///
    /// Muting leaves the counter untouched. Unmuting re-anchors the counter at
    /// the pre-mute value; the caller clears the pulse counter.
    pub fn toggle_mute(&mut self) -> MuteChange {
        match self.muted.take() {
            Some(restored) => {
                self.counter.rebase(restored);
                MuteChange::Unmuted(restored)
            }
            None => {
                self.muted = Some(self.counter.value());
                MuteChange::Muted
            }
        }
    }
}
