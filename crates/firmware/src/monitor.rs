//! Stream throughput monitor.
//!
//! Sampled once per interval from the source's cumulative byte counter. The
//! displayed figure is a linearly weighted moving average over the last
//! [`BITRATE_HISTORY`] samples, newest weighted heaviest. Slots not yet
//! filled count as zero, so the average ramps up over the first samples.
//!
//! A weighted sum of zero after the startup grace period means no byte
//! arrived for a whole history window: the stream is stalled.

use embassy_time::{Duration, Instant};
use heapless::Deque;
use platform::config::{BITRATE_HISTORY, BITRATE_INTERVAL_MS, STARTUP_GRACE_MS};

/// Sum of weights `1..=BITRATE_HISTORY`.
#[allow(clippy::arithmetic_side_effects)]
const TOTAL_WEIGHT: u64 = {
    let n = BITRATE_HISTORY as u64;
    n * (n + 1) / 2
};

/// One sample's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThroughputReport {
    /// Rate over the last interval.
    pub current_kbps: u32,
    /// Weighted moving average, the figure shown on screen.
    pub average_kbps: u32,
    /// Nothing received for the whole history window, past the grace period.
    pub stalled: bool,
}

/// Weighted moving average of the stream rate.
#[derive(Debug, Clone)]
pub struct ThroughputMonitor {
    history: Deque<u32, BITRATE_HISTORY>,
    last_total: u32,
    armed_at: Instant,
    interval_ms: u64,
    grace: Duration,
}

impl ThroughputMonitor {
    /// Monitor with the default interval and grace period, armed at `now`.
    pub fn new(now: Instant, total: u32) -> Self {
        Self::with_timing(
            now,
            total,
            BITRATE_INTERVAL_MS,
            Duration::from_millis(STARTUP_GRACE_MS),
        )
    }

    /// Monitor with explicit timing.
    pub fn with_timing(now: Instant, total: u32, interval_ms: u64, grace: Duration) -> Self {
        Self {
            history: Deque::new(),
            last_total: total,
            armed_at: now,
            interval_ms: interval_ms.max(1),
            grace,
        }
    }

    /// Take one sample of the cumulative byte counter.
    pub fn sample(&mut self, total: u32, now: Instant) -> ThroughputReport {
        let delta = total.wrapping_sub(self.last_total);
        self.last_total = total;

        let kbps = u64::from(delta)
            .saturating_mul(8)
            .checked_div(self.interval_ms)
            .unwrap_or(0);
        let current_kbps = u32::try_from(kbps).unwrap_or(u32::MAX);

        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was just freed.
        let _ = self.history.push_back(current_kbps);

        let weighted = self.weighted_sum();
        let average = weighted.checked_div(TOTAL_WEIGHT).unwrap_or(0);
        let past_grace = now
            .checked_duration_since(self.armed_at)
            .is_some_and(|up| up > self.grace);

        ThroughputReport {
            current_kbps,
            average_kbps: u32::try_from(average).unwrap_or(u32::MAX),
            stalled: weighted == 0 && past_grace,
        }
    }

    /// Restart the grace period and forget history, e.g. after a reload.
    pub fn rearm(&mut self, now: Instant, total: u32) {
        self.history.clear();
        self.last_total = total;
        self.armed_at = now;
    }

    fn weighted_sum(&self) -> u64 {
        // Oldest present sample sits at slot `BITRATE_HISTORY - len`.
        let first_weight = BITRATE_HISTORY
            .saturating_sub(self.history.len())
            .saturating_add(1);
        self.history
            .iter()
            .zip(first_weight..)
            .map(|(&kbps, weight)| {
                u64::from(kbps).saturating_mul(u64::try_from(weight).unwrap_or(0))
            })
            .fold(0u64, u64::saturating_add)
    }
}
