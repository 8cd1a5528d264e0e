//! Fast/slow polling with a dwell window.

use embassy_time::{Duration, Instant};

/// Polling phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollPhase {
    /// Knob recently moved: sample often.
    Fast,
    /// Knob at rest.
    Slow,
}

/// Decides the next polling interval from the time of the last change.
#[derive(Debug, Clone, Copy)]
pub struct AdaptivePoll {
    phase: PollPhase,
    last_change: Instant,
    fast: Duration,
    slow: Duration,
    dwell: Duration,
}

impl AdaptivePoll {
    /// Start in the slow phase.
    pub fn new(fast: Duration, slow: Duration, dwell: Duration) -> Self {
        Self {
            phase: PollPhase::Slow,
            last_change: Instant::from_ticks(0),
            fast,
            slow,
            dwell,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Delay before the next sample.
    pub fn interval(&self) -> Duration {
        match self.phase {
            PollPhase::Fast => self.fast,
            PollPhase::Slow => self.slow,
        }
    }

    /// Input changed at `now`.
    pub fn changed(&mut self, now: Instant) {
        self.phase = PollPhase::Fast;
        self.last_change = now;
    }

    /// Input unchanged at `now`. Returns `true` on the tick the dwell window
    /// expires and the phase drops back to slow.
    pub fn idle(&mut self, now: Instant) -> bool {
        if self.phase != PollPhase::Fast {
            return false;
        }
        let quiet = now
            .checked_duration_since(self.last_change)
            .unwrap_or(Duration::from_ticks(0));
        if quiet < self.dwell {
            return false;
        }
        self.phase = PollPhase::Slow;
        true
    }
}
