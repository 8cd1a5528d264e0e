//! Station knob: a cyclic counter over a raw pulse count, polled fast while
//! turning and slow at rest.
//!
//! The selector never switches stations itself. It reports movement so the
//! roller can follow, and reports a commit once the knob has been still for
//! the dwell window.

use core::num::NonZeroUsize;

use embassy_time::{Duration, Instant};
use platform::config::{STATION_DWELL_MS, STATION_FAST_POLL_MS, STATION_SLOW_POLL_MS};

use super::poll::{AdaptivePoll, PollPhase};
use super::volume::detents;

/// Index in `[0, len)` that wraps in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicCounter {
    index: usize,
    len: NonZeroUsize,
    last_steps: i32,
}

impl CyclicCounter {
    /// Counter over `len` entries at `index`, baselined at `raw`.
    ///
    /// Returns `None` for an empty list or an index out of range.
    pub fn new(len: usize, index: usize, raw: i32) -> Option<Self> {
        let len = NonZeroUsize::new(len)?;
        (index < len.get()).then_some(Self {
            index,
            len,
            last_steps: detents(raw),
        })
    }

    /// Current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of entries.
    pub fn len(&self) -> NonZeroUsize {
        self.len
    }

    /// Recompute from `raw`. Returns the new index if the detent count moved.
    ///
    /// A pulse-counter wrap shows up as one large delta; it is applied like
    /// any other.
    pub fn update(&mut self, raw: i32) -> Option<usize> {
        let steps = detents(raw);
        if steps == self.last_steps {
            return None;
        }
        let delta = steps.wrapping_sub(self.last_steps);
        self.last_steps = steps;
        self.index = self.offset(delta);
        Some(self.index)
    }

    fn offset(&self, delta: i32) -> usize {
        let n = i64::try_from(self.len.get()).unwrap_or(i64::MAX);
        let current = i64::try_from(self.index).unwrap_or(0);
        let next = current
            .saturating_add(i64::from(delta))
            .checked_rem_euclid(n)
            .unwrap_or(0);
        usize::try_from(next).unwrap_or(0)
    }

    /// Jump to `index` and re-baseline at `raw`. Out-of-range indices wrap.
    pub fn resync(&mut self, index: usize, raw: i32) {
        self.index = index.checked_rem(self.len.get()).unwrap_or(0);
        self.last_steps = detents(raw);
    }
}

/// What one poll of the station knob produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Nothing to do.
    Idle,
    /// Knob moved; the roller should show this index.
    Moved(usize),
    /// Knob settled on this index for the dwell window.
    Commit(usize),
}

/// Cyclic counter plus adaptive polling.
#[derive(Debug, Clone, Copy)]
pub struct StationSelector {
    counter: CyclicCounter,
    poll: AdaptivePoll,
}

impl StationSelector {
    /// Selector over `len` stations, starting at `index`.
    pub fn new(len: usize, index: usize, raw: i32) -> Option<Self> {
        Some(Self {
            counter: CyclicCounter::new(len, index, raw)?,
            poll: AdaptivePoll::new(
                Duration::from_millis(STATION_FAST_POLL_MS),
                Duration::from_millis(STATION_SLOW_POLL_MS),
                Duration::from_millis(STATION_DWELL_MS),
            ),
        })
    }

    /// Index under the knob.
    pub fn index(&self) -> usize {
        self.counter.index()
    }

    /// Current polling phase.
    pub fn phase(&self) -> PollPhase {
        self.poll.phase()
    }

    /// Delay before the next poll.
    pub fn interval(&self) -> Duration {
        self.poll.interval()
    }

    /// Sample the knob.
    pub fn poll(&mut self, raw: i32, now: Instant) -> PollOutcome {
        if let Some(index) = self.counter.update(raw) {
            self.poll.changed(now);
            return PollOutcome::Moved(index);
        }
        if self.poll.idle(now) {
            return PollOutcome::Commit(self.counter.index());
        }
        PollOutcome::Idle
    }

    /// The active station changed by another path.
    pub fn resync(&mut self, index: usize, raw: i32) {
        self.counter.resync(index, raw);
    }
}
