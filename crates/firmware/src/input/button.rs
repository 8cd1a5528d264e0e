//! Push-button debouncer.
//!
//! A press is reported once the input has read pressed for the whole
//! debounce window. The button must then read released before another press
//! can be reported.

use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Released,
    Pending { since: Instant },
    Held,
}

/// Level-sampled debouncer.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    phase: Phase,
    window: Duration,
}

impl Debouncer {
    /// Debouncer requiring `window` of stable contact.
    pub fn new(window: Duration) -> Self {
        Self {
            phase: Phase::Released,
            window,
        }
    }

    /// Feed one sample. Returns `true` exactly once per physical press.
    pub fn sample(&mut self, pressed: bool, now: Instant) -> bool {
        match (self.phase, pressed) {
            (_, false) => {
                self.phase = Phase::Released;
                false
            }
            (Phase::Released, true) => {
                self.phase = Phase::Pending { since: now };
                self.window == Duration::from_ticks(0) && self.confirm()
            }
            (Phase::Pending { since }, true) => {
                let held = now
                    .checked_duration_since(since)
                    .unwrap_or(Duration::from_ticks(0));
                held >= self.window && self.confirm()
            }
            (Phase::Held, true) => false,
        }
    }

    fn confirm(&mut self) -> bool {
        self.phase = Phase::Held;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Instant {
        Instant::from_millis(v)
    }

    #[test]
    fn test_press_reported_after_window() {
        let mut d = Debouncer::new(Duration::from_millis(50));
        assert!(!d.sample(true, ms(0)));
        assert!(!d.sample(true, ms(40)));
        assert!(d.sample(true, ms(50)));
    }

    #[test]
    fn test_bounce_restarts_window() {
        let mut d = Debouncer::new(Duration::from_millis(50));
        d.sample(true, ms(0));
        d.sample(false, ms(10));
        assert!(!d.sample(true, ms(20)));
        assert!(!d.sample(true, ms(60)));
        assert!(d.sample(true, ms(70)));
    }

    #[test]
    fn test_holding_reports_once() {
        let mut d = Debouncer::new(Duration::from_millis(50));
        d.sample(true, ms(0));
        assert!(d.sample(true, ms(50)));
        assert!(!d.sample(true, ms(500)));
        assert!(!d.sample(true, ms(5_000)));
    }

    #[test]
    fn test_release_rearms() {
        let mut d = Debouncer::new(Duration::from_millis(50));
        d.sample(true, ms(0));
        d.sample(true, ms(50));
        d.sample(false, ms(100));
        d.sample(true, ms(110));
        assert!(d.sample(true, ms(160)));
    }
}
