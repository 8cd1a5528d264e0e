//! Running byte count of data received by the source stage.
//!
//! The source adds to it from its own context; the throughput monitor reads
//! it once a second. 32 bits wrap after 4 GiB, so readers must take deltas
//! with `wrapping_sub`. Target has no 64-bit atomics.

use core::sync::atomic::{AtomicU32, Ordering};

/// Monotonic (wrapping) count of bytes received.
#[derive(Debug, Default)]
pub struct TransferCounter {
    total: AtomicU32,
}

impl TransferCounter {
    /// A counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: AtomicU32::new(0),
        }
    }

    /// Record `bytes` received. Lengths beyond `u32::MAX` are clamped.
    pub fn add(&self, bytes: usize) {
        let n = u32::try_from(bytes).unwrap_or(u32::MAX);
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    /// Current total.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total.load(Ordering::Relaxed)
    }
}
