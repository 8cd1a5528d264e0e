//! Input device abstraction
//!
//! Rotary encoders are read through a hardware pulse counter that is polled,
//! never pushed. One mechanical detent produces
//! [`PULSES_PER_DETENT`](crate::config::PULSES_PER_DETENT) raw counts.

/// Hardware quadrature pulse counter behind a rotary encoder.
///
/// Reads must be lock-free; implementations typically wrap a peripheral
/// register or an atomic fed from an interrupt.
pub trait PulseCounter {
    /// Current signed count. Monotonic between [`clear`](Self::clear) calls
    /// but may wrap at the peripheral's limit.
    fn count(&self) -> i32;

    /// Reset the count to zero.
    fn clear(&self);
}

/// A push button sampled by level.
pub trait PushButton {
    /// `true` while the button is held down.
    fn is_pressed(&self) -> bool;
}
