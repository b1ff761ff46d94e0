//! Timing module for motor-bench.
//!
//! Step delay derivation, the monotonic clock seam and the non-blocking
//! timeout scheduler that paces every step.

mod delay;
mod state_machine;

pub use delay::{calculate_step_delay, MICROSECONDS_PER_MINUTE};
pub use state_machine::{TimerState, TimingStateMachine};

/// Monotonic microsecond clock.
///
/// The counter may wrap; consumers only look at differences.
pub trait Clock {
    /// Current tick in microseconds.
    fn now_us(&mut self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_us(&mut self) -> u32 {
        (**self).now_us()
    }
}
