//! Non-blocking timeout scheduler.
//!
//! A two-state machine armed with a start tick and an interval, then polled
//! from the control loop. Tick arithmetic wraps so a free-running 32-bit
//! microsecond counter can be used directly.

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Idle, no pending action.
    #[default]
    Stopped,
    /// Armed and waiting for the interval to elapse.
    WaitingForTimeout,
}

/// Arm / poll / expire timer used to pace step pulses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingStateMachine {
    /// Absolute tick at the last transition.
    start: u32,
    /// Relative duration to wait.
    timeout: u32,
    state: TimerState,
}

impl TimingStateMachine {
    /// Create a stopped state machine.
    pub const fn new() -> Self {
        Self {
            start: 0,
            timeout: 0,
            state: TimerState::Stopped,
        }
    }

    /// Record `now` as the start tick and wait for `interval_us`.
    ///
    /// Re-arming while already waiting restarts the interval.
    pub fn arm(&mut self, now: u32, interval_us: u32) {
        self.start = now;
        self.timeout = interval_us;
        self.state = TimerState::WaitingForTimeout;
    }

    /// Check for expiry.
    ///
    /// Returns `true` exactly once per arm, when `now - start >= timeout`,
    /// and transitions back to `Stopped`.
    pub fn poll(&mut self, now: u32) -> bool {
        if self.state != TimerState::WaitingForTimeout {
            return false;
        }

        if now.wrapping_sub(self.start) >= self.timeout {
            self.state = TimerState::Stopped;
            return true;
        }

        false
    }

    /// Abort any pending timeout.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Whether a timeout is pending.
    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.state == TimerState::WaitingForTimeout
    }

    /// Tick recorded by the last `arm`.
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Interval recorded by the last `arm`.
    #[inline]
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Microseconds left before expiry, zero when stopped or overdue.
    pub fn remaining(&self, now: u32) -> u32 {
        if !self.is_waiting() {
            return 0;
        }
        self.timeout.saturating_sub(now.wrapping_sub(self.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_interval() {
        let mut sm = TimingStateMachine::new();
        assert_eq!(sm.state(), TimerState::Stopped);

        sm.arm(1_000, 500);
        assert!(sm.is_waiting());
        assert!(!sm.poll(1_200));
        assert_eq!(sm.remaining(1_200), 300);
        assert!(sm.poll(1_500));
        assert_eq!(sm.state(), TimerState::Stopped);

        // Must be re-armed before firing again
        assert!(!sm.poll(5_000));
    }

    #[test]
    fn test_zero_interval_fires_on_first_poll() {
        let mut sm = TimingStateMachine::new();
        sm.arm(42, 0);
        assert!(sm.poll(42));
    }

    #[test]
    fn test_stop_aborts() {
        let mut sm = TimingStateMachine::new();
        sm.arm(0, 10);
        sm.stop();
        assert!(!sm.poll(100));
        assert_eq!(sm.remaining(100), 0);
    }

    #[test]
    fn test_tick_wraparound() {
        let mut sm = TimingStateMachine::new();
        sm.arm(u32::MAX - 100, 200);
        assert!(!sm.poll(u32::MAX));
        assert!(!sm.poll(50));
        assert!(sm.poll(99));
    }
}
