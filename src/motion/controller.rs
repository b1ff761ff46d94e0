//! Non-blocking step scheduler.

use crate::config::{Direction, MotorStepParams};
use crate::drive::StepOutput;
use crate::error::{MotorError, Result};
use crate::fmt::{debug, info, warning};
use crate::timing::{Clock, TimingStateMachine};

use super::Move;

/// Outcome of one [`MotionController::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// No move in progress.
    Idle,
    /// Step delay not elapsed yet.
    Waiting {
        /// Steps still to issue.
        remaining: u32,
    },
    /// One step issued, more to come.
    Stepped {
        /// Steps still to issue.
        remaining: u32,
    },
    /// Last step issued.
    Complete,
}

/// Paces a drive output through a counted move.
///
/// The first step fires on the first poll after `start`; every further step
/// waits one step delay. `poll` never blocks.
pub struct MotionController<O, C>
where
    O: StepOutput,
    C: Clock,
{
    output: O,
    clock: C,
    timer: TimingStateMachine,
    step_delay: u32,
    direction: Direction,
    remaining: u32,
    issued: u32,
}

impl<O, C> MotionController<O, C>
where
    O: StepOutput,
    C: Clock,
{
    /// Create an idle controller.
    pub fn new(output: O, clock: C, step_delay: u32) -> Self {
        Self {
            output,
            clock,
            timer: TimingStateMachine::new(),
            step_delay,
            direction: Direction::Clockwise,
            remaining: 0,
            issued: 0,
        }
    }

    /// Delay between steps in µs; applies from the next scheduled step.
    pub fn set_step_delay(&mut self, step_delay: u32) {
        self.step_delay = step_delay;
    }

    /// Current delay between steps in µs.
    #[inline]
    pub fn step_delay(&self) -> u32 {
        self.step_delay
    }

    /// Whether a move is in progress.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.remaining > 0
    }

    /// Steps still to issue.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Steps issued by the current or last move.
    #[inline]
    pub fn steps_issued(&self) -> u32 {
        self.issued
    }

    /// Direction of the current or last move.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Begin a move of `steps` single steps. Zero steps is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::Busy` if a move is already running.
    pub fn start(&mut self, steps: u32, direction: Direction) -> Result<()> {
        if self.is_moving() {
            warning!("move rejected, {=u32} steps still pending", self.remaining);
            return Err(MotorError::Busy.into());
        }
        if steps == 0 {
            debug!("zero-step move ignored");
            return Ok(());
        }

        self.direction = direction;
        self.remaining = steps;
        self.issued = 0;
        let now = self.clock.now_us();
        self.timer.arm(now, 0);
        info!("move started: {=u32} steps, delay {=u32} us", steps, self.step_delay);
        Ok(())
    }

    /// Start a movement request in the configured rotation direction, using
    /// the configured step delay.
    ///
    /// Returns the number of single steps scheduled.
    pub fn run_move(&mut self, mv: Move, params: &MotorStepParams) -> Result<u32> {
        self.run_move_in(mv, params.rotation_direction(), params)
    }

    /// Start a movement request in an explicit direction.
    pub fn run_move_in(&mut self, mv: Move, direction: Direction, params: &MotorStepParams) -> Result<u32> {
        if self.is_moving() {
            return Err(MotorError::Busy.into());
        }
        let steps = self.output.steps_for(mv, direction, params);
        self.step_delay = params.step_delay();
        self.start(steps, direction)?;
        Ok(steps)
    }

    /// Issue the next step if its delay has elapsed.
    ///
    /// A drive error aborts the move and is returned.
    pub fn poll(&mut self) -> Result<MoveStatus> {
        if !self.is_moving() {
            return Ok(MoveStatus::Idle);
        }

        let now = self.clock.now_us();
        if !self.timer.poll(now) {
            return Ok(MoveStatus::Waiting {
                remaining: self.remaining,
            });
        }

        if let Err(e) = self.output.step(self.direction) {
            warning!("step failed after {=u32} steps, move aborted", self.issued);
            self.timer.stop();
            self.remaining = 0;
            return Err(e);
        }

        self.issued += 1;
        self.remaining -= 1;

        if self.remaining == 0 {
            info!("move complete: {=u32} steps", self.issued);
            return Ok(MoveStatus::Complete);
        }

        self.timer.arm(now, self.step_delay);
        Ok(MoveStatus::Stepped {
            remaining: self.remaining,
        })
    }

    /// Abort the move and release the output.
    pub fn stop(&mut self) -> Result<()> {
        if self.is_moving() {
            info!("move stopped, {=u32} steps skipped", self.remaining);
        }
        self.timer.stop();
        self.remaining = 0;
        self.output.release()
    }

    /// Borrow the drive output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutably borrow the drive output.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Release the drive output and clock.
    pub fn into_parts(self) -> (O, C) {
        (self.output, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Degrees;
    use crate::error::Error;

    #[derive(Default)]
    struct CountingOutput {
        steps: Vec<Direction>,
        released: bool,
        fail_after: Option<usize>,
    }

    impl StepOutput for CountingOutput {
        fn step(&mut self, direction: Direction) -> Result<()> {
            if self.fail_after == Some(self.steps.len()) {
                return Err(MotorError::PinError.into());
            }
            self.steps.push(direction);
            Ok(())
        }

        fn release(&mut self) -> Result<()> {
            self.released = true;
            Ok(())
        }
    }

    struct ManualClock(u32);

    impl Clock for ManualClock {
        fn now_us(&mut self) -> u32 {
            self.0
        }
    }

    fn controller() -> MotionController<CountingOutput, ManualClock> {
        MotionController::new(CountingOutput::default(), ManualClock(0), 75_000)
    }

    #[test]
    fn test_first_step_immediate_then_paced() {
        let mut mc = controller();
        mc.start(3, Direction::Clockwise).unwrap();

        assert_eq!(mc.poll().unwrap(), MoveStatus::Stepped { remaining: 2 });
        assert_eq!(mc.poll().unwrap(), MoveStatus::Waiting { remaining: 2 });

        mc.clock.0 = 74_999;
        assert_eq!(mc.poll().unwrap(), MoveStatus::Waiting { remaining: 2 });
        mc.clock.0 = 75_000;
        assert_eq!(mc.poll().unwrap(), MoveStatus::Stepped { remaining: 1 });
        mc.clock.0 = 150_000;
        assert_eq!(mc.poll().unwrap(), MoveStatus::Complete);
        assert_eq!(mc.poll().unwrap(), MoveStatus::Idle);
        assert_eq!(mc.output().steps.len(), 3);
    }

    #[test]
    fn test_zero_steps_is_noop() {
        let mut mc = controller();
        mc.start(0, Direction::Clockwise).unwrap();
        assert!(!mc.is_moving());
        assert_eq!(mc.poll().unwrap(), MoveStatus::Idle);
    }

    #[test]
    fn test_busy_while_moving() {
        let mut mc = controller();
        mc.start(2, Direction::Clockwise).unwrap();
        assert!(matches!(
            mc.start(5, Direction::CounterClockwise),
            Err(Error::Motor(MotorError::Busy))
        ));
        assert_eq!(mc.remaining(), 2);
        assert_eq!(mc.direction(), Direction::Clockwise);
    }

    #[test]
    fn test_stop_releases_and_halts() {
        let mut mc = controller();
        mc.start(10, Direction::Clockwise).unwrap();
        mc.poll().unwrap();
        mc.stop().unwrap();

        mc.clock.0 = 1_000_000;
        assert_eq!(mc.poll().unwrap(), MoveStatus::Idle);
        assert_eq!(mc.steps_issued(), 1);
        assert!(mc.output().released);
    }

    #[test]
    fn test_run_move_uses_params() {
        let mut mc = controller();
        let mut params = MotorStepParams::default();
        params.set_rotation_direction(Direction::CounterClockwise);
        params.set_rpm(60).unwrap();

        assert_eq!(mc.run_move(Move::Angle(Degrees(90.0)), &params).unwrap(), 50);
        assert_eq!(mc.step_delay(), 5_000);
        assert_eq!(mc.direction(), Direction::CounterClockwise);
    }

    #[test]
    fn test_step_error_aborts_move() {
        let mut mc = MotionController::new(
            CountingOutput {
                fail_after: Some(1),
                ..CountingOutput::default()
            },
            ManualClock(0),
            100,
        );
        mc.start(5, Direction::Clockwise).unwrap();
        mc.poll().unwrap();
        mc.clock.0 = 100;
        assert!(mc.poll().is_err());
        assert!(!mc.is_moving());
        assert_eq!(mc.steps_issued(), 1);
    }

    #[test]
    fn test_wrapping_clock() {
        let mut mc = MotionController::new(CountingOutput::default(), ManualClock(u32::MAX - 10), 100);
        mc.start(2, Direction::Clockwise).unwrap();
        mc.poll().unwrap();
        mc.clock.0 = 89;
        assert_eq!(mc.poll().unwrap(), MoveStatus::Complete);
    }
}
