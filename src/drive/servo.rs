//! Hobby servo output over a PWM channel.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{Direction, MotorStepParams, ServoParams, MAX_ANGLE};
use crate::error::{MotorError, Result};
use crate::motion::Move;

use super::StepOutput;

/// Servo positioned by pulse width.
///
/// The duty cycle is `pulse_time / pulse_period`; one step moves the horn by
/// one degree and stops at either end of travel.
pub struct ServoDriver<PWM>
where
    PWM: SetDutyCycle,
{
    pwm: PWM,
    params: ServoParams,
}

impl<PWM> ServoDriver<PWM>
where
    PWM: SetDutyCycle,
{
    /// Wrap a PWM channel. Nothing is written until the first move.
    pub fn new(pwm: PWM, params: ServoParams) -> Self {
        Self { pwm, params }
    }

    /// Jump straight to an angle.
    pub fn goto_angle(&mut self, angle: u8) -> Result<()> {
        self.params.set_angle(angle)?;
        self.apply()
    }

    /// Re-write the current pulse width to the PWM channel.
    pub fn apply(&mut self) -> Result<()> {
        self.pwm
            .set_duty_cycle_fraction(self.params.pulse_time(), self.params.pulse_period())
            .map_err(|_| MotorError::PwmError)?;
        Ok(())
    }

    /// Current angle in degrees.
    #[inline]
    pub fn angle(&self) -> u8 {
        self.params.angle()
    }

    /// Pulse width currently applied in µs.
    #[inline]
    pub fn pulse_width(&self) -> u16 {
        self.params.pulse_time()
    }

    /// Pulse parameters, including the position reached.
    #[inline]
    pub fn params(&self) -> &ServoParams {
        &self.params
    }

    /// Release the PWM channel.
    pub fn into_inner(self) -> PWM {
        self.pwm
    }

    fn headroom(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Clockwise => (MAX_ANGLE - self.angle().min(MAX_ANGLE)) as u32,
            Direction::CounterClockwise => self.angle() as u32,
        }
    }
}

impl<PWM> StepOutput for ServoDriver<PWM>
where
    PWM: SetDutyCycle,
{
    fn step(&mut self, direction: Direction) -> Result<()> {
        if self.headroom(direction) == 0 {
            return Ok(());
        }
        let next = match direction {
            Direction::Clockwise => self.angle() + 1,
            Direction::CounterClockwise => self.angle() - 1,
        };
        self.goto_angle(next)
    }

    /// One step per whole degree, limited to the travel left in `direction`.
    fn steps_for(&self, mv: Move, direction: Direction, _params: &MotorStepParams) -> u32 {
        let degrees = match mv {
            Move::Steps(n) => n,
            Move::Revolutions(n) => n.saturating_mul(360),
            Move::Angle(angle) if angle.value() > 0.0 => libm::floorf(angle.value()) as u32,
            Move::Angle(_) => 0,
        };
        degrees.min(self.headroom(direction))
    }
}
