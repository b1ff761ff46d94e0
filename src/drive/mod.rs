//! Drive outputs: what happens on the wire for one step.
//!
//! Every output type implements [`StepOutput`]; [`Drive`] is the tagged
//! variant selected once when the bench is configured.

mod builder;
mod coil;
mod microstep;
pub mod sequence;
mod servo;

pub use builder::MicrostepDriverBuilder;
pub use coil::{CoilDriver, CoilKind};
pub use microstep::{MicrostepDriver, MICROSTEP_PULSE_HIGH_US};
pub use servo::ServoDriver;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::{Direction, MotorStepParams};
use crate::error::Result;
use crate::motion::Move;

/// Advance a drive by one step.
pub trait StepOutput {
    /// Emit one step in `direction`.
    fn step(&mut self, direction: Direction) -> Result<()>;

    /// Number of single steps a movement request reduces to.
    fn steps_for(&self, mv: Move, direction: Direction, params: &MotorStepParams) -> u32 {
        let _ = direction;
        mv.steps(params)
    }

    /// Stop holding torque (coils low / driver disabled).
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: StepOutput + ?Sized> StepOutput for &mut T {
    fn step(&mut self, direction: Direction) -> Result<()> {
        (**self).step(direction)
    }

    fn steps_for(&self, mv: Move, direction: Direction, params: &MotorStepParams) -> u32 {
        (**self).steps_for(mv, direction, params)
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

/// Kind of drive attached to the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveKind {
    /// Unipolar motor behind a Darlington array.
    Darlington,
    /// Bipolar motor behind a dual H-bridge.
    HBridge,
    /// External step/dir microstepping driver.
    Microstep,
    /// Hobby servo on a PWM channel.
    Servo,
}

impl DriveKind {
    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Darlington => "Darlington",
            Self::HBridge => "H-bridge",
            Self::Microstep => "Microstep driver",
            Self::Servo => "Servo",
        }
    }
}

/// Drive selected at configuration time.
pub enum Drive<P, D, PWM>
where
    P: OutputPin,
    D: DelayNs,
    PWM: SetDutyCycle,
{
    /// Four coil pins through a sequence table.
    Coil(CoilDriver<P>),
    /// Step/dir driver.
    Microstep(MicrostepDriver<P, D>),
    /// Servo.
    Servo(ServoDriver<PWM>),
}

impl<P, D, PWM> Drive<P, D, PWM>
where
    P: OutputPin,
    D: DelayNs,
    PWM: SetDutyCycle,
{
    /// Kind of the selected drive.
    pub fn kind(&self) -> DriveKind {
        match self {
            Self::Coil(coil) => match coil.kind() {
                CoilKind::Darlington => DriveKind::Darlington,
                CoilKind::HBridge => DriveKind::HBridge,
            },
            Self::Microstep(_) => DriveKind::Microstep,
            Self::Servo(_) => DriveKind::Servo,
        }
    }
}

impl<P, D, PWM> StepOutput for Drive<P, D, PWM>
where
    P: OutputPin,
    D: DelayNs,
    PWM: SetDutyCycle,
{
    fn step(&mut self, direction: Direction) -> Result<()> {
        match self {
            Self::Coil(coil) => coil.step(direction),
            Self::Microstep(driver) => driver.step(direction),
            Self::Servo(servo) => servo.step(direction),
        }
    }

    fn steps_for(&self, mv: Move, direction: Direction, params: &MotorStepParams) -> u32 {
        match self {
            Self::Coil(coil) => coil.steps_for(mv, direction, params),
            Self::Microstep(driver) => driver.steps_for(mv, direction, params),
            Self::Servo(servo) => servo.steps_for(mv, direction, params),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self {
            Self::Coil(coil) => coil.release(),
            Self::Microstep(driver) => driver.release(),
            Self::Servo(servo) => servo.release(),
        }
    }
}
