//! Stepping parameters shared by every stepper drive.

use libm::{floor, floorf};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::timing::calculate_step_delay;

use super::units::{Degrees, Direction, StepResolution};
use super::validation::{RPM, STEPS_PER_REVOLUTION};

/// Default speed in revolutions per minute.
pub const DEFAULT_RPM: u16 = 4;
/// Default full steps per revolution (1.8° motor).
pub const DEFAULT_STEPS_PER_REVOLUTION: u16 = 200;

/// Speed, geometry and direction of the stepper under test.
///
/// `step_delay` and `rpm_step_delay` are caches derived from `rpm`,
/// `steps_per_revolution` and `step_resolution`; every setter refreshes them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "MotorStepPreset")]
pub struct MotorStepParams {
    step_delay: u32,
    rpm_step_delay: u32,
    rpm: u16,
    steps_per_revolution: u16,
    step_resolution: StepResolution,
    rotation_direction: Direction,
}

impl MotorStepParams {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` if `rpm` or `steps_per_revolution`
    /// is outside its bounds.
    pub fn new(
        rpm: u16,
        steps_per_revolution: u16,
        step_resolution: StepResolution,
        rotation_direction: Direction,
    ) -> Result<Self, ConfigError> {
        RPM.check(rpm as u32)?;
        STEPS_PER_REVOLUTION.check(steps_per_revolution as u32)?;
        Ok(Self::from_parts(rpm, steps_per_revolution, step_resolution, rotation_direction))
    }

    /// Build without bounds checks, deriving the cached delays.
    pub(crate) fn from_parts(
        rpm: u16,
        steps_per_revolution: u16,
        step_resolution: StepResolution,
        rotation_direction: Direction,
    ) -> Self {
        let mut params = Self {
            step_delay: 0,
            rpm_step_delay: 0,
            rpm,
            steps_per_revolution,
            step_resolution,
            rotation_direction,
        };
        params.recalculate();
        params
    }

    /// Delay between step pulses in microseconds.
    #[inline]
    pub fn step_delay(&self) -> u32 {
        self.step_delay
    }

    /// RPM-derived delay in microseconds (same value as `step_delay`).
    #[inline]
    pub fn rpm_step_delay(&self) -> u32 {
        self.rpm_step_delay
    }

    /// Speed in revolutions per minute.
    #[inline]
    pub fn rpm(&self) -> u16 {
        self.rpm
    }

    /// Full steps per mechanical revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u16 {
        self.steps_per_revolution
    }

    /// Microstep divisor.
    #[inline]
    pub fn step_resolution(&self) -> StepResolution {
        self.step_resolution
    }

    /// Configured rotation direction.
    #[inline]
    pub fn rotation_direction(&self) -> Direction {
        self.rotation_direction
    }

    /// Set the speed, rejecting values outside [1, 1000].
    pub fn set_rpm(&mut self, rpm: u16) -> Result<(), ConfigError> {
        RPM.check(rpm as u32)?;
        self.rpm = rpm;
        self.recalculate();
        Ok(())
    }

    /// Set steps per revolution, rejecting values outside [12, 8192].
    pub fn set_steps_per_revolution(&mut self, steps: u16) -> Result<(), ConfigError> {
        STEPS_PER_REVOLUTION.check(steps as u32)?;
        self.steps_per_revolution = steps;
        self.recalculate();
        Ok(())
    }

    /// Set the microstep divisor.
    pub fn set_step_resolution(&mut self, resolution: StepResolution) {
        self.step_resolution = resolution;
        self.recalculate();
    }

    /// Set the rotation direction.
    pub fn set_rotation_direction(&mut self, direction: Direction) {
        self.rotation_direction = direction;
    }

    /// Refresh the cached step delays.
    pub fn recalculate(&mut self) {
        let delay = calculate_step_delay(self.rpm, self.steps_per_revolution, self.step_resolution);
        self.step_delay = delay;
        self.rpm_step_delay = delay;
    }

    /// Step pulses per output revolution (`steps_per_revolution × resolution`).
    #[inline]
    pub fn pulses_per_revolution(&self) -> u32 {
        self.steps_per_revolution as u32 * self.step_resolution.value() as u32
    }

    /// Step pulses for `revolutions` whole turns.
    pub fn steps_for_revolutions(&self, revolutions: u32) -> u32 {
        self.pulses_per_revolution().saturating_mul(revolutions)
    }

    /// Step pulses for a rotation angle, truncated. Negative angles give zero.
    ///
    /// Whole-degree angles are computed exactly in integers; fractional ones
    /// go through f64 so large products keep their low digits.
    pub fn steps_for_angle(&self, angle: Degrees) -> u32 {
        let degrees = angle.value();
        if degrees.is_nan() || degrees <= 0.0 {
            return 0;
        }
        let pulses = self.pulses_per_revolution() as u64;
        let steps = if floorf(degrees) == degrees && degrees <= u32::MAX as f32 {
            pulses * degrees as u64 / 360
        } else {
            floor(pulses as f64 * degrees as f64 / 360.0) as u64
        };
        steps.min(u32::MAX as u64) as u32
    }
}

impl Default for MotorStepParams {
    fn default() -> Self {
        Self::from_parts(
            DEFAULT_RPM,
            DEFAULT_STEPS_PER_REVOLUTION,
            StepResolution::FULL,
            Direction::Clockwise,
        )
    }
}

/// Preset form of [`MotorStepParams`] without the derived caches.
#[derive(Debug, Clone, Deserialize)]
struct MotorStepPreset {
    #[serde(default = "default_rpm")]
    rpm: u16,
    #[serde(default = "default_steps_per_revolution")]
    steps_per_revolution: u16,
    #[serde(default)]
    step_resolution: StepResolution,
    #[serde(default)]
    rotation_direction: Direction,
}

fn default_rpm() -> u16 {
    DEFAULT_RPM
}

fn default_steps_per_revolution() -> u16 {
    DEFAULT_STEPS_PER_REVOLUTION
}

impl From<MotorStepPreset> for MotorStepParams {
    fn from(preset: MotorStepPreset) -> Self {
        Self::from_parts(
            preset.rpm,
            preset.steps_per_revolution,
            preset.step_resolution,
            preset.rotation_direction,
        )
    }
}
