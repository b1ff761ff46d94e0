//! Configuration validation.

use crate::error::{ConfigError, Result};

use super::DeviceConfig;

/// Inclusive numeric range for one configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Field name reported on rejection.
    pub field: &'static str,
    /// Inclusive lower bound.
    pub min: u32,
    /// Inclusive upper bound.
    pub max: u32,
}

impl Bounds {
    /// Create a new range.
    pub const fn new(field: &'static str, min: u32, max: u32) -> Self {
        Self { field, min, max }
    }

    /// Check if a value is within the range.
    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Pass the value through, or reject it with `ConfigError::OutOfRange`.
    pub fn check(&self, value: u32) -> core::result::Result<u32, ConfigError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ConfigError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Speed in revolutions per minute.
pub const RPM: Bounds = Bounds::new("rpm", 1, 1000);
/// Full steps per revolution.
pub const STEPS_PER_REVOLUTION: Bounds = Bounds::new("steps_per_revolution", 12, 8192);
/// Servo frame period in µs.
pub const PULSE_PERIOD: Bounds = Bounds::new("pulse_period", 10_000, 30_000);
/// Servo pulse width at 0° in µs.
pub const PULSE_MIN: Bounds = Bounds::new("pulse_min", 500, 2_400);
/// Servo pulse width at 180° in µs.
pub const PULSE_MAX: Bounds = Bounds::new("pulse_max", 600, 2_500);
/// Servo pulse width currently applied in µs.
pub const PULSE_TIME: Bounds = Bounds::new("pulse_time", 500, 2_500);
/// Servo angle in degrees.
pub const SERVO_ANGLE: Bounds = Bounds::new("angle", 0, 180);

/// Validate a device configuration.
///
/// Checks:
/// - Stepping speed and geometry are in range
/// - Servo pulse bounds and angle are in range
/// - Servo minimum pulse is below the maximum pulse
pub fn validate_config(config: &DeviceConfig) -> Result<()> {
    check_config(config)?;
    Ok(())
}

/// Field-level check shared with the block decoder.
pub(crate) fn check_config(config: &DeviceConfig) -> core::result::Result<(), ConfigError> {
    let motor = &config.motor;
    RPM.check(motor.rpm() as u32)?;
    STEPS_PER_REVOLUTION.check(motor.steps_per_revolution() as u32)?;

    let servo = &config.servo;
    PULSE_PERIOD.check(servo.pulse_period() as u32)?;
    PULSE_MIN.check(servo.pulse_min() as u32)?;
    PULSE_MAX.check(servo.pulse_max() as u32)?;
    PULSE_TIME.check(servo.pulse_time() as u32)?;
    SERVO_ANGLE.check(servo.angle() as u32)?;

    if servo.pulse_min() >= servo.pulse_max() {
        return Err(ConfigError::InvalidPulseBounds {
            min: servo.pulse_min(),
            max: servo.pulse_max(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(RPM.contains(1));
        assert!(RPM.contains(1000));
        assert!(!RPM.contains(0));
        assert_eq!(SERVO_ANGLE.check(180), Ok(180));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&DeviceConfig::default()).is_ok());
    }

    #[test]
    fn test_out_of_range_rpm_rejected() {
        let mut config = DeviceConfig::default();
        config.motor = crate::config::MotorStepParams::from_parts(
            0,
            200,
            crate::config::units::StepResolution::FULL,
            crate::config::units::Direction::Clockwise,
        );

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::OutOfRange { field: "rpm", .. }))
        ));
    }
}
