//! Bench preset loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::DeviceConfig;

/// Load a bench preset from a TOML file.
///
/// Missing sections and keys take their compiled defaults; derived values
/// (step delays, servo ticks) are always recomputed.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use motor_bench::load_preset;
///
/// let config = load_preset("nema17.toml")?;
/// ```
pub fn load_preset<P: AsRef<Path>>(path: P) -> Result<DeviceConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_preset(&content)
}

/// Parse a bench preset from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_preset(content: &str) -> Result<DeviceConfig> {
    let config: DeviceConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, LogicLevel, MicrostepLine, PinId, StepResolution, StepSequence};

    #[test]
    fn test_parse_empty_preset() {
        let config = parse_preset("").unwrap();
        assert_eq!(config, DeviceConfig::defaults());
    }

    #[test]
    fn test_parse_motor_section() {
        let toml = r#"
[motor]
rpm = 60
steps_per_revolution = 400
step_resolution = 8
rotation_direction = "counter_clockwise"
"#;

        let config = parse_preset(toml).unwrap();
        assert_eq!(config.motor.rpm(), 60);
        assert_eq!(config.motor.step_resolution(), StepResolution::EIGHTH);
        assert_eq!(config.motor.rotation_direction(), Direction::CounterClockwise);
        // 60e6 / (60 * 400 * 8)
        assert_eq!(config.motor.step_delay(), 312);
        assert_eq!(config.servo, DeviceConfig::defaults().servo);
    }

    #[test]
    fn test_parse_wiring_sections() {
        let toml = r#"
[stepper]
a1 = 2
a2 = 3
b1 = 4
b2 = 5
sequence = "half_step"

[microstep]
step = 7
dir = 6
dir_level = "low"

[servo]
pulse_min = 600
pulse_max = 2400
angle = 45
pwm_pin = 9
"#;

        let config = parse_preset(toml).unwrap();
        assert_eq!(config.stepper.a1, PinId(2));
        assert_eq!(config.stepper.sequence, StepSequence::HalfStep);
        assert_eq!(config.microstep.pin(MicrostepLine::Step), PinId(7));
        assert_eq!(config.microstep.dir_level, LogicLevel::Low);
        assert_eq!(config.servo.pwm_pin(), PinId(9));
        assert_eq!(config.servo.pulse_max(), 2_400);
    }

    #[test]
    fn test_parse_rejects_invalid_resolution() {
        let toml = r#"
[motor]
step_resolution = 3
"#;

        let result = parse_preset(toml);
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_rpm() {
        let toml = r#"
[motor]
rpm = 2000
"#;

        let result = parse_preset(toml);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::OutOfRange { field: "rpm", .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_preset("/nonexistent/bench.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }
}
