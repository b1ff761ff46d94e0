//! Hobby servo pulse parameters and the angle → pulse model.

use serde::Deserialize;

use crate::error::ConfigError;

use super::units::PinId;
use super::validation::{PULSE_MAX, PULSE_MIN, PULSE_PERIOD, PULSE_TIME, SERVO_ANGLE};

/// Default frame period in µs (50 Hz).
pub const DEFAULT_PULSE_PERIOD: u16 = 20_000;
/// Default pulse width at 0° in µs.
pub const DEFAULT_PULSE_MIN: u16 = 1_000;
/// Default pulse width at 180° in µs.
pub const DEFAULT_PULSE_MAX: u16 = 2_000;
/// Default pulse width in µs (90°).
pub const DEFAULT_PULSE_TIME: u16 = 1_500;
/// Default angle in degrees.
pub const DEFAULT_ANGLE: u8 = 90;
/// Highest reachable angle in degrees.
pub const MAX_ANGLE: u8 = 180;
/// Tick rate of the hardware timer generating the pulse (16 MHz / 8).
pub const SERVO_TIMER_HZ: u32 = 2_000_000;

/// Convert a pulse width into timer ticks for the active and idle parts of a frame.
///
/// Returns `(ticks_high, ticks_low)`.
pub fn pulse_width_to_ticks(width_us: u16, period_us: u16, timer_hz: u32) -> (u32, u32) {
    let to_ticks = |us: u16| (us as u64 * timer_hz as u64 / 1_000_000) as u32;
    (to_ticks(width_us), to_ticks(period_us.saturating_sub(width_us)))
}

/// Pulse timing, derived timer ticks and position of a servo.
///
/// Every bound is checked by its setter; a rejected value leaves the
/// parameters unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ServoPreset")]
pub struct ServoParams {
    pulse_period: u16,
    pulse_min: u16,
    pulse_max: u16,
    pulse_time: u16,
    ticks_high: u32,
    ticks_low: u32,
    pwm_pin: PinId,
    angle: u8,
}

impl ServoParams {
    /// Build without bounds checks, deriving the tick counts.
    pub(crate) fn from_parts(
        pulse_period: u16,
        pulse_min: u16,
        pulse_max: u16,
        pulse_time: u16,
        pwm_pin: PinId,
        angle: u8,
    ) -> Self {
        let mut params = Self {
            pulse_period,
            pulse_min,
            pulse_max,
            pulse_time,
            ticks_high: 0,
            ticks_low: 0,
            pwm_pin,
            angle,
        };
        params.recalculate();
        params
    }

    /// Frame period in µs.
    #[inline]
    pub fn pulse_period(&self) -> u16 {
        self.pulse_period
    }

    /// Pulse width at 0° in µs.
    #[inline]
    pub fn pulse_min(&self) -> u16 {
        self.pulse_min
    }

    /// Pulse width at 180° in µs.
    #[inline]
    pub fn pulse_max(&self) -> u16 {
        self.pulse_max
    }

    /// Pulse width currently applied in µs.
    #[inline]
    pub fn pulse_time(&self) -> u16 {
        self.pulse_time
    }

    /// Timer ticks of the active part of the frame.
    #[inline]
    pub fn ticks_high(&self) -> u32 {
        self.ticks_high
    }

    /// Timer ticks of the idle part of the frame.
    #[inline]
    pub fn ticks_low(&self) -> u32 {
        self.ticks_low
    }

    /// PWM output pin.
    #[inline]
    pub fn pwm_pin(&self) -> PinId {
        self.pwm_pin
    }

    /// Current angle in degrees.
    #[inline]
    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Linear interpolation from `pulse_min` at 0° to `pulse_max` at 180°.
    ///
    /// Angles above 180° are clamped.
    pub fn angle_to_pulse_width(&self, angle: u8) -> u16 {
        let angle = angle.min(MAX_ANGLE) as u32;
        let min = self.pulse_min as u32;
        let span = (self.pulse_max as u32).saturating_sub(min);
        (min + span * angle / MAX_ANGLE as u32) as u16
    }

    /// Set the frame period.
    pub fn set_pulse_period(&mut self, period: u16) -> Result<(), ConfigError> {
        PULSE_PERIOD.check(period as u32)?;
        self.pulse_period = period;
        self.recalculate();
        Ok(())
    }

    /// Set the 0° pulse width; must stay below `pulse_max`.
    ///
    /// The pulse width and ticks are re-derived from the current angle.
    pub fn set_pulse_min(&mut self, min: u16) -> Result<(), ConfigError> {
        PULSE_MIN.check(min as u32)?;
        if min >= self.pulse_max {
            return Err(ConfigError::InvalidPulseBounds {
                min,
                max: self.pulse_max,
            });
        }
        self.pulse_min = min;
        self.follow_angle();
        Ok(())
    }

    /// Set the 180° pulse width; must stay above `pulse_min`.
    ///
    /// The pulse width and ticks are re-derived from the current angle.
    pub fn set_pulse_max(&mut self, max: u16) -> Result<(), ConfigError> {
        PULSE_MAX.check(max as u32)?;
        if max <= self.pulse_min {
            return Err(ConfigError::InvalidPulseBounds {
                min: self.pulse_min,
                max,
            });
        }
        self.pulse_max = max;
        self.follow_angle();
        Ok(())
    }

    /// Set the applied pulse width directly.
    pub fn set_pulse_time(&mut self, width: u16) -> Result<(), ConfigError> {
        PULSE_TIME.check(width as u32)?;
        self.pulse_time = width;
        self.recalculate();
        Ok(())
    }

    /// Move to an angle: updates the angle, the pulse width and the ticks.
    pub fn set_angle(&mut self, angle: u8) -> Result<(), ConfigError> {
        SERVO_ANGLE.check(angle as u32)?;
        self.angle = angle;
        self.follow_angle();
        Ok(())
    }

    /// Assign the PWM output pin.
    pub fn set_pwm_pin(&mut self, pin: PinId) {
        self.pwm_pin = pin;
    }

    fn follow_angle(&mut self) {
        self.pulse_time = self.angle_to_pulse_width(self.angle);
        self.recalculate();
    }

    /// Refresh the tick counts from the pulse width and period.
    pub fn recalculate(&mut self) {
        let (high, low) = pulse_width_to_ticks(self.pulse_time, self.pulse_period, SERVO_TIMER_HZ);
        self.ticks_high = high;
        self.ticks_low = low;
    }
}

impl Default for ServoParams {
    fn default() -> Self {
        Self::from_parts(
            DEFAULT_PULSE_PERIOD,
            DEFAULT_PULSE_MIN,
            DEFAULT_PULSE_MAX,
            DEFAULT_PULSE_TIME,
            PinId(6),
            DEFAULT_ANGLE,
        )
    }
}

/// Preset form of [`ServoParams`] without the derived ticks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServoPreset {
    pulse_period: u16,
    pulse_min: u16,
    pulse_max: u16,
    pulse_time: u16,
    pwm_pin: PinId,
    angle: u8,
}

impl Default for ServoPreset {
    fn default() -> Self {
        let params = ServoParams::default();
        Self {
            pulse_period: params.pulse_period,
            pulse_min: params.pulse_min,
            pulse_max: params.pulse_max,
            pulse_time: params.pulse_time,
            pwm_pin: params.pwm_pin,
            angle: params.angle,
        }
    }
}

impl From<ServoPreset> for ServoParams {
    fn from(preset: ServoPreset) -> Self {
        Self::from_parts(
            preset.pulse_period,
            preset.pulse_min,
            preset.pulse_max,
            preset.pulse_time,
            preset.pwm_pin,
            preset.angle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pulse_endpoints() {
        let servo = ServoParams::default();
        assert_eq!(servo.angle_to_pulse_width(0), 1_000);
        assert_eq!(servo.angle_to_pulse_width(90), 1_500);
        assert_eq!(servo.angle_to_pulse_width(180), 2_000);
        assert_eq!(servo.angle_to_pulse_width(255), 2_000);
    }

    #[test]
    fn test_default_ticks() {
        let servo = ServoParams::default();
        // 1500 µs high, 18500 µs low at 2 MHz
        assert_eq!(servo.ticks_high(), 3_000);
        assert_eq!(servo.ticks_low(), 37_000);
    }

    #[test]
    fn test_set_angle_updates_pulse() {
        let mut servo = ServoParams::default();
        servo.set_angle(0).unwrap();
        assert_eq!(servo.pulse_time(), 1_000);
        assert_eq!(servo.ticks_high(), 2_000);
        assert!(servo.set_angle(181).is_err());
        assert_eq!(servo.angle(), 0);
    }

    #[test]
    fn test_pulse_bounds_stay_ordered() {
        let mut servo = ServoParams::default();
        assert_eq!(
            servo.set_pulse_min(2_000),
            Err(ConfigError::InvalidPulseBounds { min: 2_000, max: 2_000 })
        );
        assert!(servo.set_pulse_max(900).is_err());
        assert!(servo.set_pulse_min(499).is_err());
        servo.set_pulse_max(2_500).unwrap();
        servo.set_pulse_min(500).unwrap();
        assert_eq!(servo.angle_to_pulse_width(180), 2_500);
    }

    #[test]
    fn test_pulse_bounds_move_applied_pulse() {
        let mut servo = ServoParams::default();
        servo.set_pulse_max(2_500).unwrap();
        assert_eq!(servo.pulse_time(), 1_750);
        assert_eq!(servo.ticks_high(), 3_500);

        servo.set_pulse_min(500).unwrap();
        assert_eq!(servo.pulse_time(), 1_500);
        assert_eq!(servo.ticks_low(), 37_000);
        assert!(servo.set_pulse_min(2_500).is_err());
        assert_eq!(servo.pulse_time(), 1_500);
    }

    proptest! {
        #[test]
        fn pulse_width_monotonic(
            min in 500u16..=2_400,
            extra in 1u16..=2_000,
            angle in 0u8..180,
        ) {
            let max = (min + extra).min(2_500);
            prop_assume!(max > min);
            let servo = ServoParams::from_parts(20_000, min, max, min, PinId(6), 0);
            let here = servo.angle_to_pulse_width(angle);
            let next = servo.angle_to_pulse_width(angle + 1);
            prop_assert!(next >= here);
            prop_assert!(here >= min && next <= max);
        }
    }
}
