//! Builder pattern for MicrostepDriver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::MicrostepPins;
use crate::error::{MotorError, Result};

use super::microstep::MicrostepDriver;

/// Builder for creating MicrostepDriver instances.
///
/// Step, dir and delay are required; the control lines are optional and
/// default to unwired.
pub struct MicrostepDriverBuilder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    step_pin: Option<P>,
    dir_pin: Option<P>,
    enable_pin: Option<P>,
    sleep_pin: Option<P>,
    reset_pin: Option<P>,
    mode_pins: [Option<P>; 3],
    delay: Option<D>,
    levels: MicrostepPins,
}

impl<P, D> MicrostepDriverBuilder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create a new builder using the active levels and mode values of `levels`.
    pub fn new(levels: MicrostepPins) -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            enable_pin: None,
            sleep_pin: None,
            reset_pin: None,
            mode_pins: [None, None, None],
            delay: None,
            levels,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: P) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: P) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the ENABLE pin.
    pub fn enable_pin(mut self, pin: P) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the SLEEP pin.
    pub fn sleep_pin(mut self, pin: P) -> Self {
        self.sleep_pin = Some(pin);
        self
    }

    /// Set the RESET pin.
    pub fn reset_pin(mut self, pin: P) -> Self {
        self.reset_pin = Some(pin);
        self
    }

    /// Set the mode-select pins S1..S3; `None` leaves a line unwired.
    pub fn mode_pins(mut self, pins: [Option<P>; 3]) -> Self {
        self.mode_pins = pins;
        self
    }

    /// Set the delay provider used for the step pulse.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the MicrostepDriver.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::MissingPin` if step, dir or delay is missing.
    pub fn build(self) -> Result<MicrostepDriver<P, D>> {
        let step_pin = self.step_pin.ok_or(MotorError::MissingPin("step"))?;
        let dir_pin = self.dir_pin.ok_or(MotorError::MissingPin("dir"))?;
        let delay = self.delay.ok_or(MotorError::MissingPin("delay"))?;

        Ok(MicrostepDriver::new(
            step_pin,
            dir_pin,
            self.enable_pin,
            self.sleep_pin,
            self.reset_pin,
            self.mode_pins,
            delay,
            self.levels,
        ))
    }
}
