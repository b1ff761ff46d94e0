//! Step/dir microstepping driver (A4988, DRV8825 and compatibles).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::config::{Direction, LogicLevel, MicrostepPins};
use crate::error::{MotorError, Result};
use crate::fmt::debug;

use super::StepOutput;

/// Width of the high phase of a step pulse in µs.
pub const MICROSTEP_PULSE_HIGH_US: u32 = 5;

/// External driver controlled through step, direction and optional
/// enable / sleep / reset / mode-select lines.
///
/// Optional lines that are not wired are simply never written.
pub struct MicrostepDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    step_pin: P,
    dir_pin: P,
    enable_pin: Option<P>,
    sleep_pin: Option<P>,
    reset_pin: Option<P>,
    mode_pins: [Option<P>; 3],
    delay: D,
    levels: MicrostepPins,
    /// Last direction written, to avoid redundant pin writes.
    current_direction: Option<Direction>,
}

impl<P, D> MicrostepDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        step_pin: P,
        dir_pin: P,
        enable_pin: Option<P>,
        sleep_pin: Option<P>,
        reset_pin: Option<P>,
        mode_pins: [Option<P>; 3],
        delay: D,
        levels: MicrostepPins,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            sleep_pin,
            reset_pin,
            mode_pins,
            delay,
            levels,
            current_direction: None,
        }
    }

    /// Bring the driver out of reset and sleep, write the mode-select
    /// values and enable the outputs.
    pub fn init(&mut self) -> Result<()> {
        self.reset(false)?;
        self.sleep(false)?;
        let values = self.levels.mode_values;
        self.set_mode(values)?;
        self.enable(true)?;
        debug!("microstep driver initialised");
        Ok(())
    }

    /// Enable or disable the power stage.
    pub fn enable(&mut self, on: bool) -> Result<()> {
        let active = self.levels.enable_level;
        drive_line(self.enable_pin.as_mut(), active, on)
    }

    /// Enter or leave low-power sleep.
    pub fn sleep(&mut self, asleep: bool) -> Result<()> {
        let active = self.levels.sleep_level;
        drive_line(self.sleep_pin.as_mut(), active, asleep)
    }

    /// Hold or release the translator reset.
    pub fn reset(&mut self, asserted: bool) -> Result<()> {
        let active = self.levels.reset_level;
        drive_line(self.reset_pin.as_mut(), active, asserted)
    }

    /// Write the mode-select lines S1..S3.
    pub fn set_mode(&mut self, values: [LogicLevel; 3]) -> Result<()> {
        for (pin, level) in self.mode_pins.iter_mut().zip(values) {
            if let Some(pin) = pin {
                pin.set_state(level.into()).map_err(|_| MotorError::PinError)?;
            }
        }
        self.levels.mode_values = values;
        Ok(())
    }

    /// Mode-select values last written.
    #[inline]
    pub fn mode(&self) -> [LogicLevel; 3] {
        self.levels.mode_values
    }

    /// Direction last written to the dir line.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.current_direction
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let level = match direction {
            Direction::Clockwise => self.levels.dir_level,
            Direction::CounterClockwise => !self.levels.dir_level,
        };
        self.dir_pin
            .set_state(level.into())
            .map_err(|_| MotorError::PinError)?;

        self.current_direction = Some(direction);
        Ok(())
    }
}

impl<P, D> StepOutput for MicrostepDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn step(&mut self, direction: Direction) -> Result<()> {
        self.set_direction(direction)?;

        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(MICROSTEP_PULSE_HIGH_US);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;

        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.enable(false)
    }
}

fn drive_line<P: OutputPin>(pin: Option<&mut P>, active: LogicLevel, asserted: bool) -> Result<()> {
    let Some(pin) = pin else {
        return Ok(());
    };
    let level = if asserted { active } else { !active };
    pin.set_state(PinState::from(level))
        .map_err(|_| MotorError::PinError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MicrostepDriverBuilder;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    #[test]
    fn test_step_pulse_sets_direction_once() {
        let step_expectations = [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ];
        // default dir_level is High for clockwise
        let dir_expectations = [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ];
        let mut step = PinMock::new(&step_expectations);
        let mut dir = PinMock::new(&dir_expectations);

        let mut driver = MicrostepDriverBuilder::new(MicrostepPins::default())
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .delay(NoopDelay::new())
            .build()
            .unwrap();

        driver.step(Direction::Clockwise).unwrap();
        driver.step(Direction::Clockwise).unwrap();
        driver.step(Direction::CounterClockwise).unwrap();
        assert_eq!(driver.direction(), Some(Direction::CounterClockwise));

        step.done();
        dir.done();
    }

    #[test]
    fn test_init_and_release_use_active_levels() {
        // reset and sleep released (active low -> high), then enable asserted (low)
        let mut reset = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut sleep = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut enable = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut step = PinMock::new(&[]);
        let mut dir = PinMock::new(&[]);

        let mut driver = MicrostepDriverBuilder::new(MicrostepPins::default())
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .enable_pin(enable.clone())
            .sleep_pin(sleep.clone())
            .reset_pin(reset.clone())
            .delay(NoopDelay::new())
            .build()
            .unwrap();

        driver.init().unwrap();
        driver.release().unwrap();

        reset.done();
        sleep.done();
        enable.done();
        step.done();
        dir.done();
    }

    #[test]
    fn test_set_mode_writes_wired_lines_only() {
        use crate::config::{mode_select_for, StepResolution};

        let mut s1 = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut s2 = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut step = PinMock::new(&[]);
        let mut dir = PinMock::new(&[]);

        let mut driver = MicrostepDriverBuilder::new(MicrostepPins::default())
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .mode_pins([Some(s1.clone()), Some(s2.clone()), None])
            .delay(NoopDelay::new())
            .build()
            .unwrap();

        let eighth = mode_select_for(StepResolution::EIGHTH);
        driver.set_mode(eighth).unwrap();
        assert_eq!(driver.mode(), eighth);

        s1.done();
        s2.done();
        step.done();
        dir.done();
    }
}
