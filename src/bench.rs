//! Bench facade for the menu layer.
//!
//! Owns the working configuration and the store it came from. Every setter
//! validates its input; a rejected value is logged and leaves the
//! configuration untouched.

use core::fmt::{self, Write};

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use heapless::String;

use crate::config::validation::Bounds;
use crate::config::{
    ConfigSource, ConfigStorage, ConfigStore, DeviceConfig, Direction, LogicLevel, MicrostepLine,
    MicrostepPins, MotorStepParams, PinId, ServoParams, StepResolution, StepSequence, StepperPins,
};
use crate::drive::{CoilDriver, DriveKind, ServoDriver};
use crate::error::{ConfigError, Result};
use crate::fmt::{info, warning};

/// Capacity of a rendered configuration view.
pub const VIEW_CAPACITY: usize = 512;

/// Working configuration bound to its persistent store.
///
/// # Example
///
/// ```rust
/// use motor_bench::{MemoryStorage, MotorBench};
///
/// let mut bench = MotorBench::open(MemoryStorage::new());
/// bench.set_rpm(60)?;
/// bench.save()?;
/// assert_eq!(bench.motor().step_delay(), 5_000);
/// # Ok::<(), motor_bench::Error>(())
/// ```
pub struct MotorBench<S: ConfigStorage> {
    store: ConfigStore<S>,
    config: DeviceConfig,
    source: ConfigSource,
}

impl<S: ConfigStorage> MotorBench<S> {
    /// Load the stored configuration, or defaults if there is none.
    pub fn open(storage: S) -> Self {
        let mut store = ConfigStore::new(storage);
        let loaded = store.load();
        Self {
            store,
            config: loaded.config,
            source: loaded.source,
        }
    }

    /// Discard unsaved changes and reload from storage.
    pub fn load(&mut self) -> ConfigSource {
        let loaded = self.store.load();
        self.config = loaded.config;
        self.source = loaded.source;
        self.source
    }

    /// Persist the working configuration.
    pub fn save(&mut self) -> Result<()> {
        self.store.save(&self.config)?;
        self.source = ConfigSource::Stored;
        Ok(())
    }

    /// Overwrite storage and the working configuration with defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.config = self.store.reset()?;
        self.source = ConfigSource::Stored;
        Ok(())
    }

    /// Where the working configuration was last loaded from.
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Working configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Stepping parameters.
    pub fn motor(&self) -> &MotorStepParams {
        &self.config.motor
    }

    /// Coil wiring and sequence.
    pub fn stepper(&self) -> &StepperPins {
        &self.config.stepper
    }

    /// Microstep driver wiring.
    pub fn microstep(&self) -> &MicrostepPins {
        &self.config.microstep
    }

    /// Servo parameters.
    pub fn servo(&self) -> &ServoParams {
        &self.config.servo
    }

    /// Release the store.
    pub fn into_store(self) -> ConfigStore<S> {
        self.store
    }

    // ---- stepping ---------------------------------------------------------

    /// Set the speed in rpm; the step delay follows.
    pub fn set_rpm(&mut self, rpm: u16) -> Result<()> {
        self.config.motor.set_rpm(rpm).map_err(rejected)?;
        info!("rpm set to {=u16}", rpm);
        Ok(())
    }

    /// Set the full steps per revolution; the step delay follows.
    pub fn set_steps_per_revolution(&mut self, steps: u16) -> Result<()> {
        self.config
            .motor
            .set_steps_per_revolution(steps)
            .map_err(rejected)?;
        Ok(())
    }

    /// Set the step resolution (1, 2, 4, 8, 16 or 32); the step delay follows.
    ///
    /// The S1..S3 mode values are left as configured, since the table differs
    /// between driver chips. See [`Self::apply_drv8825_mode`].
    pub fn set_step_resolution(&mut self, value: u8) -> Result<()> {
        let resolution = StepResolution::new(value).map_err(rejected)?;
        self.config.motor.set_step_resolution(resolution);
        Ok(())
    }

    /// Set the configured rotation direction.
    pub fn set_rotation_direction(&mut self, direction: Direction) {
        self.config.motor.set_rotation_direction(direction);
    }

    /// Set the rotation direction from its menu code (1 = CW, 2 = CCW).
    pub fn set_rotation_direction_code(&mut self, code: u8) -> Result<()> {
        let direction = Direction::from_code(code).map_err(rejected)?;
        self.set_rotation_direction(direction);
        Ok(())
    }

    // ---- coil drive -------------------------------------------------------

    /// Set the coil sequence from its menu code (1 = full, 2 = wave, 3 = half).
    pub fn set_step_sequence(&mut self, code: i8) -> Result<()> {
        let sequence = StepSequence::from_code(code).map_err(rejected)?;
        self.config.stepper.sequence = sequence;
        self.config.stepper.phase = self.config.stepper.normalized_phase();
        Ok(())
    }

    /// Assign the four coil pins.
    pub fn set_coil_pins(&mut self, a1: PinId, a2: PinId, b1: PinId, b2: PinId) {
        let stepper = &mut self.config.stepper;
        stepper.a1 = a1;
        stepper.a2 = a2;
        stepper.b1 = b1;
        stepper.b2 = b2;
    }

    /// Set the phase index within the current sequence.
    pub fn set_phase_index(&mut self, phase: i8) -> Result<()> {
        let last = self.config.stepper.sequence.phase_count() as u32 - 1;
        Bounds::new("phase", 0, last)
            .check(phase as u8 as u32)
            .map_err(rejected)?;
        self.config.stepper.phase = phase;
        Ok(())
    }

    /// Copy the phase reached by a coil driver into the working configuration.
    pub fn record_phase<P: OutputPin>(&mut self, driver: &CoilDriver<P>) {
        driver.store_into(&mut self.config.stepper);
    }

    // ---- microstep drive --------------------------------------------------

    /// Assign a microstep driver line to a pin.
    pub fn set_microstep_pin(&mut self, line: MicrostepLine, pin: PinId) {
        self.config.microstep.set_pin(line, pin);
    }

    /// Overwrite S1..S3 with the DRV8825 values for the current resolution.
    pub fn apply_drv8825_mode(&mut self) {
        let resolution = self.config.motor.step_resolution();
        self.config.microstep.set_mode_for_resolution(resolution);
        info!("mode values set for 1/{=u8} on DRV8825", resolution.value());
    }

    /// Set the active level of a control line, or the value of a mode line.
    ///
    /// The step line has no configurable level and returns `false`.
    pub fn set_microstep_level(&mut self, line: MicrostepLine, level: LogicLevel) -> bool {
        let accepted = self.config.microstep.set_level(line, level);
        if !accepted {
            warning!("step line has no configurable level");
        }
        accepted
    }

    // ---- servo ------------------------------------------------------------

    /// Set the servo frame period in µs.
    pub fn set_servo_pulse_period(&mut self, period: u16) -> Result<()> {
        self.config.servo.set_pulse_period(period).map_err(rejected)?;
        Ok(())
    }

    /// Set the servo pulse width at 0° in µs.
    pub fn set_servo_pulse_min(&mut self, min: u16) -> Result<()> {
        self.config.servo.set_pulse_min(min).map_err(rejected)?;
        Ok(())
    }

    /// Set the servo pulse width at 180° in µs.
    pub fn set_servo_pulse_max(&mut self, max: u16) -> Result<()> {
        self.config.servo.set_pulse_max(max).map_err(rejected)?;
        Ok(())
    }

    /// Set the applied servo pulse width in µs.
    pub fn set_servo_pulse_time(&mut self, width: u16) -> Result<()> {
        self.config.servo.set_pulse_time(width).map_err(rejected)?;
        Ok(())
    }

    /// Set the servo angle; the pulse width follows.
    pub fn set_servo_angle(&mut self, angle: u8) -> Result<()> {
        self.config.servo.set_angle(angle).map_err(rejected)?;
        Ok(())
    }

    /// Assign the servo PWM pin.
    pub fn set_servo_pin(&mut self, pin: PinId) {
        self.config.servo.set_pwm_pin(pin);
    }

    /// Copy the position reached by a servo driver into the working configuration.
    pub fn record_servo<PWM: SetDutyCycle>(&mut self, driver: &ServoDriver<PWM>) {
        self.config.servo = driver.params().clone();
    }

    // ---- view -------------------------------------------------------------

    /// Render the read-only configuration view for a drive.
    ///
    /// Output longer than [`VIEW_CAPACITY`] is truncated.
    pub fn view_config(&self, kind: DriveKind) -> String<VIEW_CAPACITY> {
        let mut out = String::new();
        let _ = self.render(kind, &mut out);
        out
    }

    fn render(&self, kind: DriveKind, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "Drive: {}", kind.label())?;

        if kind == DriveKind::Servo {
            let servo = &self.config.servo;
            writeln!(out, "Pulse period: {} us", servo.pulse_period())?;
            writeln!(out, "Pulse min: {} us", servo.pulse_min())?;
            writeln!(out, "Pulse max: {} us", servo.pulse_max())?;
            writeln!(out, "Pulse: {} us", servo.pulse_time())?;
            writeln!(out, "Angle: {} deg", servo.angle())?;
            writeln!(out, "Ticks: {} high / {} low", servo.ticks_high(), servo.ticks_low())?;
            return writeln!(out, "PWM pin: {}", Pin(servo.pwm_pin()));
        }

        let motor = &self.config.motor;
        writeln!(out, "Speed: {} rpm", motor.rpm())?;
        writeln!(out, "Steps/rev: {}", motor.steps_per_revolution())?;
        writeln!(out, "Resolution: {}", motor.step_resolution().label())?;
        writeln!(out, "Direction: {}", motor.rotation_direction().label())?;
        writeln!(out, "Step delay: {} us", motor.step_delay())?;

        match kind {
            DriveKind::Darlington | DriveKind::HBridge => {
                let stepper = &self.config.stepper;
                writeln!(out, "Sequence: {}", stepper.sequence.label())?;
                writeln!(
                    out,
                    "Pins A1 A2 B1 B2: {} {} {} {}",
                    Pin(stepper.a1),
                    Pin(stepper.a2),
                    Pin(stepper.b1),
                    Pin(stepper.b2)
                )?;
                writeln!(out, "Phase: {}", stepper.phase)
            }
            _ => {
                let ms = &self.config.microstep;
                writeln!(out, "Step pin: {}", Pin(ms.step))?;
                writeln!(out, "Dir pin: {} (CW {})", Pin(ms.dir), ms.dir_level.label())?;
                writeln!(out, "Enable pin: {} (active {})", Pin(ms.enable), ms.enable_level.label())?;
                writeln!(out, "Sleep pin: {} (active {})", Pin(ms.sleep), ms.sleep_level.label())?;
                writeln!(out, "Reset pin: {} (active {})", Pin(ms.reset), ms.reset_level.label())?;
                writeln!(
                    out,
                    "Mode pins: {} {} {}",
                    Pin(ms.mode[0]),
                    Pin(ms.mode[1]),
                    Pin(ms.mode[2])
                )?;
                writeln!(
                    out,
                    "Mode: {} {} {}",
                    ms.mode_values[0].label(),
                    ms.mode_values[1].label(),
                    ms.mode_values[2].label()
                )
            }
        }
    }
}

/// Pin number, or `-` when unassigned.
struct Pin(PinId);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_assigned() {
            write!(f, "{}", self.0.value())
        } else {
            f.write_str("-")
        }
    }
}

fn rejected(err: ConfigError) -> ConfigError {
    match &err {
        ConfigError::OutOfRange { value, .. } => warning!("value {=u32} out of range, kept previous", *value),
        _ => warning!("value rejected, kept previous"),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStorage;
    use crate::error::Error;

    #[test]
    fn test_open_blank_storage() {
        let bench = MotorBench::open(MemoryStorage::new());
        assert_eq!(bench.source(), ConfigSource::Defaults);
        assert_eq!(bench.motor().step_delay(), 75_000);
    }

    #[test]
    fn test_rejected_setter_keeps_value() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        assert!(matches!(
            bench.set_rpm(0),
            Err(Error::Config(ConfigError::OutOfRange { field: "rpm", .. }))
        ));
        assert!(bench.set_step_resolution(3).is_err());
        assert!(bench.set_step_sequence(4).is_err());
        assert!(bench.set_servo_angle(181).is_err());
        assert_eq!(bench.config(), &DeviceConfig::defaults());
    }

    #[test]
    fn test_resolution_keeps_custom_mode_values() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        // A4988 1/16 is S1..S3 all high
        for line in [MicrostepLine::S1, MicrostepLine::S2, MicrostepLine::S3] {
            assert!(bench.set_microstep_level(line, LogicLevel::High));
        }
        bench.set_step_resolution(16).unwrap();
        assert_eq!(bench.microstep().mode_values, [LogicLevel::High; 3]);
        assert_eq!(bench.motor().step_delay(), 4_687);
    }

    #[test]
    fn test_drv8825_mode_follows_resolution() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        bench.set_step_resolution(16).unwrap();
        bench.apply_drv8825_mode();
        assert_eq!(
            bench.microstep().mode_values,
            [LogicLevel::Low, LogicLevel::Low, LogicLevel::High]
        );
    }

    #[test]
    fn test_phase_index_bounded_by_sequence() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        assert!(bench.set_phase_index(4).is_err());
        assert!(bench.set_phase_index(-1).is_err());
        bench.set_step_sequence(3).unwrap();
        bench.set_phase_index(7).unwrap();
        // back to a 4-phase table folds the index
        bench.set_step_sequence(1).unwrap();
        assert_eq!(bench.stepper().phase, 3);
    }

    #[test]
    fn test_save_reload_and_reset() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        bench.set_rpm(30).unwrap();
        bench.set_servo_pulse_max(2_200).unwrap();
        bench.save().unwrap();

        bench.set_rpm(90).unwrap();
        assert_eq!(bench.load(), ConfigSource::Stored);
        assert_eq!(bench.motor().rpm(), 30);
        assert_eq!(bench.servo().pulse_max(), 2_200);

        bench.reset().unwrap();
        assert_eq!(bench.config(), &DeviceConfig::defaults());
        assert_eq!(bench.load(), ConfigSource::Stored);
    }

    #[test]
    fn test_step_line_level_refused() {
        let mut bench = MotorBench::open(MemoryStorage::new());
        assert!(!bench.set_microstep_level(MicrostepLine::Step, LogicLevel::High));
        assert!(bench.set_microstep_level(MicrostepLine::Enable, LogicLevel::High));
        assert_eq!(bench.microstep().enable_level, LogicLevel::High);
    }

    #[test]
    fn test_view_darlington() {
        let bench = MotorBench::open(MemoryStorage::new());
        let view = bench.view_config(DriveKind::Darlington);
        assert!(view.contains("Speed: 4 rpm"));
        assert!(view.contains("Step delay: 75000 us"));
        assert!(view.contains("Pins A1 A2 B1 B2: 8 9 10 11"));
    }

    #[test]
    fn test_view_servo_and_microstep() {
        let bench = MotorBench::open(MemoryStorage::new());
        let servo = bench.view_config(DriveKind::Servo);
        assert!(servo.contains("Pulse: 1500 us"));
        assert!(servo.contains("PWM pin: 6"));
        assert!(!servo.contains("rpm"));

        let ms = bench.view_config(DriveKind::Microstep);
        assert!(ms.contains("Step pin: -"));
    }
}
