//! Packed binary layout of the configuration block.
//!
//! All records are little-endian and byte-packed with no padding. Offsets
//! and sizes are fixed; a block is either decoded whole or rejected whole.
//!
//! ```text
//! [Header]      0  ..  4   id, version, reserved[2]
//! [MotorStep]   4  .. 20   step_delay u32, rpm_step_delay u32, rpm u16,
//!                          steps_per_revolution u16, resolution u8,
//!                          direction u8, reserved[2]
//! [Stepper]    20  .. 28   a1, a2, b1, b2, sequence i8, phase i8, reserved[2]
//! [Microstep]  28  .. 44   8 pins, 4 active levels, 3 mode values, reserved
//! [Servo]      44  .. 64   period u16, min u16, max u16, time u16,
//!                          ticks_high u32, ticks_low u32, pwm pin, angle,
//!                          reserved[2]
//! ```

use crate::error::ConfigError;

use super::microstep::MicrostepPins;
use super::motor::MotorStepParams;
use super::servo::ServoParams;
use super::stepper::{StepSequence, StepperPins};
use super::units::{Direction, LogicLevel, PinId, StepResolution};
use super::validation::check_config;
use super::DeviceConfig;

/// Tag identifying a valid configuration block.
pub const CONFIG_ID: u8 = 0xCF;
/// Current schema revision (64-byte block with servo record).
pub const CONFIG_VERSION: u8 = 0xA2;
/// Earlier schema revision (44-byte block without servo record), not readable.
pub const CONFIG_VERSION_LEGACY: u8 = 0xA1;

/// Total block size.
pub const CONFIG_SIZE: usize = 64;
/// Header record size.
pub const CONFIG_SIZE_HEADER: usize = 4;
/// Stepping parameters record size.
pub const CONFIG_SIZE_MOTORSTEP: usize = 16;
/// Coil pins record size.
pub const CONFIG_SIZE_STEPPER: usize = 8;
/// Microstep driver record size.
pub const CONFIG_SIZE_MICROSTEP: usize = 16;
/// Servo record size.
pub const CONFIG_SIZE_SERVO: usize = 20;

/// Header record offset.
pub const CONFIG_START_HEADER: usize = 0;
/// Stepping parameters record offset.
pub const CONFIG_START_MOTORSTEP: usize = 4;
/// Coil pins record offset.
pub const CONFIG_START_STEPPER: usize = 20;
/// Microstep driver record offset.
pub const CONFIG_START_MICROSTEP: usize = 28;
/// Servo record offset.
pub const CONFIG_START_SERVO: usize = 44;

const _: () = assert!(CONFIG_START_MOTORSTEP == CONFIG_START_HEADER + CONFIG_SIZE_HEADER);
const _: () = assert!(CONFIG_START_STEPPER == CONFIG_START_MOTORSTEP + CONFIG_SIZE_MOTORSTEP);
const _: () = assert!(CONFIG_START_MICROSTEP == CONFIG_START_STEPPER + CONFIG_SIZE_STEPPER);
const _: () = assert!(CONFIG_START_SERVO == CONFIG_START_MICROSTEP + CONFIG_SIZE_MICROSTEP);
const _: () = assert!(CONFIG_SIZE == CONFIG_START_SERVO + CONFIG_SIZE_SERVO);

/// Raw configuration block.
pub type ConfigBlock = [u8; CONFIG_SIZE];

/// Reason a stored block was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockError {
    /// Header tag is not [`CONFIG_ID`].
    BadId(u8),
    /// Header version is not [`CONFIG_VERSION`].
    BadVersion(u8),
    /// A field failed to decode or is out of bounds.
    Field(ConfigError),
}

impl From<ConfigError> for BlockError {
    fn from(e: ConfigError) -> Self {
        BlockError::Field(e)
    }
}

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn get_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

/// Serialize a configuration into a full block with a current header.
pub fn encode(config: &DeviceConfig) -> ConfigBlock {
    let mut block = [0u8; CONFIG_SIZE];

    let header = &mut block[CONFIG_START_HEADER..CONFIG_START_MOTORSTEP];
    header[0] = CONFIG_ID;
    header[1] = CONFIG_VERSION;

    encode_motor(&config.motor, &mut block[CONFIG_START_MOTORSTEP..CONFIG_START_STEPPER]);
    encode_stepper(&config.stepper, &mut block[CONFIG_START_STEPPER..CONFIG_START_MICROSTEP]);
    encode_microstep(
        &config.microstep,
        &mut block[CONFIG_START_MICROSTEP..CONFIG_START_SERVO],
    );
    encode_servo(&config.servo, &mut block[CONFIG_START_SERVO..CONFIG_SIZE]);

    block
}

/// Deserialize a full block.
///
/// The header is checked first; derived caches (step delays, servo ticks)
/// are recomputed from their inputs rather than trusted.
pub fn decode(block: &ConfigBlock) -> Result<DeviceConfig, BlockError> {
    let id = block[CONFIG_START_HEADER];
    if id != CONFIG_ID {
        return Err(BlockError::BadId(id));
    }
    let version = block[CONFIG_START_HEADER + 1];
    if version != CONFIG_VERSION {
        return Err(BlockError::BadVersion(version));
    }

    let config = DeviceConfig {
        motor: decode_motor(&block[CONFIG_START_MOTORSTEP..CONFIG_START_STEPPER])?,
        stepper: decode_stepper(&block[CONFIG_START_STEPPER..CONFIG_START_MICROSTEP])?,
        microstep: decode_microstep(&block[CONFIG_START_MICROSTEP..CONFIG_START_SERVO]),
        servo: decode_servo(&block[CONFIG_START_SERVO..CONFIG_SIZE]),
    };
    check_config(&config)?;

    Ok(config)
}

fn encode_motor(motor: &MotorStepParams, buf: &mut [u8]) {
    put_u32(buf, 0, motor.step_delay());
    put_u32(buf, 4, motor.rpm_step_delay());
    put_u16(buf, 8, motor.rpm());
    put_u16(buf, 10, motor.steps_per_revolution());
    buf[12] = motor.step_resolution().value();
    buf[13] = motor.rotation_direction().code();
}

fn decode_motor(buf: &[u8]) -> Result<MotorStepParams, ConfigError> {
    let rpm = get_u16(buf, 8);
    let steps_per_revolution = get_u16(buf, 10);
    let resolution = StepResolution::new(buf[12])?;
    let direction = Direction::from_code(buf[13])?;
    Ok(MotorStepParams::from_parts(rpm, steps_per_revolution, resolution, direction))
}

fn encode_stepper(stepper: &StepperPins, buf: &mut [u8]) {
    buf[0] = stepper.a1.value();
    buf[1] = stepper.a2.value();
    buf[2] = stepper.b1.value();
    buf[3] = stepper.b2.value();
    buf[4] = stepper.sequence.code() as u8;
    buf[5] = stepper.phase as u8;
}

fn decode_stepper(buf: &[u8]) -> Result<StepperPins, ConfigError> {
    Ok(StepperPins {
        a1: PinId(buf[0]),
        a2: PinId(buf[1]),
        b1: PinId(buf[2]),
        b2: PinId(buf[3]),
        sequence: StepSequence::from_code(buf[4] as i8)?,
        phase: buf[5] as i8,
    })
}

fn encode_microstep(micro: &MicrostepPins, buf: &mut [u8]) {
    let pins = [
        micro.enable,
        micro.sleep,
        micro.reset,
        micro.step,
        micro.dir,
        micro.mode[0],
        micro.mode[1],
        micro.mode[2],
    ];
    for (slot, pin) in buf[0..8].iter_mut().zip(pins) {
        *slot = pin.value();
    }

    let levels = [
        micro.enable_level,
        micro.sleep_level,
        micro.reset_level,
        micro.dir_level,
        micro.mode_values[0],
        micro.mode_values[1],
        micro.mode_values[2],
    ];
    for (slot, level) in buf[8..15].iter_mut().zip(levels) {
        *slot = level.code();
    }
}

fn decode_microstep(buf: &[u8]) -> MicrostepPins {
    let level = |at: usize| LogicLevel::from_code(buf[at]);
    MicrostepPins {
        enable: PinId(buf[0]),
        sleep: PinId(buf[1]),
        reset: PinId(buf[2]),
        step: PinId(buf[3]),
        dir: PinId(buf[4]),
        mode: [PinId(buf[5]), PinId(buf[6]), PinId(buf[7])],
        enable_level: level(8),
        sleep_level: level(9),
        reset_level: level(10),
        dir_level: level(11),
        mode_values: [level(12), level(13), level(14)],
    }
}

fn encode_servo(servo: &ServoParams, buf: &mut [u8]) {
    put_u16(buf, 0, servo.pulse_period());
    put_u16(buf, 2, servo.pulse_min());
    put_u16(buf, 4, servo.pulse_max());
    put_u16(buf, 6, servo.pulse_time());
    put_u32(buf, 8, servo.ticks_high());
    put_u32(buf, 12, servo.ticks_low());
    buf[16] = servo.pwm_pin().value();
    buf[17] = servo.angle();
}

fn decode_servo(buf: &[u8]) -> ServoParams {
    ServoParams::from_parts(
        get_u16(buf, 0),
        get_u16(buf, 2),
        get_u16(buf, 4),
        get_u16(buf, 6),
        PinId(buf[16]),
        buf[17],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_block_layout() {
        let block = encode(&DeviceConfig::default());

        assert_eq!(block.len(), CONFIG_SIZE);
        assert_eq!(&block[0..4], &[0xCF, 0xA2, 0, 0]);
        // step_delay = 75000 = 0x0001_24F8
        assert_eq!(&block[4..8], &[0xF8, 0x24, 0x01, 0x00]);
        assert_eq!(&block[8..12], &[0xF8, 0x24, 0x01, 0x00]);
        // rpm 4, 200 steps/rev, full step, clockwise
        assert_eq!(&block[12..18], &[4, 0, 200, 0, 1, 1]);
        assert_eq!(&block[20..26], &[8, 9, 10, 11, 1, 0]);
        assert_eq!(block[CONFIG_START_MICROSTEP], 255);
        // period 20000 = 0x4E20, min 1000 = 0x03E8
        assert_eq!(&block[44..48], &[0x20, 0x4E, 0xE8, 0x03]);
        assert_eq!(&block[60..62], &[6, 90]);
    }

    #[test]
    fn test_bad_id_rejected() {
        let mut block = encode(&DeviceConfig::default());
        block[0] = 0x00;
        assert_eq!(decode(&block), Err(BlockError::BadId(0x00)));
    }

    #[test]
    fn test_legacy_version_rejected() {
        let mut block = encode(&DeviceConfig::default());
        block[1] = CONFIG_VERSION_LEGACY;
        assert_eq!(decode(&block), Err(BlockError::BadVersion(0xA1)));
    }

    #[test]
    fn test_bad_resolution_rejected() {
        let mut block = encode(&DeviceConfig::default());
        block[CONFIG_START_MOTORSTEP + 12] = 3;
        assert_eq!(
            decode(&block),
            Err(BlockError::Field(ConfigError::InvalidStepResolution(3)))
        );
    }

    #[test]
    fn test_out_of_range_rpm_rejected() {
        let mut block = encode(&DeviceConfig::default());
        block[CONFIG_START_MOTORSTEP + 8] = 0;
        assert!(matches!(
            decode(&block),
            Err(BlockError::Field(ConfigError::OutOfRange { field: "rpm", .. }))
        ));
    }

    #[test]
    fn test_negative_phase_survives() {
        let mut config = DeviceConfig::default();
        config.stepper.phase = -3;
        let decoded = decode(&encode(&config)).unwrap();
        assert_eq!(decoded.stepper.phase, -3);
    }

    fn level() -> impl Strategy<Value = LogicLevel> {
        prop_oneof![Just(LogicLevel::Low), Just(LogicLevel::High)]
    }

    fn sequence() -> impl Strategy<Value = StepSequence> {
        prop_oneof![
            Just(StepSequence::FullStep),
            Just(StepSequence::Wave),
            Just(StepSequence::HalfStep),
        ]
    }

    prop_compose! {
        fn motor_params()(
            rpm in 1u16..=1000,
            spr in 12u16..=8192,
            res in prop::sample::select(StepResolution::VALID_VALUES.to_vec()),
            ccw in any::<bool>(),
        ) -> MotorStepParams {
            let direction = if ccw { Direction::CounterClockwise } else { Direction::Clockwise };
            MotorStepParams::from_parts(rpm, spr, StepResolution::new(res).unwrap(), direction)
        }
    }

    prop_compose! {
        fn stepper_pins()(
            pins in any::<[u8; 4]>(),
            sequence in sequence(),
            phase in any::<i8>(),
        ) -> StepperPins {
            StepperPins {
                a1: PinId(pins[0]),
                a2: PinId(pins[1]),
                b1: PinId(pins[2]),
                b2: PinId(pins[3]),
                sequence,
                phase,
            }
        }
    }

    prop_compose! {
        fn microstep_pins()(
            pins in any::<[u8; 8]>(),
            levels in prop::array::uniform7(level()),
        ) -> MicrostepPins {
            MicrostepPins {
                enable: PinId(pins[0]),
                sleep: PinId(pins[1]),
                reset: PinId(pins[2]),
                step: PinId(pins[3]),
                dir: PinId(pins[4]),
                mode: [PinId(pins[5]), PinId(pins[6]), PinId(pins[7])],
                enable_level: levels[0],
                sleep_level: levels[1],
                reset_level: levels[2],
                dir_level: levels[3],
                mode_values: [levels[4], levels[5], levels[6]],
            }
        }
    }

    prop_compose! {
        fn servo_params()(
            period in 10_000u16..=30_000,
            min in 500u16..=2_400,
            max_extra in 1u16..=2_000,
            time in 500u16..=2_500,
            pwm in any::<u8>(),
            angle in 0u8..=180,
        ) -> ServoParams {
            let max = (min + max_extra).clamp(min.max(599) + 1, 2_500);
            ServoParams::from_parts(period, min, max, time, PinId(pwm), angle)
        }
    }

    prop_compose! {
        fn device_config()(
            motor in motor_params(),
            stepper in stepper_pins(),
            microstep in microstep_pins(),
            servo in servo_params(),
        ) -> DeviceConfig {
            DeviceConfig { motor, stepper, microstep, servo }
        }
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(config in device_config()) {
            let block = encode(&config);
            prop_assert_eq!(block.len(), CONFIG_SIZE);
            prop_assert_eq!(decode(&block), Ok(config));
        }

        #[test]
        fn wrong_id_never_decodes(id in any::<u8>(), body in prop::array::uniform32(any::<u8>())) {
            prop_assume!(id != CONFIG_ID);
            let mut block = encode(&DeviceConfig::default());
            block[0] = id;
            block[CONFIG_START_MOTORSTEP..CONFIG_START_MOTORSTEP + 32].copy_from_slice(&body);
            prop_assert_eq!(decode(&block), Err(BlockError::BadId(id)));
        }
    }
}
