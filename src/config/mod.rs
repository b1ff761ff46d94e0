//! Configuration module for motor-bench.
//!
//! Holds the persisted parameter records, their validation, the packed
//! 64-byte block codec and the store that loads it at power-up. With the
//! `std` feature, presets can also be read from TOML files.

mod device;
pub mod layout;
#[cfg(feature = "std")]
mod loader;
mod microstep;
mod motor;
mod servo;
mod stepper;
mod store;
pub mod units;
pub mod validation;

pub use device::DeviceConfig;
pub use microstep::{mode_select_for, MicrostepLine, MicrostepPins};
pub use motor::{MotorStepParams, DEFAULT_RPM, DEFAULT_STEPS_PER_REVOLUTION};
pub use servo::{
    pulse_width_to_ticks, ServoParams, DEFAULT_ANGLE, DEFAULT_PULSE_MAX, DEFAULT_PULSE_MIN,
    DEFAULT_PULSE_PERIOD, DEFAULT_PULSE_TIME, MAX_ANGLE, SERVO_TIMER_HZ,
};
pub use stepper::{StepSequence, StepperPins};
pub use store::{ConfigSource, ConfigStorage, ConfigStore, Loaded, MemoryStorage};
pub use validation::{validate_config, Bounds};

#[cfg(feature = "std")]
pub use loader::{load_preset, parse_preset};

// Re-export unit types at config level
pub use units::{Degrees, Direction, LogicLevel, PinId, StepResolution};
