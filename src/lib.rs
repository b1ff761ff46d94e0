//! # motor-bench
//!
//! Drive engine for a stepper and servo test bench, with a packed persistent
//! configuration and embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Four drive kinds**: Darlington and H-bridge coil sequencing (full, wave,
//!   half step), step/dir microstepping drivers, hobby servos over PWM
//! - **Non-blocking**: Steps are paced by a poll-driven timeout state machine
//! - **Persistent configuration**: Fixed 64-byte little-endian block with a
//!   header tag and schema revision; anything invalid loads as defaults
//! - **embedded-hal 1.0**: `OutputPin` for coils and control lines, `DelayNs`
//!   for the step pulse, `SetDutyCycle` for servos
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use motor_bench::{CoilDriver, CoilKind, MemoryStorage, MotionController, MotorBench, Move};
//!
//! let bench = MotorBench::open(eeprom);
//! let coils = CoilDriver::new(CoilKind::Darlington, a1, a2, b1, b2, bench.stepper());
//! let mut motion = MotionController::new(coils, clock, bench.motor().step_delay());
//!
//! motion.run_move(Move::Revolutions(1), bench.motor())?;
//! while motion.is_moving() {
//!     motion.poll()?;
//!     // serve the menu here
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML preset loading and `std::error::Error`
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

// Core modules
pub mod bench;
pub mod config;
pub mod drive;
pub mod error;
pub mod motion;
pub mod timing;

// Re-exports for ergonomic API
pub use bench::MotorBench;
pub use config::{
    validate_config, ConfigSource, ConfigStorage, ConfigStore, DeviceConfig, MemoryStorage,
    MotorStepParams, ServoParams,
};
pub use drive::{
    CoilDriver, CoilKind, Drive, DriveKind, MicrostepDriver, MicrostepDriverBuilder, ServoDriver,
    StepOutput,
};
pub use error::{Error, Result};
pub use motion::{MotionController, Move, MoveStatus};
pub use timing::{calculate_step_delay, Clock, TimingStateMachine};

// Preset loading (std only)
#[cfg(feature = "std")]
pub use config::{load_preset, parse_preset};

// Unit types
pub use config::units::{Degrees, Direction, LogicLevel, PinId, StepResolution};
