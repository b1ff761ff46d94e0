//! Device configuration - root configuration structure.

use serde::Deserialize;

use super::microstep::MicrostepPins;
use super::motor::MotorStepParams;
use super::servo::ServoParams;
use super::stepper::StepperPins;

/// Every persisted parameter record of the bench.
///
/// `Default` yields the compiled defaults with all caches derived.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Stepping speed, geometry and direction.
    pub motor: MotorStepParams,
    /// Coil pins and sequence for Darlington / H-bridge drives.
    pub stepper: StepperPins,
    /// Step/dir driver wiring.
    pub microstep: MicrostepPins,
    /// Servo pulse parameters.
    pub servo: ServoParams,
}

impl DeviceConfig {
    /// Compiled defaults.
    pub fn defaults() -> Self {
        Self::default()
    }
}
