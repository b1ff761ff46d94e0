//! Coil pin assignment and stepping sequence.

use serde::Deserialize;

use crate::error::ConfigError;

use super::units::PinId;

/// Coil energization pattern family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSequence {
    /// Two coils energized per phase, 4 phases.
    #[default]
    FullStep,
    /// One coil energized per phase, 4 phases.
    Wave,
    /// Full-step and wave phases interleaved, 8 phases.
    HalfStep,
}

impl StepSequence {
    /// Persisted byte code.
    pub fn code(self) -> i8 {
        match self {
            StepSequence::FullStep => 1,
            StepSequence::Wave => 2,
            StepSequence::HalfStep => 3,
        }
    }

    /// Decode a persisted byte code.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSequence` for unknown codes.
    pub fn from_code(code: i8) -> Result<Self, ConfigError> {
        match code {
            1 => Ok(StepSequence::FullStep),
            2 => Ok(StepSequence::Wave),
            3 => Ok(StepSequence::HalfStep),
            other => Err(ConfigError::InvalidSequence(other)),
        }
    }

    /// Number of phases in one electrical cycle.
    pub fn phase_count(self) -> u8 {
        match self {
            StepSequence::FullStep | StepSequence::Wave => 4,
            StepSequence::HalfStep => 8,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            StepSequence::FullStep => "Full step",
            StepSequence::Wave => "Wave (one phase)",
            StepSequence::HalfStep => "Half step",
        }
    }
}

/// Coil pins of a Darlington array or H-bridge, plus sequence state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StepperPins {
    /// Coil A, first end.
    pub a1: PinId,
    /// Coil A, second end.
    pub a2: PinId,
    /// Coil B, first end.
    pub b1: PinId,
    /// Coil B, second end.
    pub b2: PinId,
    /// Pattern family.
    pub sequence: StepSequence,
    /// Phase index saved with the configuration.
    pub phase: i8,
}

impl StepperPins {
    /// Phase index folded into `[0, phase_count)` of the current sequence.
    pub fn normalized_phase(&self) -> i8 {
        self.phase.rem_euclid(self.sequence.phase_count() as i8)
    }
}

impl Default for StepperPins {
    fn default() -> Self {
        Self {
            a1: PinId(8),
            a2: PinId(9),
            b1: PinId(10),
            b2: PinId(11),
            sequence: StepSequence::FullStep,
            phase: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_codes() {
        for seq in [StepSequence::FullStep, StepSequence::Wave, StepSequence::HalfStep] {
            assert_eq!(StepSequence::from_code(seq.code()), Ok(seq));
        }
        assert_eq!(StepSequence::from_code(0), Err(ConfigError::InvalidSequence(0)));
    }

    #[test]
    fn test_normalized_phase() {
        let mut pins = StepperPins::default();
        pins.phase = 7;
        assert_eq!(pins.normalized_phase(), 3);
        pins.phase = -1;
        assert_eq!(pins.normalized_phase(), 3);
        pins.sequence = StepSequence::HalfStep;
        assert_eq!(pins.normalized_phase(), 7);
    }
}
