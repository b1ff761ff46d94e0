//! Four-wire coil drive (ULN2003 Darlington array or dual H-bridge).

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::{Direction, StepSequence, StepperPins};
use crate::error::{MotorError, Result};

use super::sequence::{advance_phase, pattern};
use super::StepOutput;

/// Power stage between the coil pins and the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoilKind {
    /// Unipolar motor behind a Darlington array.
    Darlington,
    /// Bipolar motor behind a dual H-bridge.
    HBridge,
}

/// Drives four coil pins through a step sequence table.
///
/// Each step advances the phase index first, then writes the new pattern.
pub struct CoilDriver<P>
where
    P: OutputPin,
{
    kind: CoilKind,
    /// Pins in `(A1, A2, B1, B2)` order.
    pins: [P; 4],
    sequence: StepSequence,
    phase: i8,
}

impl<P> CoilDriver<P>
where
    P: OutputPin,
{
    /// Create a driver resuming from the stored sequence and phase.
    pub fn new(kind: CoilKind, a1: P, a2: P, b1: P, b2: P, wiring: &StepperPins) -> Self {
        Self {
            kind,
            pins: [a1, a2, b1, b2],
            sequence: wiring.sequence,
            phase: wiring.normalized_phase(),
        }
    }

    /// Power stage.
    #[inline]
    pub fn kind(&self) -> CoilKind {
        self.kind
    }

    /// Active sequence.
    #[inline]
    pub fn sequence(&self) -> StepSequence {
        self.sequence
    }

    /// Current phase index.
    #[inline]
    pub fn phase(&self) -> i8 {
        self.phase
    }

    /// Switch sequence, folding the phase index into the new table.
    pub fn set_sequence(&mut self, sequence: StepSequence) {
        self.sequence = sequence;
        self.phase = self.phase.rem_euclid(sequence.phase_count() as i8);
    }

    /// Write the pattern of the current phase to the pins.
    pub fn energize(&mut self) -> Result<()> {
        let levels = pattern(self.sequence, self.phase);
        for (pin, on) in self.pins.iter_mut().zip(levels) {
            pin.set_state(PinState::from(on))
                .map_err(|_| MotorError::PinError)?;
        }
        Ok(())
    }

    /// Copy sequence and phase back into the persisted wiring record.
    pub fn store_into(&self, wiring: &mut StepperPins) {
        wiring.sequence = self.sequence;
        wiring.phase = self.phase;
    }

    /// Release the pins.
    pub fn into_pins(self) -> [P; 4] {
        self.pins
    }
}

impl<P> StepOutput for CoilDriver<P>
where
    P: OutputPin,
{
    fn step(&mut self, direction: Direction) -> Result<()> {
        self.phase = advance_phase(self.phase, direction, self.sequence.phase_count());
        self.energize()
    }

    fn release(&mut self) -> Result<()> {
        for pin in self.pins.iter_mut() {
            pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        Ok(())
    }
}
