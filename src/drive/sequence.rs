//! Coil energization tables and phase arithmetic.
//!
//! Patterns are listed in coil order `(A1, A2, B1, B2)`; `true` energizes
//! the coil end. Both the Darlington array and the H-bridge are driven from
//! the same tables.

use crate::config::{Direction, StepSequence};

/// Coil energization for one phase, in `(A1, A2, B1, B2)` order.
pub type CoilPattern = [bool; 4];

/// One coil at a time.
pub const WAVE: [CoilPattern; 4] = [
    [true, false, false, false],
    [false, false, true, false],
    [false, true, false, false],
    [false, false, false, true],
];

/// Two coils at a time (full torque).
pub const FULL_STEP: [CoilPattern; 4] = [
    [true, false, true, false],
    [false, true, true, false],
    [false, true, false, true],
    [true, false, false, true],
];

/// Wave and full-step phases interleaved.
pub const HALF_STEP: [CoilPattern; 8] = [
    [true, false, false, false],
    [true, false, true, false],
    [false, false, true, false],
    [false, true, true, false],
    [false, true, false, false],
    [false, true, false, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Table for a sequence.
pub fn table(sequence: StepSequence) -> &'static [CoilPattern] {
    match sequence {
        StepSequence::Wave => &WAVE,
        StepSequence::FullStep => &FULL_STEP,
        StepSequence::HalfStep => &HALF_STEP,
    }
}

/// Pattern for a phase index; out-of-range indices wrap.
pub fn pattern(sequence: StepSequence, phase: i8) -> CoilPattern {
    let table = table(sequence);
    table[(phase as i32).rem_euclid(table.len() as i32) as usize]
}

/// Next phase index in `direction`, always within `[0, len)`.
///
/// `phase` is normalized first, so a stale index from another sequence or a
/// corrupted store is tolerated.
pub fn advance_phase(phase: i8, direction: Direction, len: u8) -> i8 {
    let len = len.max(1) as i32;
    let current = (phase as i32).rem_euclid(len);
    (current + direction.sign()).rem_euclid(len) as i8
}
