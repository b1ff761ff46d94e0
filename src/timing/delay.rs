//! Step delay derivation.

use crate::config::units::StepResolution;

/// Microseconds in one minute.
pub const MICROSECONDS_PER_MINUTE: u64 = 60_000_000;

/// Calculate the delay between two step pulses in microseconds.
///
/// `60_000_000 / (rpm × steps_per_revolution × resolution)`, truncated.
/// Inputs are expected to be within their configured bounds already; a zero
/// product yields `u32::MAX` instead of dividing by zero.
///
/// # Example
///
/// ```rust
/// use motor_bench::config::units::StepResolution;
/// use motor_bench::timing::calculate_step_delay;
///
/// assert_eq!(calculate_step_delay(4, 200, StepResolution::FULL), 75_000);
/// ```
pub fn calculate_step_delay(rpm: u16, steps_per_revolution: u16, resolution: StepResolution) -> u32 {
    let steps_per_minute = rpm as u64 * steps_per_revolution as u64 * resolution.value() as u64;
    MICROSECONDS_PER_MINUTE
        .checked_div(steps_per_minute)
        .map(|us| us.min(u32::MAX as u64) as u32)
        .unwrap_or(u32::MAX)
}
