//! Motion module for motor-bench.
//!
//! Turns movement requests into a counted run of single steps paced by the
//! timing state machine.

mod controller;

pub use controller::{MotionController, MoveStatus};

use crate::config::{Degrees, MotorStepParams};

/// Movement request from the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Exact number of single steps.
    Steps(u32),
    /// Whole shaft revolutions.
    Revolutions(u32),
    /// Shaft angle; the fractional step is dropped.
    Angle(Degrees),
}

impl Move {
    /// Single steps this request reduces to for a stepper.
    ///
    /// # Example
    ///
    /// ```rust
    /// use motor_bench::{Degrees, Move, MotorStepParams};
    ///
    /// let params = MotorStepParams::default();
    /// assert_eq!(Move::Revolutions(1).steps(&params), 200);
    /// assert_eq!(Move::Angle(Degrees(90.0)).steps(&params), 50);
    /// ```
    pub fn steps(self, params: &MotorStepParams) -> u32 {
        match self {
            Self::Steps(n) => n,
            Self::Revolutions(n) => params.steps_for_revolutions(n),
            Self::Angle(angle) => params.steps_for_angle(angle),
        }
    }
}
