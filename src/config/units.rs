//! Unit types for physical quantities.
//!
//! Provides type-safe representations of angles, step resolution, rotation
//! direction, pin identifiers and logic levels to prevent unit confusion at
//! compile time.

use serde::Deserialize;

use crate::error::ConfigError;

/// Angular amount in degrees.
///
/// Used for stepper move requests. Internally converted to a step count.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Microstep divisor applied to a full step (1, 2, 4, 8, 16, 32).
///
/// Validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StepResolution(u8);

impl StepResolution {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step (maximum resolution).
    pub const THIRTY_SECOND: Self = Self(32);

    /// Valid resolution values.
    pub const VALID_VALUES: [u8; 6] = [1, 2, 4, 8, 16, 32];

    /// Create a new StepResolution with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStepResolution` if the value is not one of the valid divisors.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidStepResolution(value as u16))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Check if a value is valid.
    #[inline]
    pub fn is_valid(value: u8) -> bool {
        Self::VALID_VALUES.contains(&value)
    }

    /// Short display label ("Full", "1/2" .. "1/32").
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Full",
            2 => "1/2",
            4 => "1/4",
            8 => "1/8",
            16 => "1/16",
            _ => "1/32",
        }
    }
}

impl Default for StepResolution {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<u8> for StepResolution {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for StepResolution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        let checked = u8::try_from(value)
            .map_err(|_| ConfigError::InvalidStepResolution(value))
            .and_then(StepResolution::new);
        checked.map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Direction of motor rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Clockwise (phase index increments, servo angle increases).
    #[default]
    Clockwise,
    /// Counter-clockwise (phase index decrements, servo angle decreases).
    CounterClockwise,
}

impl Direction {
    /// Persisted code for clockwise rotation.
    pub const CODE_CLOCKWISE: u8 = 1;
    /// Persisted code for counter-clockwise rotation.
    pub const CODE_COUNTER_CLOCKWISE: u8 = 2;

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Persisted byte code.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Direction::Clockwise => Self::CODE_CLOCKWISE,
            Direction::CounterClockwise => Self::CODE_COUNTER_CLOCKWISE,
        }
    }

    /// Decode a persisted byte code.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDirection` for any code other than 1 or 2.
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            Self::CODE_CLOCKWISE => Ok(Direction::Clockwise),
            Self::CODE_COUNTER_CLOCKWISE => Ok(Direction::CounterClockwise),
            other => Err(ConfigError::InvalidDirection(other)),
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Clockwise => "Clockwise",
            Direction::CounterClockwise => "Counterclockwise",
        }
    }
}

/// Board pin identifier as stored in the configuration block.
///
/// `255` marks an unassigned pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u8);

impl PinId {
    /// Unassigned pin marker.
    pub const NOT_DEFINED: Self = Self(255);

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether a physical pin is assigned.
    #[inline]
    pub fn is_assigned(self) -> bool {
        self != Self::NOT_DEFINED
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::NOT_DEFINED
    }
}

/// Logic level of a control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicLevel {
    /// Driven low (persisted as 0).
    #[default]
    Low,
    /// Driven high (persisted as 1).
    High,
}

impl LogicLevel {
    /// Persisted byte code; any non-zero byte decodes as high.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            LogicLevel::Low => 0,
            LogicLevel::High => 1,
        }
    }

    /// Decode a persisted byte.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            LogicLevel::Low
        } else {
            LogicLevel::High
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            LogicLevel::Low => "LOW",
            LogicLevel::High => "HIGH",
        }
    }
}

impl core::ops::Not for LogicLevel {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LogicLevel::Low => LogicLevel::High,
            LogicLevel::High => LogicLevel::Low,
        }
    }
}

impl From<LogicLevel> for embedded_hal::digital::PinState {
    fn from(level: LogicLevel) -> Self {
        match level {
            LogicLevel::Low => embedded_hal::digital::PinState::Low,
            LogicLevel::High => embedded_hal::digital::PinState::High,
        }
    }
}
