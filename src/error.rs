//! Error types for motor-bench.
//!
//! Provides unified error handling across configuration, storage and drive output.
//! A bad configuration header is never an error: the store falls back to defaults.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all motor-bench operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration value rejected or preset unreadable
    Config(ConfigError),
    /// Drive output error
    Motor(MotorError),
    /// Persistent storage error
    Storage(StorageError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Numeric field outside its documented bounds
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: u32,
        /// Inclusive lower bound
        min: u32,
        /// Inclusive upper bound
        max: u32,
    },
    /// Invalid step resolution (must be 1, 2, 4, 8, 16 or 32)
    InvalidStepResolution(u16),
    /// Invalid rotation direction code (must be 1 or 2)
    InvalidDirection(u8),
    /// Invalid step sequence code (must be 1, 2 or 3)
    InvalidSequence(i8),
    /// Servo minimum pulse must stay below the maximum pulse
    InvalidPulseBounds {
        /// Minimum pulse width in µs
        min: u16,
        /// Maximum pulse width in µs
        max: u16,
    },
    /// Failed to parse TOML preset
    #[cfg(feature = "std")]
    ParseError(heapless::String<128>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Drive output errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// PWM duty cycle update failed
    PwmError,
    /// A move is already running
    Busy,
    /// Required pin not supplied to a builder
    MissingPin(&'static str),
}

/// Persistent storage errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Read from the backing store failed
    ReadFailed,
    /// Write to the backing store failed
    WriteFailed,
    /// Access outside the storage region
    OutOfBounds {
        /// Requested offset
        offset: usize,
        /// Requested length
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} = {} out of range [{}, {}]", field, value, min, max),
            ConfigError::InvalidStepResolution(v) => {
                write!(f, "Invalid step resolution: {}. Valid values: 1, 2, 4, 8, 16, 32", v)
            }
            ConfigError::InvalidDirection(v) => {
                write!(f, "Invalid rotation direction: {}. Must be 1 (CW) or 2 (CCW)", v)
            }
            ConfigError::InvalidSequence(v) => {
                write!(f, "Invalid step sequence: {}. Must be 1 (full), 2 (wave) or 3 (half)", v)
            }
            ConfigError::InvalidPulseBounds { min, max } => {
                write!(f, "Invalid pulse bounds: min ({}) must be < max ({})", min, max)
            }
            #[cfg(feature = "std")]
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::PwmError => write!(f, "PWM duty cycle update failed"),
            MotorError::Busy => write!(f, "A move is already in progress"),
            MotorError::MissingPin(name) => write!(f, "Required pin '{}' not set", name),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadFailed => write!(f, "Read failed"),
            StorageError::WriteFailed => write!(f, "Write failed"),
            StorageError::OutOfBounds { offset, len } => {
                write!(f, "Access of {} bytes at offset {} is out of bounds", len, offset)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
