//! Error types for stepper-dda.
//!
//! The DDA core itself cannot fail: planning is pure integer arithmetic on
//! pre-validated inputs. Errors only come from configuration, from the
//! hardware layer, and from driving the activator out of order.

use core::fmt;

use crate::dda::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-dda operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Hardware abstraction layer error
    Hal(HalError),
    /// Move activation or stepping error
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Axis has zero full steps per revolution
    InvalidStepsPerRevolution(Axis),
    /// Feed per motor revolution must be > 0
    InvalidFeedPerRevolution {
        /// Offending axis
        axis: Axis,
        /// Configured value in mm/rev
        value: f32,
    },
    /// Maximum motor speed must be > 0
    InvalidMaxSpeed {
        /// Offending axis
        axis: Axis,
        /// Configured value in rev/s
        value: f32,
    },
    /// Search feed fraction must be within (0, 1]
    InvalidSearchFraction {
        /// Offending axis
        axis: Axis,
        /// Configured fraction
        value: f32,
    },
    /// Acceleration must be > 0
    InvalidAcceleration(f32),
    /// Timer clock must be at least 1 kHz
    InvalidClock(u32),
    /// Axis step rate is zero or not below the timer clock
    StepRateOutOfRange {
        /// Offending axis
        axis: Axis,
        /// Derived maximum step frequency in steps/s
        step_freq: u32,
        /// Timer clock in Hz
        clock_hz: u32,
    },
    /// Extruder fold shift must be at most 16
    InvalidExtruderFoldShift(u8),
    /// A hardware resource was not supplied to a builder
    MissingHardware(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Hardware abstraction layer errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HalError {
    /// Pin operation failed on an axis
    Pin(Axis),
    /// Auxiliary (DC extruder) output failed
    AuxOutput,
    /// Stepper power supply could not be switched on
    Power,
}

/// Move activation and stepping errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A move is already live; only one record may be active at a time
    MoveInProgress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Hal(e) => write!(f, "Hardware error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => write!(
                f,
                "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256",
                v
            ),
            ConfigError::InvalidStepsPerRevolution(axis) => {
                write!(f, "Axis {}: steps per revolution must be > 0", axis)
            }
            ConfigError::InvalidFeedPerRevolution { axis, value } => {
                write!(f, "Axis {}: invalid feed per revolution {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidMaxSpeed { axis, value } => {
                write!(f, "Axis {}: invalid max speed {} rev/s. Must be > 0", axis, value)
            }
            ConfigError::InvalidSearchFraction { axis, value } => write!(
                f,
                "Axis {}: invalid search feed fraction {}. Must be in (0, 1]",
                axis, value
            ),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidClock(v) => {
                write!(f, "Invalid timer clock: {} Hz. Must be >= 1000", v)
            }
            ConfigError::StepRateOutOfRange { axis, step_freq, clock_hz } => write!(
                f,
                "Axis {}: step rate {} steps/s must be > 0 and below the {} Hz timer clock",
                axis, step_freq, clock_hz
            ),
            ConfigError::InvalidExtruderFoldShift(v) => {
                write!(f, "Invalid extruder fold shift: {}. Must be <= 16", v)
            }
            ConfigError::MissingHardware(what) => write!(f, "Missing hardware resource: {}", what),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::Pin(axis) => write!(f, "GPIO pin operation failed on axis {}", axis),
            HalError::AuxOutput => write!(f, "Auxiliary extruder output failed"),
            HalError::Power => write!(f, "Stepper power supply failed to switch on"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::MoveInProgress => write!(f, "Another move is still live"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<HalError> for Error {
    fn from(e: HalError) -> Self {
        Error::Hal(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
