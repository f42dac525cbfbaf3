//! Machine configuration.
//!
//! Axis drive trains and machine-wide settings are loaded from TOML (with the
//! `std` feature) or built in code, validated once, and then frozen into
//! [`MachineConstants`], the integer view the DDA works with.

mod axis;
mod constants;
#[cfg(feature = "std")]
mod loader;
pub(crate) mod machine;
pub mod units;
mod validation;

pub use axis::AxisConfig;
pub use constants::{AxisConstants, MachineConstants};
pub use machine::{Axes, MachineConfig, ProfileKind};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{Microsteps, MmPerRev, MmPerSecSquared, RevPerSec};
