//! # stepper-dda
//!
//! Digital differential analyser (DDA) motion core for RepRap-style
//! multi-axis stepper machines.
//!
//! ## Features
//!
//! - **Integer planning**: move length, speed ceiling, start period and ramp
//!   lengths in staged fixed-point arithmetic, no floating point after start-up
//! - **Four-axis Bresenham**: X, Y, Z and extruder steps spread evenly so all
//!   axes finish together
//! - **Build-time profiles**: trapezoidal [`Ramping`], feed-to-feed [`Taper`]
//!   or [`Constant`] speed, chosen as a type parameter
//! - **Two-phase step interrupt**: pulses first, ramp maths in a preemptible
//!   window
//! - **embedded-hal 1.0**: [`GpioHal`] drives STEP/DIR/EN output pins
//! - **no_std compatible**: configuration can still be built in code
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_dda::{MachineConstants, MoveQueue, Planner, Position, PositionCell, Ramping, Stepper};
//!
//! let config = stepper_dda::load_config("machine.toml")?;
//! let constants = MachineConstants::from_config(&config);
//!
//! static POSITION: PositionCell = PositionCell::new(Position::origin(0));
//! let mut planner: Planner<Ramping> = Planner::new(&constants);
//! let mut queue: MoveQueue<Ramping, 16> = MoveQueue::new();
//! let mut stepper = Stepper::new(hal, &constants, &POSITION);
//!
//! queue.enqueue(planner.plan(Position::new(1000, 500, 0, 40, 3000)))?;
//!
//! // in the step timer interrupt
//! stepper.service(&mut queue)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod dda;
pub mod error;
pub mod hal;
pub mod motion;

// Re-exports for ergonomic API
pub use config::{validate_config, AxisConfig, MachineConfig, MachineConstants, ProfileKind};
pub use dda::{
    Activation, Axis, Direction, MoveQueue, MoveRecord, Planner, Position, PositionCell, Stepper,
    TickOutcome,
};
pub use error::{Error, Result};
pub use hal::{GpioHal, StepperHal};
pub use motion::{Constant, RampProfile, Ramping, Taper};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microsteps, MmPerRev, MmPerSecSquared, RevPerSec};
