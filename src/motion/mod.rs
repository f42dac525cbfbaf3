//! Velocity profiles.
//!
//! A profile turns the geometry of one planned move into timing parameters and
//! then advances a small per-move state once per step interrupt. The profile is
//! chosen at build time as a type parameter of the planner and stepper, so the
//! step interrupt never branches on it.

mod profile;

pub use profile::{
    Constant, ConstantTiming, MoveGeometry, RampProfile, Ramping, RampingState, RampingTiming,
    Taper, TaperState, TaperTiming,
};
