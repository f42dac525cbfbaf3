//! Machine configuration - root configuration structure.

use serde::Deserialize;

use crate::dda::Axis;

use super::axis::AxisConfig;
use super::units::MmPerSecSquared;

/// Velocity profile the step generator runs.
///
/// The profile is a type parameter of the planner and stepper; this value only
/// records which one start-up code should instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Trapezoid: accelerate from rest, cruise, decelerate to rest.
    #[default]
    Ramping,
    /// Linear taper from the previous feed rate to the new one.
    Taper,
    /// No acceleration, every step at the move's speed ceiling.
    Constant,
}

/// The four axis drive trains.
#[derive(Debug, Clone, Deserialize)]
pub struct Axes {
    /// X carriage.
    pub x: AxisConfig,
    /// Y carriage.
    pub y: AxisConfig,
    /// Z lead screw.
    pub z: AxisConfig,
    /// Extruder drive.
    pub e: AxisConfig,
}

impl Axes {
    /// Configuration of one axis.
    pub fn get(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::E => &self.e,
        }
    }
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Step timer clock in Hz.
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,

    /// Acceleration used by the ramping profile.
    #[serde(default = "default_acceleration")]
    pub acceleration: MmPerSecSquared,

    /// Velocity profile.
    #[serde(default)]
    pub profile: ProfileKind,

    /// Extruder coordinates are absolute rather than relative to the previous move.
    #[serde(default)]
    pub e_absolute: bool,

    /// Let other interrupts preempt the step interrupt once pulses are out.
    #[serde(default = "default_true")]
    pub step_interrupt_interruptible: bool,

    /// Extruder travel joins the move distance once `e << shift` exceeds the
    /// XYZ distance. The default of 3 folds it in at one eighth.
    #[serde(default = "default_fold_shift")]
    pub extruder_fold_shift: u8,

    /// Extruder is a DC motor switched by the auxiliary output during moves.
    #[serde(default)]
    pub dc_extruder: bool,

    /// Drive train per axis.
    pub axes: Axes,
}

fn default_clock_hz() -> u32 {
    16_000_000
}

fn default_acceleration() -> MmPerSecSquared {
    MmPerSecSquared(400.0)
}

fn default_true() -> bool {
    true
}

fn default_fold_shift() -> u8 {
    3
}

/// RAMPS 1.3 style Mendel: GT2 belts on X/Y, M8 rod on Z, geared extruder.
#[cfg(test)]
pub(crate) fn sample_config() -> MachineConfig {
    use super::units::{Microsteps, MmPerRev, RevPerSec};

    fn axis(mm_per_rev: f32, rev_per_sec: f32, fraction: f32) -> AxisConfig {
        AxisConfig {
            steps_per_revolution: 200,
            microsteps: Microsteps::EIGHTH,
            mm_per_revolution: MmPerRev(mm_per_rev),
            max_speed: RevPerSec(rev_per_sec),
            search_feed_fraction: fraction,
            invert_direction: false,
            invert_enable: true,
        }
    }

    MachineConfig {
        clock_hz: 16_000_000,
        acceleration: MmPerSecSquared(400.0),
        profile: ProfileKind::Ramping,
        e_absolute: false,
        step_interrupt_interruptible: true,
        extruder_fold_shift: 3,
        dc_extruder: false,
        axes: Axes {
            x: axis(32.0, 3.5, 0.1),
            y: axis(32.0, 3.5, 0.1),
            z: axis(1.25, 4.0, 0.25),
            e: axis(25.6, 4.0, 0.1),
        },
    }
}
