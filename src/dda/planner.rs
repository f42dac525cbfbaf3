//! Move planning.
//!
//! Turns the previous target and a new one into a [`MoveRecord`]. Planning is
//! pure integer arithmetic and cannot fail; degenerate inputs produce a slow
//! but well-defined move.

use core::marker::PhantomData;

use crate::config::MachineConstants;
use crate::motion::{MoveGeometry, RampProfile};

use super::math::{approx_distance_2d, approx_distance_3d, saturate};
use super::position::{Axis, Direction, Position};
use super::record::MoveRecord;

/// Sequential move planner.
///
/// Owns the `startpoint`, the last target handed to [`plan`](Self::plan), so
/// moves are planned strictly in queue order.
pub struct Planner<P: RampProfile> {
    constants: MachineConstants,
    startpoint: Position,
    _profile: PhantomData<P>,
}

impl<P: RampProfile> Planner<P> {
    /// Create a planner at the origin, moving at the machine's initial feed rate.
    pub fn new(constants: &MachineConstants) -> Self {
        Self {
            startpoint: Position::origin(constants.initial_feedrate),
            constants: constants.clone(),
            _profile: PhantomData,
        }
    }

    /// The last planned target (the origin of the next move).
    #[inline]
    pub fn startpoint(&self) -> Position {
        self.startpoint
    }

    /// Redefine the current position without moving, e.g. after homing.
    pub fn set_startpoint(&mut self, position: Position) {
        self.startpoint = position;
    }

    /// Machine constants this planner works with.
    #[inline]
    pub fn constants(&self) -> &MachineConstants {
        &self.constants
    }

    /// Plan a move from the startpoint to `target`.
    ///
    /// `target` becomes the new startpoint. With a relative extruder its E
    /// coordinate is reset to zero, so every move's E is a fresh offset.
    pub fn plan(&mut self, target: Position) -> MoveRecord<P> {
        let start = self.startpoint;

        let mut deltas = [0u32; 4];
        let mut directions = [Direction::Positive; 4];
        for axis in Axis::ALL {
            let (from, to) = (start.axis(axis), target.axis(axis));
            deltas[axis.index()] = from.abs_diff(to);
            directions[axis.index()] = Direction::between(from, to);
        }

        let total_steps = deltas.iter().copied().max().unwrap_or(0);

        trace!(
            "plan: dx={=u32} dy={=u32} dz={=u32} de={=u32} total={=u32}",
            deltas[0],
            deltas[1],
            deltas[2],
            deltas[3],
            total_steps
        );

        let timing = if total_steps == 0 {
            P::Timing::default()
        } else {
            let distance = self.distance(&deltas);
            let c_limit = self.c_limit(&deltas, total_steps, distance, target.f);

            trace!("plan: distance={=u32}um c_limit={=u32}", distance, c_limit);

            let geometry = MoveGeometry {
                total_steps,
                distance,
                c_limit,
                start_feed: start.f,
                target_feed: target.f,
            };
            P::plan(&geometry, &self.constants)
        };

        self.startpoint = target;
        if !self.constants.e_absolute {
            self.startpoint.e = 0;
        }

        MoveRecord::new(target, deltas, directions, timing)
    }

    /// Length of the move in µm.
    ///
    /// Single-axis moves are exact. Extruder travel only counts once
    /// `e << extruder_fold_shift` exceeds the XYZ distance, which keeps the
    /// common XY move with a trickle of filament on the cheap path.
    fn distance(&self, deltas: &[u32; 4]) -> u32 {
        let um = |axis: Axis| self.constants.axis(axis).steps_to_um(deltas[axis.index()]);
        let (dx, dy, dz) = (deltas[0], deltas[1], deltas[2]);

        let mut distance = if dz == 0 {
            if dx == 0 {
                um(Axis::Y)
            } else if dy == 0 {
                um(Axis::X)
            } else {
                approx_distance_2d(um(Axis::X), um(Axis::Y))
            }
        } else if dx == 0 && dy == 0 {
            um(Axis::Z)
        } else {
            approx_distance_3d(um(Axis::X), um(Axis::Y), um(Axis::Z))
        };

        let e_feed = um(Axis::E);
        if (distance as u64) < ((e_feed as u64) << self.constants.extruder_fold_shift) {
            distance = approx_distance_2d(distance, e_feed);
        }

        // sub-micron moves still divide by this
        distance.max(1)
    }

    /// Fewest ticks per step the move may run at.
    ///
    /// Each axis needs `delta · min_clocks_per_step` ticks for the whole move;
    /// the slowest of these, spread over `total_steps`, limits every axis.
    /// Feed-limited profiles also include the duration of the move at the
    /// requested feed rate.
    fn c_limit(&self, deltas: &[u32; 4], total_steps: u32, distance: u32, feed: u32) -> u32 {
        let mut limiting = if P::FEED_LIMITED {
            // µm · 60 / (mm/min) = ms, then to timer ticks
            let move_duration = distance as u64 * 60;
            self.constants.time_scaling as u64 * (move_duration / feed.max(1) as u64)
        } else {
            0
        };

        for axis in Axis::ALL {
            let axis_ticks =
                deltas[axis.index()] as u64 * self.constants.axis(axis).min_clocks_per_step as u64;
            limiting = limiting.max(axis_ticks);
        }

        saturate(limiting / total_steps.max(1) as u64).max(1)
    }
}
