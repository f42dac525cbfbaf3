//! The [`RampProfile`] contract and its implementations.
//!
//! Step periods are kept in 24.8 fixed point timer ticks (`ticks << 8`) so the
//! recurrences below keep fractional precision between steps; the timer is
//! always programmed with the integer part.

use core::fmt::Debug;

use crate::config::MachineConstants;

mod constant;
mod ramping;
mod taper;

pub use constant::{Constant, ConstantTiming};
pub use ramping::{Ramping, RampingState, RampingTiming};
pub use taper::{Taper, TaperState, TaperTiming};

/// Geometry of a non-null move, as seen by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveGeometry {
    /// Step count of the dominant axis, never zero.
    pub total_steps: u32,
    /// Approximate length of the move in µm, never zero.
    pub distance: u32,
    /// Fewest timer ticks per step any axis allows (and, for feed-limited
    /// profiles, the requested feed), never zero.
    pub c_limit: u32,
    /// Feed rate the previous move ended with, mm/min.
    pub start_feed: u32,
    /// Feed rate requested for this move, mm/min.
    pub target_feed: u32,
}

/// A velocity profile: move planning plus the per-step period recurrence.
pub trait RampProfile {
    /// Whether the requested feed rate caps the move speed through `c_limit`.
    ///
    /// Profiles that derive their speeds from the feed rates themselves leave
    /// `c_limit` to the axis limits alone.
    const FEED_LIMITED: bool;

    /// Immutable timing parameters stored in each move record.
    type Timing: Copy + Default + Debug + PartialEq;

    /// Mutable ramp progress owned by the step generator.
    type State: Copy + Default + Debug;

    /// Derive timing parameters for a move.
    fn plan(geometry: &MoveGeometry, constants: &MachineConstants) -> Self::Timing;

    /// Ramp state at the first step of a move.
    fn start(timing: &Self::Timing) -> Self::State;

    /// Advance the ramp by one step interrupt.
    fn advance(timing: &Self::Timing, state: &mut Self::State);

    /// Current step period in 24.8 fixed point ticks.
    fn period(timing: &Self::Timing, state: &Self::State) -> u32;

    /// Timer ticks until the next step interrupt.
    #[inline]
    fn delay(timing: &Self::Timing, state: &Self::State) -> u32 {
        Self::period(timing, state) >> 8
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::MoveGeometry;

    /// 1000 X steps (20 mm) on the sample machine at the given feeds.
    pub fn x_move(start_feed: u32, target_feed: u32, c_limit: u32) -> MoveGeometry {
        MoveGeometry {
            total_steps: 1000,
            distance: 20_000,
            c_limit,
            start_feed,
            target_feed,
        }
    }
}
