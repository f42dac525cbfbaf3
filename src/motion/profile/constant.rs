//! Constant speed: every step at the move's speed ceiling.

use crate::config::MachineConstants;
use crate::dda::math::saturate;

use super::{MoveGeometry, RampProfile};

/// Constant speed profile marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

/// Timing parameters of a constant speed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConstantTiming {
    /// Step period (24.8 ticks).
    pub c: u32,
}

impl RampProfile for Constant {
    const FEED_LIMITED: bool = true;

    type Timing = ConstantTiming;
    type State = ();

    fn plan(geometry: &MoveGeometry, _constants: &MachineConstants) -> ConstantTiming {
        ConstantTiming {
            c: saturate((geometry.c_limit.max(1) as u64) << 8),
        }
    }

    fn start(_timing: &ConstantTiming) {}

    fn advance(_timing: &ConstantTiming, _state: &mut ()) {}

    #[inline]
    fn period(timing: &ConstantTiming, _state: &()) -> u32 {
        timing.c
    }
}
