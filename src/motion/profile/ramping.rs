//! Trapezoidal ramping.
//!
//! Accelerates from rest at the configured acceleration, cruises at the
//! move's speed ceiling and decelerates back to rest. Ramp lengths are
//! precomputed by the planner; the interrupt only runs the step period
//! recurrence `c' = c - 2c / n` (Austin, "Generate stepper-motor speed
//! profiles in real time").

use crate::config::MachineConstants;
use crate::dda::math::{int_sqrt, saturate};

use super::{MoveGeometry, RampProfile};

/// Ramping profile marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ramping;

/// Timing parameters of a ramping move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampingTiming {
    /// Period of the first step (24.8 ticks).
    pub c0: u32,
    /// Shortest allowed period, the move's speed ceiling (24.8 ticks).
    pub c_min: u32,
    /// Steps spent accelerating.
    pub rampup_steps: u32,
    /// Step index after which deceleration begins.
    pub rampdown_steps: u32,
}

/// Ramp progress of the running move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampingState {
    /// Steps taken so far.
    pub step_no: u32,
    /// Ramp slope counter; positive while accelerating, negative while
    /// decelerating. Always odd, so never zero.
    pub n: i32,
    /// Current step period (24.8 ticks), before the `c_min` floor.
    pub c: u32,
}

impl RampProfile for Ramping {
    const FEED_LIMITED: bool = true;

    type Timing = RampingTiming;
    type State = RampingState;

    fn plan(geometry: &MoveGeometry, constants: &MachineConstants) -> RampingTiming {
        let clock = constants.clock_hz as u64;
        let total = geometry.total_steps.max(1) as u64;
        let distance = geometry.distance.max(1) as u64;
        let c_limit = geometry.c_limit.max(1) as u64;

        // Start speed from v² = 2·a·s over the first step: c0 = f / sqrt(a·steps/µm).
        let start_term = (constants.c0_accel as u64 * total) / distance;
        let c0 = saturate((clock / int_sqrt(start_term).max(1)) << 8);
        let c_min = saturate(c_limit << 8);

        // Ramp length s = v² / 2a, in staged integer form. With a 16 MHz clock
        // and step rates of 1..20 kHz the stages stay within 32 bits, as they
        // must have on 8-bit targets; they run in 64 bits, saturating, only to
        // keep extreme configurations from wrapping.
        //   cruise_rate: steps/s at c_limit             12..15 bits
        //   rate_sq:     cruise_rate² >> 12             12..18 bits
        //   scaled:      rate_sq · distance (µm)        17..32 bits
        //   divisor:     (ramp_accel · total) >> 6      ramp_accel = 2000·a >> 6
        let cruise_rate = clock / c_limit;
        let rate_sq = cruise_rate.saturating_mul(cruise_rate) >> 12;
        let scaled = rate_sq.saturating_mul(distance);
        let divisor = ((constants.ramp_accel as u64 * total) >> 6).max(1);
        let natural = saturate(scaled / divisor);

        // Too short to reach the ceiling: meet in the middle.
        let rampup_steps = natural.min(geometry.total_steps / 2);
        let rampdown_steps = geometry.total_steps - rampup_steps;

        trace!(
            "ramping: c0={=u32} c_min={=u32} natural={=u32} up={=u32} down={=u32}",
            c0 >> 8,
            c_min >> 8,
            natural,
            rampup_steps,
            rampdown_steps
        );

        RampingTiming {
            c0,
            c_min,
            rampup_steps,
            rampdown_steps,
        }
    }

    fn start(timing: &RampingTiming) -> RampingState {
        RampingState {
            step_no: 0,
            n: 1,
            c: timing.c0,
        }
    }

    fn advance(timing: &RampingTiming, state: &mut RampingState) {
        let recalc = if state.step_no < timing.rampup_steps {
            if state.n < 0 {
                state.n = -2 - state.n;
            }
            true
        } else if state.step_no > timing.rampdown_steps {
            if state.n > 0 {
                state.n = -2 - state.n;
            }
            true
        } else {
            false
        };

        if recalc {
            state.n = state.n.saturating_add(4);
            let c = state.c as i64;
            let next = c - (c * 2) / state.n as i64;
            // A deceleration with no preceding ramp-up starts from n = 1 and
            // would drive c negative.
            state.c = next.clamp(1, u32::MAX as i64) as u32;
        }

        state.step_no = state.step_no.saturating_add(1);
    }

    #[inline]
    fn period(timing: &RampingTiming, state: &RampingState) -> u32 {
        timing.c_min.max(state.c)
    }
}
