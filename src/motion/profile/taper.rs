//! Linear feed rate taper.
//!
//! Each move starts at the period of the previous move's feed rate and slides
//! towards the period of its own, so consecutive moves blend without coming to
//! rest. Both ends are capped by the axis speed limits.

use crate::config::MachineConstants;
use crate::dda::math::{msb_index, saturate};

use super::{MoveGeometry, RampProfile};

/// Taper profile marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Taper;

/// Timing parameters of a tapered move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaperTiming {
    /// Period at the start feed rate (24.8 ticks).
    pub c: u32,
    /// Period at the target feed rate (24.8 ticks).
    pub end_c: u32,
    /// Initial slope counter; positive to speed up, negative to slow down,
    /// zero when the move jumps straight to `end_c`.
    pub n: i32,
}

/// Taper progress of the running move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaperState {
    /// Current step period (24.8 ticks).
    pub c: u32,
    /// Slope counter.
    pub n: i32,
}

/// How the slope counter was evaluated, by which operand carries more bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum SlopeOrder {
    /// `total · ssq` fits in 31 bits: multiply first.
    MultiplyFirst,
    /// `total` is wider: divide it first.
    TotalFirst,
    /// `ssq` is wider: divide it first.
    SquareFirst,
}

/// Slope counter for going from `start_feed` to `target_feed` over `total` steps.
///
/// Feeds are quartered before squaring. The evaluation order follows the
/// widths of the operands so the result matches what 32-bit arithmetic
/// yields wherever that arithmetic did not overflow.
fn slope(total: u32, start_feed: u32, target_feed: u32) -> (i32, Option<SlopeOrder>) {
    let start = (start_feed / 4) as i64;
    let end = (target_feed / 4) as i64;
    let ssq = start * start;
    let esq = end * end;
    let dsq = (esq - ssq) / 4;

    if dsq == 0 {
        warn!("taper: feeds {=u32} and {=u32} too close for a slope", start_feed, target_feed);
        return (0, None);
    }

    let total = total as i64;
    let msb_ssq = msb_index(saturate(ssq as u64));
    let msb_tot = msb_index(total as u32);

    let (n, order) = if msb_tot + msb_ssq <= 30 {
        (total * ssq / dsq, SlopeOrder::MultiplyFirst)
    } else if msb_tot >= msb_ssq {
        ((total / dsq) * ssq, SlopeOrder::TotalFirst)
    } else {
        ((ssq / dsq) * total, SlopeOrder::SquareFirst)
    };

    let n = (n + 1).clamp(i32::MIN as i64 + 1, i32::MAX as i64 - 4) as i32;
    (n, Some(order))
}

impl RampProfile for Taper {
    const FEED_LIMITED: bool = false;

    type Timing = TaperTiming;
    type State = TaperState;

    fn plan(geometry: &MoveGeometry, constants: &MachineConstants) -> TaperTiming {
        let total = geometry.total_steps.max(1) as u64;
        // µm · 60 / (mm/min) = ms for the whole move
        let move_duration = geometry.distance as u64 * 60;
        let floor = (geometry.c_limit.max(1) as u64) << 8;

        let period = |feed: u32| -> u32 {
            let move_ticks = constants.time_scaling as u64 * (move_duration / feed.max(1) as u64);
            saturate(((move_ticks / total) << 8).max(floor))
        };

        let c = period(geometry.start_feed);
        let end_c = period(geometry.target_feed);

        let (n, order) = if c != end_c {
            slope(geometry.total_steps, geometry.start_feed, geometry.target_feed)
        } else {
            (0, None)
        };

        trace!(
            "taper: c={=u32} end_c={=u32} n={=i32} order={}",
            c >> 8,
            end_c >> 8,
            n,
            order
        );

        TaperTiming { c, end_c, n }
    }

    fn start(timing: &TaperTiming) -> TaperState {
        TaperState {
            c: timing.c,
            n: timing.n,
        }
    }

    fn advance(timing: &TaperTiming, state: &mut TaperState) {
        let end_c = timing.end_c;

        if state.c > end_c && state.n > 0 {
            let change = (state.c as u64 * 2) / state.n as u64;
            match state.c.checked_sub(saturate(change)) {
                Some(next) if next > end_c => {
                    state.c = next;
                    state.n = state.n.saturating_add(4);
                }
                _ => state.c = end_c,
            }
        } else if state.c < end_c && state.n < 0 {
            let change = (state.c as u64 * 2) / state.n.unsigned_abs() as u64;
            match state.c.checked_add(saturate(change)) {
                Some(next) if next < end_c => {
                    state.c = next;
                    state.n = state.n.saturating_add(4);
                }
                _ => state.c = end_c,
            }
        } else if state.c != end_c {
            state.c = end_c;
        }
    }

    #[inline]
    fn period(_timing: &TaperTiming, state: &TaperState) -> u32 {
        state.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::machine::sample_config;
    use crate::motion::profile::test_support::x_move;

    fn constants() -> MachineConstants {
        MachineConstants::from_config(&sample_config())
    }

    #[test]
    fn test_plan_speed_up() {
        // X alone caps at 2857 ticks per step, well below both feeds
        let timing = Taper::plan(&x_move(1500, 3000, 2857), &constants());

        assert_eq!(timing.c, 12_800 << 8);
        assert_eq!(timing.end_c, 6400 << 8);
        // 1000 * 375² / ((750² - 375²) / 4) + 1
        assert_eq!(timing.n, 1334);
    }

    #[test]
    fn test_plan_slow_down() {
        let timing = Taper::plan(&x_move(3000, 1500, 2857), &constants());

        assert_eq!(timing.c, 6400 << 8);
        assert_eq!(timing.end_c, 12_800 << 8);
        assert_eq!(timing.n, -5332);
    }

    #[test]
    fn test_plan_caps_at_axis_limit() {
        // 20000 mm/min would need 960 ticks per step; the X axis cannot
        let timing = Taper::plan(&x_move(1500, 20_000, 2857), &constants());
        assert_eq!(timing.end_c, 2857 << 8);
    }

    #[test]
    fn test_equal_feeds_have_no_slope() {
        let timing = Taper::plan(&x_move(3000, 3000, 2857), &constants());
        assert_eq!(timing.c, timing.end_c);
        assert_eq!(timing.n, 0);
    }

    #[test]
    fn test_slope_orders() {
        assert_eq!(slope(1000, 1500, 3000), (1334, Some(SlopeOrder::MultiplyFirst)));
        // ssq = 2500², 23 bits; total 14 bits
        let (_, order) = slope(20_000, 10_000, 12_000);
        assert_eq!(order, Some(SlopeOrder::SquareFirst));
        let (_, order) = slope(1 << 20, 1000, 1200);
        assert_eq!(order, Some(SlopeOrder::TotalFirst));
        // quartered feeds identical
        assert_eq!(slope(1000, 1500, 1501), (0, None));
    }

    #[test]
    fn test_speed_up_is_monotonic_and_lands_on_end() {
        let timing = Taper::plan(&x_move(1500, 3000, 2857), &constants());
        let mut state = Taper::start(&timing);

        let mut previous = state.c;
        for _ in 0..1000 {
            Taper::advance(&timing, &mut state);
            assert!(state.c <= previous);
            assert!(state.c >= timing.end_c);
            previous = state.c;
        }
        assert_eq!(state.c, timing.end_c);
    }

    #[test]
    fn test_slow_down_is_monotonic() {
        let timing = Taper::plan(&x_move(3000, 1500, 2857), &constants());
        let mut state = Taper::start(&timing);

        let mut previous = state.c;
        for _ in 0..1000 {
            Taper::advance(&timing, &mut state);
            assert!(state.c >= previous);
            assert!(state.c <= timing.end_c);
            previous = state.c;
        }
    }

    #[test]
    fn test_zero_slope_snaps_to_end() {
        let timing = TaperTiming {
            c: 9000 << 8,
            end_c: 8000 << 8,
            n: 0,
        };
        let mut state = Taper::start(&timing);

        Taper::advance(&timing, &mut state);
        assert_eq!(state.c, timing.end_c);
        assert_eq!(Taper::delay(&timing, &state), 8000);
    }

    #[test]
    fn test_shallow_slope_on_long_move_saturates() {
        // 30 m at almost the same feed: the slope counter is clamped to its limit
        let geometry = MoveGeometry {
            total_steps: 1_500_000,
            distance: 30_000_000,
            c_limit: 2857,
            start_feed: 3000,
            target_feed: 3004,
        };
        let timing = Taper::plan(&geometry, &constants());
        assert_eq!(timing.n, i32::MAX - 4);

        let mut state = Taper::start(&timing);
        for _ in 0..3 {
            Taper::advance(&timing, &mut state);
            assert!(state.c <= timing.c);
            assert!(state.c >= timing.end_c);
        }
        assert_eq!(state.n, i32::MAX);
    }
}
