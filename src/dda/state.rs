//! Per-move progress of the step generator.

use crate::motion::RampProfile;

use super::position::Axis;
use super::record::MoveRecord;

/// Bresenham accumulators, remaining step counts and ramp progress of the
/// running move. Reused from one move to the next; only the stepper writes it.
pub struct MoveState<P: RampProfile> {
    counters: [i64; 4],
    remaining: [u32; 4],
    ramp: P::State,
}

impl<P: RampProfile> MoveState<P> {
    /// State at the first step of `record`.
    ///
    /// Accumulators start at `-total/2` so each axis' pulses are centred in
    /// their share of the move.
    pub(crate) fn start(record: &MoveRecord<P>) -> Self {
        let counter = -((record.total_steps() >> 1) as i64);
        Self {
            counters: [counter; 4],
            remaining: Axis::ALL.map(|axis| record.delta(axis)),
            ramp: P::start(record.timing()),
        }
    }

    /// Steps still to go on one axis.
    #[inline]
    pub fn remaining(&self, axis: Axis) -> u32 {
        self.remaining[axis.index()]
    }

    /// Every axis has emitted all of its steps.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.iter().all(|&steps| steps == 0)
    }

    /// Ramp progress.
    #[inline]
    pub fn ramp(&self) -> &P::State {
        &self.ramp
    }

    pub(crate) fn ramp_mut(&mut self) -> &mut P::State {
        &mut self.ramp
    }

    /// Advance one axis' accumulator by one tick. Returns whether the axis
    /// steps on this tick.
    #[inline]
    pub(crate) fn tick_axis(&mut self, axis: Axis, delta: u32, total_steps: u32) -> bool {
        let i = axis.index();
        if self.remaining[i] == 0 {
            return false;
        }

        self.counters[i] -= delta as i64;
        if self.counters[i] < 0 {
            self.remaining[i] -= 1;
            self.counters[i] += total_steps as i64;
            true
        } else {
            false
        }
    }

    /// Undo a [`tick_axis`](Self::tick_axis) that stepped but whose pulse
    /// never reached the driver.
    pub(crate) fn untick_axis(&mut self, axis: Axis, delta: u32, total_steps: u32) {
        let i = axis.index();
        self.remaining[i] += 1;
        self.counters[i] += delta as i64 - total_steps as i64;
    }
}

impl<P: RampProfile> Default for MoveState<P> {
    fn default() -> Self {
        Self {
            counters: [0; 4],
            remaining: [0; 4],
            ramp: P::State::default(),
        }
    }
}

impl<P: RampProfile> core::fmt::Debug for MoveState<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MoveState")
            .field("counters", &self.counters)
            .field("remaining", &self.remaining)
            .field("ramp", &self.ramp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dda::position::{Direction, Position};
    use crate::motion::{Constant, ConstantTiming};

    fn record(deltas: [u32; 4]) -> MoveRecord<Constant> {
        MoveRecord::new(
            Position::origin(1500),
            deltas,
            [Direction::Positive; 4],
            ConstantTiming { c: 1000 << 8 },
        )
    }

    #[test]
    fn test_start() {
        let state = MoveState::start(&record([1000, 500, 0, 3]));
        assert_eq!(state.counters, [-500; 4]);
        assert_eq!(state.remaining(Axis::Y), 500);
        assert!(!state.is_exhausted());
    }

    #[test]
    fn test_half_rate_axis_spacing() {
        let record = record([10, 5, 0, 0]);
        let mut state = MoveState::start(&record);

        let fired: [bool; 10] = core::array::from_fn(|_| state.tick_axis(Axis::Y, 5, 10));
        assert_eq!(
            fired,
            [true, true, false, true, false, true, false, true, false, false]
        );
        assert_eq!(state.remaining(Axis::Y), 0);
    }

    #[test]
    fn test_untick_restores_pending_step() {
        let record = record([10, 5, 0, 0]);
        let mut state = MoveState::start(&record);

        assert!(state.tick_axis(Axis::Y, 5, 10));
        state.untick_axis(Axis::Y, 5, 10);
        assert_eq!(state.remaining(Axis::Y), 5);
        assert_eq!(state.counters[Axis::Y.index()], -5);
        // the same step is due again on the next tick
        assert!(state.tick_axis(Axis::Y, 5, 10));
    }

    #[test]
    fn test_idle_axis_never_steps() {
        let record = record([10, 0, 0, 0]);
        let mut state = MoveState::start(&record);
        assert!((0..10).all(|_| !state.tick_axis(Axis::Z, 0, 10)));
    }
}
