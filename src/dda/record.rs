//! Move records.

use crate::motion::RampProfile;

use super::position::{Axis, Direction, Position};

/// One planned linear move.
///
/// Built once by the [`Planner`](super::Planner) and never modified afterwards;
/// everything that changes while the move runs lives in the stepper's
/// [`MoveState`](super::MoveState).
pub struct MoveRecord<P: RampProfile> {
    endpoint: Position,
    deltas: [u32; 4],
    directions: [Direction; 4],
    total_steps: u32,
    timing: P::Timing,
}

impl<P: RampProfile> MoveRecord<P> {
    pub(crate) fn new(
        endpoint: Position,
        deltas: [u32; 4],
        directions: [Direction; 4],
        timing: P::Timing,
    ) -> Self {
        let total_steps = deltas.iter().copied().max().unwrap_or(0);
        Self {
            endpoint,
            deltas,
            directions,
            total_steps,
            timing,
        }
    }

    /// Absolute target of the move, including its feed rate.
    #[inline]
    pub fn endpoint(&self) -> Position {
        self.endpoint
    }

    /// Unsigned step count on one axis.
    #[inline]
    pub fn delta(&self, axis: Axis) -> u32 {
        self.deltas[axis.index()]
    }

    /// Travel direction on one axis.
    #[inline]
    pub fn direction(&self, axis: Axis) -> Direction {
        self.directions[axis.index()]
    }

    /// Step count of the dominant axis: the number of step interrupts the
    /// move takes, plus the one that notices it is done.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// The move only changes the feed rate.
    #[inline]
    pub fn is_nullmove(&self) -> bool {
        self.total_steps == 0
    }

    /// Profile timing parameters. Default values for a null move.
    #[inline]
    pub fn timing(&self) -> &P::Timing {
        &self.timing
    }
}

// Manual impls: the profile marker itself need not be Clone or Debug.
impl<P: RampProfile> Clone for MoveRecord<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: RampProfile> Copy for MoveRecord<P> {}

impl<P: RampProfile> PartialEq for MoveRecord<P> {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.deltas == other.deltas
            && self.directions == other.directions
            && self.timing == other.timing
    }
}

impl<P: RampProfile> core::fmt::Debug for MoveRecord<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MoveRecord")
            .field("endpoint", &self.endpoint)
            .field("deltas", &self.deltas)
            .field("directions", &self.directions)
            .field("total_steps", &self.total_steps)
            .field("timing", &self.timing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{Constant, ConstantTiming};

    #[test]
    fn test_total_steps_is_largest_delta() {
        let record: MoveRecord<Constant> = MoveRecord::new(
            Position::new(10, -40, 0, 25, 1500),
            [10, 40, 0, 25],
            [
                Direction::Positive,
                Direction::Negative,
                Direction::Positive,
                Direction::Positive,
            ],
            ConstantTiming { c: 1000 << 8 },
        );

        assert_eq!(record.total_steps(), 40);
        assert!(!record.is_nullmove());
        assert_eq!(record.direction(Axis::Y), Direction::Negative);
        assert_eq!(record.delta(Axis::E), 25);
    }

    #[test]
    fn test_nullmove() {
        let record: MoveRecord<Constant> = MoveRecord::new(
            Position::origin(600),
            [0; 4],
            [Direction::Positive; 4],
            ConstantTiming::default(),
        );

        assert!(record.is_nullmove());
        assert_eq!(record.endpoint().f, 600);
    }
}
