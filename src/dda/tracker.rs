//! Position tracking for foreground readers.

use crate::hal::StepperHal;
use crate::motion::RampProfile;

use super::position::{Axis, Direction, Position};
use super::stepper::Stepper;

impl<P, H> Stepper<'_, P, H>
where
    P: RampProfile,
    H: StepperHal,
{
    /// Recompute the live position estimate from the running move.
    ///
    /// Each axis is its endpoint minus the steps still to go in its direction
    /// of travel. Does nothing when no move is live; the last completed move
    /// already published its endpoint. Returns the published position.
    ///
    /// The step interrupt must be masked around this call (any critical
    /// section will do), otherwise a count may be read mid-tick.
    pub fn refresh(&self) -> Position {
        if let Some(record) = self.live_move() {
            let endpoint = record.endpoint();
            let state = self.move_state();

            for axis in Axis::ALL {
                let remaining = state.remaining(axis) as i32;
                let steps = match record.direction(axis) {
                    Direction::Positive => endpoint.axis(axis).wrapping_sub(remaining),
                    Direction::Negative => endpoint.axis(axis).wrapping_add(remaining),
                };
                self.position_cell().store_axis(axis, steps);
            }
        }

        self.current_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::machine::sample_config;
    use crate::config::MachineConstants;
    use crate::dda::planner::Planner;
    use crate::dda::position::PositionCell;
    use crate::dda::stepper::tests::Recorder;
    use crate::motion::Ramping;

    #[test]
    fn test_refresh_mid_move() {
        let constants = MachineConstants::from_config(&sample_config());
        let cell = PositionCell::new(Position::origin(75));
        let mut planner: Planner<Ramping> = Planner::new(&constants);
        let mut stepper = Stepper::new(Recorder::default(), &constants, &cell);

        planner.set_startpoint(Position::new(100, 100, 0, 0, 75));
        let record = planner.plan(Position::new(200, 0, 0, 0, 1500));
        stepper.activate(&record).unwrap();

        for _ in 0..40 {
            stepper.step().unwrap();
        }

        let position = stepper.refresh();
        assert_eq!(position.x, 140);
        assert_eq!(position.y, 60);
        // feed is only published on completion
        assert_eq!(position.f, 75);

        // idempotent without intervening ticks
        assert_eq!(stepper.refresh(), position);
        assert_eq!(cell.load(), position);
    }

    #[test]
    fn test_refresh_idle_is_noop() {
        let constants = MachineConstants::from_config(&sample_config());
        let cell = PositionCell::new(Position::new(5, 6, 7, 0, 300));
        let stepper: Stepper<'_, Ramping, _> =
            Stepper::new(Recorder::default(), &constants, &cell);

        assert_eq!(stepper.refresh(), Position::new(5, 6, 7, 0, 300));
    }
}
