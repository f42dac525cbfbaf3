//! Property tests over randomly planned moves.

use proptest::prelude::*;
use stepper_dda::config::MachineConstants;
use stepper_dda::error::HalError;
use stepper_dda::{
    parse_config, Axis, Direction, Planner, Position, PositionCell, Ramping, Stepper, StepperHal,
    Taper, TickOutcome,
};

const CONFIG: &str = r#"
[axes.x]
steps_per_revolution = 200
microsteps = 8
mm_per_revolution = 32.0
max_revolutions_per_sec = 3.5

[axes.y]
steps_per_revolution = 200
microsteps = 8
mm_per_revolution = 32.0
max_revolutions_per_sec = 3.5

[axes.z]
steps_per_revolution = 200
microsteps = 8
mm_per_revolution = 1.25
max_revolutions_per_sec = 4.0

[axes.e]
steps_per_revolution = 200
microsteps = 8
mm_per_revolution = 25.6
max_revolutions_per_sec = 4.0
"#;

fn constants() -> MachineConstants {
    MachineConstants::from_config(&parse_config(CONFIG).unwrap())
}

/// Counts pulses, signed by the programmed direction.
#[derive(Debug, Default)]
struct CountingHal {
    travelled: [i64; 4],
    directions: [Direction; 4],
    delays: Vec<u32>,
}

impl StepperHal for CountingHal {
    fn power_on(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn set_enabled(&mut self, _axis: Axis, _enabled: bool) -> Result<(), HalError> {
        Ok(())
    }

    fn set_direction(&mut self, axis: Axis, direction: Direction) -> Result<(), HalError> {
        self.directions[axis.index()] = direction;
        Ok(())
    }

    fn step(&mut self, axis: Axis) -> Result<(), HalError> {
        self.travelled[axis.index()] += match self.directions[axis.index()] {
            Direction::Positive => 1,
            Direction::Negative => -1,
        };
        Ok(())
    }

    fn unstep(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn set_timer(&mut self, ticks: u32) {
        self.delays.push(ticks);
    }
}

fn position() -> impl Strategy<Value = Position> {
    (
        -1500i32..1500,
        -1500i32..1500,
        -400i32..400,
        -200i32..200,
        60u32..6000,
    )
        .prop_map(|(x, y, z, e, f)| Position::new(x, y, z, e, f))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn plan_totals_and_ramp_split(start in position(), target in position()) {
        let mut planner: Planner<Ramping> = Planner::new(&constants());
        planner.set_startpoint(start);
        let record = planner.plan(target);

        let largest = Axis::ALL
            .iter()
            .map(|&axis| start.axis(axis).abs_diff(target.axis(axis)))
            .max()
            .unwrap();
        prop_assert_eq!(record.total_steps(), largest);

        if !record.is_nullmove() {
            let timing = record.timing();
            prop_assert!(timing.rampup_steps * 2 <= record.total_steps());
            prop_assert_eq!(timing.rampup_steps + timing.rampdown_steps, record.total_steps());
            prop_assert!(timing.c_min > 0);
        }
    }

    #[test]
    fn moves_land_on_their_endpoint(start in position(), target in position()) {
        let constants = constants();
        let cell = PositionCell::new(start);
        let mut planner: Planner<Ramping> = Planner::new(&constants);
        planner.set_startpoint(start);
        let mut stepper = Stepper::new(CountingHal::default(), &constants, &cell);

        let record = planner.plan(target);
        stepper.activate(&record).unwrap();

        let mut ticks = 0u32;
        while stepper.is_live() {
            let before = stepper.refresh();
            prop_assert_eq!(stepper.refresh(), before);
            if stepper.step().unwrap() == TickOutcome::Completed {
                break;
            }
            ticks += 1;
        }
        prop_assert!(!stepper.is_live());
        if !record.is_nullmove() {
            prop_assert_eq!(ticks, record.total_steps());
        }

        let hal = stepper.release();
        for axis in Axis::ALL {
            let travelled = target.axis(axis) as i64 - start.axis(axis) as i64;
            prop_assert_eq!(hal.travelled[axis.index()], travelled);
        }
        prop_assert!(hal.delays.iter().all(|&d| d >= 1));

        // relative extruder: E is reset once the move is applied
        let expected = Position { e: 0, ..target };
        let landed = cell.load();
        if record.is_nullmove() {
            prop_assert_eq!(landed.f, target.f);
        } else {
            prop_assert_eq!(landed, expected);
        }
    }

    #[test]
    fn taper_is_monotonic(start_f in 60u32..6000, target_f in 60u32..6000, steps in 1i32..3000) {
        let constants = constants();
        let cell = PositionCell::new(Position::origin(start_f));
        let mut planner: Planner<Taper> = Planner::new(&constants);
        planner.set_startpoint(Position::origin(start_f));
        let mut stepper = Stepper::new(CountingHal::default(), &constants, &cell);

        let record = planner.plan(Position::new(steps, 0, 0, 0, target_f));
        stepper.activate(&record).unwrap();
        while stepper.step().unwrap() != TickOutcome::Completed {}

        let delays = stepper.release().delays;
        let floor = record.timing().end_c >> 8;
        if record.timing().c >= record.timing().end_c {
            prop_assert!(delays.windows(2).all(|pair| pair[1] <= pair[0]));
            prop_assert!(delays.iter().all(|&d| d >= floor));
        } else {
            prop_assert!(delays.windows(2).all(|pair| pair[1] >= pair[0]));
            prop_assert!(delays.iter().all(|&d| d <= floor));
        }
    }
}
