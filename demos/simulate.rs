//! Example: Simulated print moves.
//!
//! This example demonstrates how to:
//! - Load the machine description from TOML and print the derived constants
//! - Plan a short sequence of moves into a queue
//! - Drive the step interrupt against simulated pins and timer
//!
//! Run with: `cargo run --example simulate --features std`

use std::cell::Cell;
use std::rc::Rc;

use stepper_dda::hal::{GpioHal, StepTimer};
use stepper_dda::{
    parse_config, Axis, MachineConstants, MoveQueue, Planner, Position, PositionCell, Ramping,
    Result, Stepper, TickOutcome,
};

/// Output pin that reports level changes and counts rising edges.
struct SimPin {
    name: &'static str,
    verbose: bool,
    level: bool,
    rising: Rc<Cell<u32>>,
}

impl SimPin {
    fn quiet(name: &'static str, rising: Rc<Cell<u32>>) -> Self {
        Self {
            name,
            verbose: false,
            level: false,
            rising,
        }
    }

    fn loud(name: &'static str) -> Self {
        Self {
            name,
            verbose: true,
            level: false,
            rising: Rc::new(Cell::new(0)),
        }
    }

    fn set(&mut self, level: bool) {
        if level && !self.level {
            self.rising.set(self.rising.get() + 1);
        }
        if self.verbose && level != self.level {
            println!("    {} -> {}", self.name, if level { "high" } else { "low" });
        }
        self.level = level;
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// Timer that adds up the programmed delays as elapsed time.
#[derive(Default)]
struct SimTimer {
    elapsed: u64,
    pending: u32,
}

impl StepTimer for SimTimer {
    fn schedule(&mut self, ticks: u32) {
        self.elapsed += self.pending as u64;
        self.pending = ticks;
    }
}

const MACHINE: &str = r#"
clock_hz = 16000000
acceleration = 400.0

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
search_feed_fraction = 0.25

[axes.e]
steps_per_revolution = 200
microsteps = 8
mm_per_revolution = 25.6
max_revolutions_per_sec = 4.0
"#;

fn main() -> Result<()> {
    println!("=== Simulated Print Moves ===\n");

    let config = parse_config(MACHINE)?;
    let constants = MachineConstants::from_config(&config);
    println!("{}", constants);

    let counters: [Rc<Cell<u32>>; 4] = Default::default();
    let mut builder = GpioHal::builder().from_constants(&constants);
    for axis in Axis::ALL {
        let (dir, enable) = match axis {
            Axis::X => ("X dir", "X enable"),
            Axis::Y => ("Y dir", "Y enable"),
            Axis::Z => ("Z dir", "Z enable"),
            Axis::E => ("E dir", "E enable"),
        };
        builder = builder.axis(
            axis,
            SimPin::quiet("step", counters[axis.index()].clone()),
            SimPin::loud(dir),
            SimPin::loud(enable),
        );
    }
    let hal = builder.timer(SimTimer::default()).build()?;

    let position = PositionCell::new(Position::origin(constants.initial_feedrate));
    let mut planner: Planner<Ramping> = Planner::new(&constants);
    let mut queue: MoveQueue<Ramping, 8> = MoveQueue::new();
    let mut stepper = Stepper::new(hal, &constants, &position);

    // (target, description)
    let moves = [
        (Position::new(0, 0, 64, 0, 75), "lift Z by 0.05 mm at search feed"),
        (Position::new(0, 0, 64, 0, 3000), "set feed rate"),
        (Position::new(1000, 0, 64, 0, 3000), "travel 20 mm along X"),
        (Position::new(1000, 500, 64, 40, 1800), "extrude along Y"),
        (Position::new(0, 0, 64, 0, 6000), "rapid back to origin"),
    ];

    for (target, description) in moves {
        let record = planner.plan(target);
        println!(
            "Queued: {:<34} {:>5} steps{}",
            description,
            record.total_steps(),
            if record.is_nullmove() { " (feed only)" } else { "" }
        );
        if queue.enqueue(record).is_err() {
            println!("  queue full, dropped");
        }
    }
    println!();

    stepper.service(&mut queue)?;
    let mut ticks = 0u32;
    while stepper.is_live() {
        ticks += 1;
        if stepper.service(&mut queue)? == TickOutcome::Completed {
            let at = stepper.refresh();
            println!(
                "  move done after {} ticks, now at X={} Y={} Z={} F={}",
                ticks, at.x, at.y, at.z, at.f
            );
            ticks = 0;
        }
    }

    let hal = stepper.release();
    let elapsed_ms = hal.timer().elapsed * 1000 / constants.clock_hz as u64;
    println!("\nSteps emitted:");
    for axis in Axis::ALL {
        println!("  {}: {}", axis, counters[axis.index()].get());
    }
    println!("Simulated time: {} ms", elapsed_ms);
    println!("Final position: {:?}", position.load());

    println!("\n=== Simulation Complete ===");
    Ok(())
}
