//! The DDA engine.
//!
//! A [`Planner`] turns targets into [`MoveRecord`]s in queue order. A
//! [`Stepper`] activates one record at a time and, driven by the step timer,
//! spreads each axis' steps evenly over the move with one Bresenham
//! accumulator per axis, so every axis arrives at its target together.
//!
//! ```rust,ignore
//! let constants = MachineConstants::from_config(&config);
//! static POSITION: PositionCell = PositionCell::new(Position::origin(0));
//!
//! let mut planner: Planner<Ramping> = Planner::new(&constants);
//! let mut queue: MoveQueue<Ramping, 8> = MoveQueue::new();
//! let mut stepper = Stepper::new(hal, &constants, &POSITION);
//!
//! queue.enqueue(planner.plan(Position::new(1000, 0, 0, 0, 3000)))?;
//! stepper.service(&mut queue)?; // then once per timer interrupt
//! ```

pub(crate) mod math;
mod planner;
mod position;
mod queue;
mod record;
mod state;
mod stepper;
mod tracker;

pub use math::{approx_distance_2d, approx_distance_3d, int_sqrt};
pub use planner::Planner;
pub use position::{Axis, Direction, Position, PositionCell};
pub use queue::MoveQueue;
pub use record::MoveRecord;
pub use state::MoveState;
pub use stepper::{Activation, Pulses, Stepper, TickOutcome};
