//! Move activation and the step interrupt.
//!
//! [`Stepper`] owns the hardware layer, the live move and its
//! [`MoveState`]. Everything here runs in (or on behalf of) the step timer
//! interrupt; taking `&mut self` makes the stepper the single writer of move
//! progress, and exactly one move can be live at a time.
//!
//! A tick is split in two. [`emit_pulses`](Stepper::emit_pulses) is the
//! timing-critical part and must run with interrupts masked.
//! [`finish_tick`](Stepper::finish_tick) recomputes the ramp, detects
//! completion and reprograms the timer; when the machine allows it, other
//! interrupts may preempt it through the hardware layer's preemption window.

use crate::config::MachineConstants;
use crate::error::{MotionError, Result};
use crate::hal::StepperHal;
use crate::motion::RampProfile;

use super::position::{Axis, Position, PositionCell};
use super::record::MoveRecord;
use super::state::MoveState;

/// What [`Stepper::activate`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activation {
    /// Null move: only the feed rate changed, nothing was started.
    FeedRateOnly,
    /// The move is live and the timer is running.
    Started,
}

/// What a step interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No move was live.
    Idle,
    /// The move continues.
    Running,
    /// The move finished on this tick.
    Completed,
}

/// Axes pulsed during one tick.
///
/// Returned by [`Stepper::emit_pulses`] and consumed by
/// [`Stepper::finish_tick`], so the second phase cannot be skipped by
/// accident.
#[must_use = "pass the pulses to Stepper::finish_tick"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulses(u8);

impl Pulses {
    /// No axis pulsed.
    pub const NONE: Self = Self(0);

    fn insert(&mut self, axis: Axis) {
        self.0 |= 1 << axis.index();
    }

    /// Whether `axis` pulsed.
    #[inline]
    pub fn contains(self, axis: Axis) -> bool {
        self.0 & (1 << axis.index()) != 0
    }

    /// Whether no axis pulsed.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of axes that pulsed.
    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

/// Move activator and step generator.
pub struct Stepper<'a, P, H>
where
    P: RampProfile,
    H: StepperHal,
{
    hal: H,
    position: &'a PositionCell,
    live: Option<MoveRecord<P>>,
    state: MoveState<P>,
    e_absolute: bool,
    dc_extruder: bool,
    interruptible: bool,
}

impl<'a, P, H> Stepper<'a, P, H>
where
    P: RampProfile,
    H: StepperHal,
{
    /// Create an idle stepper publishing its position into `position`.
    pub fn new(hal: H, constants: &MachineConstants, position: &'a PositionCell) -> Self {
        Self {
            hal,
            position,
            live: None,
            state: MoveState::default(),
            e_absolute: constants.e_absolute,
            dc_extruder: constants.dc_extruder,
            interruptible: constants.step_interrupt_interruptible,
        }
    }

    /// Whether a move is running.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// The running move, if any.
    #[inline]
    pub fn live_move(&self) -> Option<&MoveRecord<P>> {
        self.live.as_ref()
    }

    /// Progress of the running (or last) move.
    #[inline]
    pub fn move_state(&self) -> &MoveState<P> {
        &self.state
    }

    /// Last published position estimate.
    #[inline]
    pub fn current_position(&self) -> Position {
        self.position.load()
    }

    pub(crate) fn position_cell(&self) -> &PositionCell {
        self.position
    }

    /// The hardware layer.
    #[inline]
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// The hardware layer, mutably.
    #[inline]
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Consume the stepper, returning the hardware layer.
    pub fn release(self) -> H {
        self.hal
    }

    /// Start a planned move.
    ///
    /// A null move only publishes its feed rate and never goes live. Otherwise
    /// the drivers are enabled (Z only when it moves), directions are set, the
    /// move state is reset and the timer is programmed for the first step.
    ///
    /// # Errors
    ///
    /// `MotionError::MoveInProgress` if a move is already live, or a hardware
    /// error from the pins.
    pub fn activate(&mut self, record: &MoveRecord<P>) -> Result<Activation> {
        if self.live.is_some() {
            return Err(MotionError::MoveInProgress.into());
        }

        if record.is_nullmove() {
            self.position.store_feed(record.endpoint().f);
            debug!("feed rate now {=u32}", record.endpoint().f);
            return Ok(Activation::FeedRateOnly);
        }

        self.hal.power_on()?;
        for axis in [Axis::X, Axis::Y, Axis::E] {
            self.hal.set_enabled(axis, true)?;
        }
        // Z holds its position unpowered between moves.
        if record.delta(Axis::Z) != 0 {
            self.hal.set_enabled(Axis::Z, true)?;
        }

        for axis in Axis::ALL {
            self.hal.set_direction(axis, record.direction(axis))?;
        }

        if self.dc_extruder && record.delta(Axis::E) != 0 {
            self.hal.set_extruder_aux(true)?;
        }

        self.state = MoveState::start(record);
        self.live = Some(*record);
        self.hal.set_timer(P::delay(record.timing(), self.state.ramp()));

        debug!("move started: {=u32} steps", record.total_steps());
        Ok(Activation::Started)
    }

    /// First half of a tick: pulse every axis that is due.
    ///
    /// # Errors
    ///
    /// A hardware error from a step pin. The failed step stays pending, the
    /// pins raised so far are lowered and the timer is rearmed at the current
    /// period, so the next tick retries it.
    pub fn emit_pulses(&mut self) -> Result<Pulses> {
        let Some(record) = self.live else {
            return Ok(Pulses::NONE);
        };

        let total_steps = record.total_steps();
        let mut pulses = Pulses::NONE;
        for axis in Axis::ALL {
            let delta = record.delta(axis);
            if self.state.tick_axis(axis, delta, total_steps) {
                if let Err(e) = self.hal.step(axis) {
                    self.state.untick_axis(axis, delta, total_steps);
                    self.hal.set_timer(P::delay(record.timing(), self.state.ramp()));
                    // the step error is the one reported
                    let _ = self.hal.unstep();
                    return Err(e.into());
                }
                pulses.insert(axis);
            }
        }

        Ok(pulses)
    }

    /// Second half of a tick: advance the ramp, detect completion, program
    /// the next tick and lower the step pins.
    ///
    /// A move completes on the first tick that emits no pulse once every axis
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// A hardware error from the pins. The timer is programmed and the step
    /// pins are lowered before any error is returned.
    pub fn finish_tick(&mut self, pulses: Pulses) -> Result<TickOutcome> {
        let Some(record) = self.live else {
            return Ok(TickOutcome::Idle);
        };

        if self.interruptible {
            self.hal.open_preemption_window();
        }

        P::advance(record.timing(), self.state.ramp_mut());

        let completed = pulses.is_empty() && self.state.is_exhausted();
        let completion = if completed {
            self.complete(&record)
        } else {
            Ok(())
        };

        if self.interruptible {
            self.hal.close_preemption_window();
        }

        self.hal.set_timer(P::delay(record.timing(), self.state.ramp()));
        let lowered = self.hal.unstep();
        completion?;
        lowered?;

        Ok(if completed {
            TickOutcome::Completed
        } else {
            TickOutcome::Running
        })
    }

    /// One full step interrupt.
    ///
    /// # Errors
    ///
    /// A hardware error from the pins.
    pub fn step(&mut self) -> Result<TickOutcome> {
        let pulses = self.emit_pulses()?;
        self.finish_tick(pulses)
    }

    fn complete(&mut self, record: &MoveRecord<P>) -> Result<()> {
        self.live = None;

        let mut endpoint = record.endpoint();
        if !self.e_absolute {
            endpoint.e = 0;
        }
        self.position.store(endpoint);

        if self.dc_extruder {
            self.hal.set_extruder_aux(false)?;
        }
        self.hal.set_enabled(Axis::Z, false)?;

        debug!("move complete");
        Ok(())
    }
}
