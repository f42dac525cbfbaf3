//! Hardware abstraction.
//!
//! The DDA core drives the machine exclusively through [`StepperHal`]. A
//! ready-made implementation over embedded-hal output pins lives in
//! [`gpio`]; boards with port-level I/O or different timer hardware implement
//! the trait themselves.

pub mod gpio;

pub use gpio::{GpioHal, GpioHalBuilder, StepTimer};

use crate::dda::{Axis, Direction};
use crate::error::HalError;

/// Outputs the step generator needs.
///
/// Calls arrive from interrupt context and must not block.
pub trait StepperHal {
    /// Switch on the stepper power supply ahead of a move.
    fn power_on(&mut self) -> Result<(), HalError>;

    /// Enable or disable an axis driver.
    fn set_enabled(&mut self, axis: Axis, enabled: bool) -> Result<(), HalError>;

    /// Set the direction output of an axis.
    fn set_direction(&mut self, axis: Axis, direction: Direction) -> Result<(), HalError>;

    /// Raise the step output of an axis.
    fn step(&mut self, axis: Axis) -> Result<(), HalError>;

    /// Lower every step output raised since the last call.
    fn unstep(&mut self) -> Result<(), HalError>;

    /// Program the step timer to fire `ticks` clock cycles from now.
    fn set_timer(&mut self, ticks: u32);

    /// Drive the auxiliary output of a DC extruder motor.
    fn set_extruder_aux(&mut self, _on: bool) -> Result<(), HalError> {
        Ok(())
    }

    /// Let other interrupts preempt the step interrupt. The step timer itself
    /// must stay masked until [`close_preemption_window`](Self::close_preemption_window).
    fn open_preemption_window(&mut self) {}

    /// Mask interrupts again before the step timer is reprogrammed.
    fn close_preemption_window(&mut self) {}
}
