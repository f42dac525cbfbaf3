//! [`StepperHal`] over embedded-hal output pins.
//!
//! Every axis has STEP, DIR and EN pins of one pin type; use the HAL's
//! type-erased pin if the board mixes ports.

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::MachineConstants;
use crate::dda::{Axis, Direction};
use crate::error::{ConfigError, Error, HalError, Result};

use super::StepperHal;

/// One-shot step timer.
pub trait StepTimer {
    /// Fire the step interrupt `ticks` timer clock cycles from now.
    fn schedule(&mut self, ticks: u32);
}

struct AxisPins<PIN> {
    step: PIN,
    dir: PIN,
    enable: PIN,
    invert_direction: bool,
    invert_enable: bool,
    /// Last level written to DIR (cached to avoid unnecessary pin writes).
    direction: Option<Direction>,
}

/// Pin-level hardware layer.
pub struct GpioHal<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    axes: [AxisPins<PIN>; 4],
    power: Option<PIN>,
    aux: Option<PIN>,
    timer: T,
    /// Bit per axis whose STEP pin is high.
    raised: u8,
}

impl<PIN, T> GpioHal<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    /// Start building a GPIO hardware layer.
    pub fn builder() -> GpioHalBuilder<PIN, T> {
        GpioHalBuilder::new()
    }

    /// The step timer.
    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Direction last written to an axis, if any.
    #[inline]
    pub fn direction(&self, axis: Axis) -> Option<Direction> {
        self.axes[axis.index()].direction
    }
}

impl<PIN, T> StepperHal for GpioHal<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    fn power_on(&mut self) -> core::result::Result<(), HalError> {
        match self.power.as_mut() {
            Some(pin) => pin.set_high().map_err(|_| HalError::Power),
            None => Ok(()),
        }
    }

    fn set_enabled(&mut self, axis: Axis, enabled: bool) -> core::result::Result<(), HalError> {
        let pins = &mut self.axes[axis.index()];
        let level = enabled != pins.invert_enable;
        pins.enable.set_state(PinState::from(level)).map_err(|_| HalError::Pin(axis))
    }

    fn set_direction(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> core::result::Result<(), HalError> {
        let pins = &mut self.axes[axis.index()];
        if pins.direction == Some(direction) {
            return Ok(());
        }

        let level = direction.is_positive() != pins.invert_direction;
        pins.dir
            .set_state(PinState::from(level))
            .map_err(|_| HalError::Pin(axis))?;
        pins.direction = Some(direction);
        Ok(())
    }

    fn step(&mut self, axis: Axis) -> core::result::Result<(), HalError> {
        self.axes[axis.index()]
            .step
            .set_high()
            .map_err(|_| HalError::Pin(axis))?;
        self.raised |= 1 << axis.index();
        Ok(())
    }

    fn unstep(&mut self) -> core::result::Result<(), HalError> {
        for axis in Axis::ALL {
            let bit = 1 << axis.index();
            if self.raised & bit != 0 {
                self.axes[axis.index()]
                    .step
                    .set_low()
                    .map_err(|_| HalError::Pin(axis))?;
                self.raised &= !bit;
            }
        }
        Ok(())
    }

    fn set_timer(&mut self, ticks: u32) {
        self.timer.schedule(ticks);
    }

    fn set_extruder_aux(&mut self, on: bool) -> core::result::Result<(), HalError> {
        match self.aux.as_mut() {
            Some(pin) => pin
                .set_state(PinState::from(on))
                .map_err(|_| HalError::AuxOutput),
            None => Ok(()),
        }
    }
}

/// Builder for [`GpioHal`].
pub struct GpioHalBuilder<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    pins: [Option<(PIN, PIN, PIN)>; 4],
    invert_direction: [bool; 4],
    invert_enable: [bool; 4],
    power: Option<PIN>,
    aux: Option<PIN>,
    timer: Option<T>,
}

impl<PIN, T> Default for GpioHalBuilder<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<PIN, T> GpioHalBuilder<PIN, T>
where
    PIN: OutputPin,
    T: StepTimer,
{
    /// Create a new builder. Enable pins default to active-low.
    pub fn new() -> Self {
        Self {
            pins: [None, None, None, None],
            invert_direction: [false; 4],
            invert_enable: [true; 4],
            power: None,
            aux: None,
            timer: None,
        }
    }

    /// Set the STEP, DIR and EN pins of an axis.
    pub fn axis(mut self, axis: Axis, step: PIN, dir: PIN, enable: PIN) -> Self {
        self.pins[axis.index()] = Some((step, dir, enable));
        self
    }

    /// Set direction inversion of an axis.
    pub fn invert_direction(mut self, axis: Axis, invert: bool) -> Self {
        self.invert_direction[axis.index()] = invert;
        self
    }

    /// Set whether an axis' enable pin is active-low.
    pub fn invert_enable(mut self, axis: Axis, invert: bool) -> Self {
        self.invert_enable[axis.index()] = invert;
        self
    }

    /// Take pin polarities from the machine constants.
    pub fn from_constants(mut self, constants: &MachineConstants) -> Self {
        for axis in Axis::ALL {
            let axis_constants = constants.axis(axis);
            self.invert_direction[axis.index()] = axis_constants.invert_direction;
            self.invert_enable[axis.index()] = axis_constants.invert_enable;
        }
        self
    }

    /// Set the power supply switch (driven high on [`StepperHal::power_on`]).
    pub fn power_pin(mut self, pin: PIN) -> Self {
        self.power = Some(pin);
        self
    }

    /// Set the DC extruder output.
    pub fn aux_pin(mut self, pin: PIN) -> Self {
        self.aux = Some(pin);
        self
    }

    /// Set the step timer.
    pub fn timer(mut self, timer: T) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Build the hardware layer.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis has no pins or the timer is missing.
    pub fn build(self) -> Result<GpioHal<PIN, T>> {
        let timer = self
            .timer
            .ok_or(Error::Config(ConfigError::MissingHardware("step timer")))?;

        let invert_direction = self.invert_direction;
        let invert_enable = self.invert_enable;
        let [x, y, z, e] = self.pins;

        let pins_for = |axis: Axis, pins: Option<(PIN, PIN, PIN)>| -> Result<AxisPins<PIN>> {
            let (step, dir, enable) = pins.ok_or(Error::Config(ConfigError::MissingHardware(
                match axis {
                    Axis::X => "X axis pins",
                    Axis::Y => "Y axis pins",
                    Axis::Z => "Z axis pins",
                    Axis::E => "E axis pins",
                },
            )))?;
            Ok(AxisPins {
                step,
                dir,
                enable,
                invert_direction: invert_direction[axis.index()],
                invert_enable: invert_enable[axis.index()],
                direction: None,
            })
        };

        Ok(GpioHal {
            axes: [
                pins_for(Axis::X, x)?,
                pins_for(Axis::Y, y)?,
                pins_for(Axis::Z, z)?,
                pins_for(Axis::E, e)?,
            ],
            power: self.power,
            aux: self.aux,
            timer,
            raised: 0,
        })
    }
}
