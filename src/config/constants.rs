//! Integer constants derived from the machine configuration.
//!
//! Computed once at start-up; the planner and the step generator only ever
//! see these, never the floating point configuration.

use core::fmt;

use libm::roundf;

use crate::dda::Axis;

use super::machine::{MachineConfig, ProfileKind};

/// Derived parameters of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConstants {
    /// Steps per millimetre of travel.
    pub steps_per_mm: f32,

    /// Micrometres per step in Q16.16 fixed point.
    pub um_per_step_q16: u32,

    /// Maximum step frequency in steps/s.
    pub max_step_freq: u32,

    /// Maximum feed rate in mm/min.
    pub max_feedrate: u32,

    /// Fewest timer ticks allowed between two steps.
    pub min_clocks_per_step: u32,

    /// Feed rate for slow search moves in mm/min.
    pub search_feedrate: u32,

    /// Direction pin logic is inverted.
    pub invert_direction: bool,

    /// Enable pin is active-low.
    pub invert_enable: bool,
}

impl AxisConstants {
    /// Convert a step count to micrometres of travel.
    ///
    /// The product is taken in 64 bits; the result saturates at `u32::MAX`
    /// (4.29 km), far beyond any printable move.
    #[inline]
    pub fn steps_to_um(&self, steps: u32) -> u32 {
        let um = (steps as u64 * self.um_per_step_q16 as u64) >> 16;
        um.min(u32::MAX as u64) as u32
    }
}

/// Everything the DDA needs to know about the machine, in integers.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineConstants {
    /// Step timer clock in Hz.
    pub clock_hz: u32,

    /// Timer ticks per millisecond.
    pub time_scaling: u32,

    /// `1000 × acceleration`: acceleration in µm/s², feeds the first step period.
    pub c0_accel: u32,

    /// `(2000 × acceleration) >> 6`: pre-scaled divisor of the ramp length.
    pub ramp_accel: u32,

    /// Extruder coordinates are absolute.
    pub e_absolute: bool,

    /// Step interrupt may be preempted after emitting pulses.
    pub step_interrupt_interruptible: bool,

    /// Shift applied to extruder travel before comparing it with the XYZ distance.
    pub extruder_fold_shift: u8,

    /// Extruder is a DC motor on the auxiliary output.
    pub dc_extruder: bool,

    /// Feed rate the machine starts with, in mm/min.
    pub initial_feedrate: u32,

    /// Velocity profile selected in the configuration.
    pub profile: ProfileKind,

    axes: [AxisConstants; 4],
}

impl MachineConstants {
    /// Compute constants from a validated configuration.
    pub fn from_config(config: &MachineConfig) -> Self {
        let axes = Axis::ALL.map(|axis| {
            let axis_config = config.axes.get(axis);
            let steps_per_mm = axis_config.steps_per_mm();
            let microsteps = axis_config.microsteps_per_revolution() as f32;
            let max_step_freq = roundf(axis_config.max_speed * microsteps) as u32;
            let max_feedrate = (max_step_freq as f32 * 60.0 / steps_per_mm) as u32;

            AxisConstants {
                steps_per_mm,
                um_per_step_q16: roundf(1000.0 * 65536.0 / steps_per_mm) as u32,
                max_step_freq,
                max_feedrate,
                min_clocks_per_step: config.clock_hz / max_step_freq.max(1),
                search_feedrate: (max_feedrate as f32 * axis_config.search_feed_fraction) as u32,
                invert_direction: axis_config.invert_direction,
                invert_enable: axis_config.invert_enable,
            }
        });

        let acceleration = config.acceleration.value();

        Self {
            clock_hz: config.clock_hz,
            time_scaling: config.clock_hz / 1000,
            c0_accel: roundf(1000.0 * acceleration) as u32,
            ramp_accel: ((2000.0 * acceleration) as u32) >> 6,
            e_absolute: config.e_absolute,
            step_interrupt_interruptible: config.step_interrupt_interruptible,
            extruder_fold_shift: config.extruder_fold_shift,
            dc_extruder: config.dc_extruder,
            initial_feedrate: axes[Axis::Z.index()].search_feedrate.max(1),
            profile: config.profile,
            axes,
        }
    }

    /// Constants of one axis.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisConstants {
        &self.axes[axis.index()]
    }

    fn write_row(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        unit: &str,
        value: impl Fn(&AxisConstants) -> u32,
    ) -> fmt::Result {
        write!(f, "{:<22}", name)?;
        for axis in Axis::ALL {
            write!(f, "{:>12}", value(self.axis(axis)))?;
        }
        writeln!(f, "  {}", unit)
    }
}

impl fmt::Display for MachineConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<22}{:>12}{:>12}{:>12}{:>12}  units",
            "", "X-axis", "Y-axis", "Z-axis", "E-axis"
        )?;

        write!(f, "{:<22}", "steps per mm")?;
        for axis in Axis::ALL {
            write!(f, "{:>12.3}", self.axis(axis).steps_per_mm)?;
        }
        writeln!(f, "  [steps/mm]")?;

        write!(f, "{:<22}", "um per step")?;
        for axis in Axis::ALL {
            write!(f, "{:>12.3}", self.axis(axis).um_per_step_q16 as f32 / 65536.0)?;
        }
        writeln!(f, "  [um/step]")?;

        self.write_row(f, "max step frequency", "[steps/sec]", |a| a.max_step_freq)?;
        self.write_row(f, "max feedrate", "[mm/min]", |a| a.max_feedrate)?;
        self.write_row(f, "search feedrate", "[mm/min]", |a| a.search_feedrate)?;
        self.write_row(f, "min clocks per step", "[clocks/step]", |a| a.min_clocks_per_step)?;

        writeln!(f, "{:<22}{:>12}  [Hz]", "timer clock", self.clock_hz)?;
        writeln!(f, "{:<22}{:>12}  [um/s^2]", "acceleration", self.c0_accel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::machine::sample_config as make_test_config;

    #[test]
    fn test_axis_derivation() {
        let constants = MachineConstants::from_config(&make_test_config());
        let x = constants.axis(Axis::X);

        assert!((x.steps_per_mm - 50.0).abs() < 1e-6);
        assert_eq!(x.um_per_step_q16, 20 << 16);
        assert_eq!(x.max_step_freq, 5600);
        assert_eq!(x.max_feedrate, 6720);
        // 16 MHz / 5600 steps/s
        assert_eq!(x.min_clocks_per_step, 2857);
        assert_eq!(x.search_feedrate, 672);

        let z = constants.axis(Axis::Z);
        assert_eq!(z.max_step_freq, 6400);
        assert_eq!(z.max_feedrate, 300);
        assert_eq!(z.min_clocks_per_step, 2500);
    }

    #[test]
    fn test_machine_derivation() {
        let constants = MachineConstants::from_config(&make_test_config());

        assert_eq!(constants.time_scaling, 16_000);
        assert_eq!(constants.c0_accel, 400_000);
        assert_eq!(constants.ramp_accel, 12_500);
        // Z search feed: 300 mm/min * 0.25
        assert_eq!(constants.initial_feedrate, 75);
    }

    #[test]
    fn test_steps_to_um() {
        let constants = MachineConstants::from_config(&make_test_config());

        assert_eq!(constants.axis(Axis::X).steps_to_um(1000), 20_000);
        // 1280 steps/mm: 0.78125 um per step
        assert_eq!(constants.axis(Axis::Z).steps_to_um(1280), 1000);
        assert_eq!(constants.axis(Axis::E).steps_to_um(0), 0);
    }
}
