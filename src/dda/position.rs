//! Machine positions in steps.
//!
//! [`Position`] is the plain value type exchanged with the planner and the
//! host side. [`PositionCell`] publishes the live position estimate so that
//! foreground readers never need a reference to the stepper itself.

use core::fmt;
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// One of the four machine axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// X carriage.
    X,
    /// Y carriage.
    Y,
    /// Z lead screw.
    Z,
    /// Extruder.
    E,
}

impl Axis {
    /// All axes in Bresenham accumulator order.
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::E];

    /// Index into per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-letter axis name.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::E => 'E',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Direction of travel along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Towards larger step counts (also used for zero travel).
    #[default]
    Positive,
    /// Towards smaller step counts.
    Negative,
}

impl Direction {
    /// Direction of travel from `from` to `to`.
    #[inline]
    pub fn between(from: i32, to: i32) -> Self {
        if to >= from {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    /// Whether this is the positive direction.
    #[inline]
    pub fn is_positive(self) -> bool {
        self == Direction::Positive
    }
}

/// A machine position: four absolute step counts plus the requested feed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// X position in steps.
    pub x: i32,
    /// Y position in steps.
    pub y: i32,
    /// Z position in steps.
    pub z: i32,
    /// Extruder position in steps.
    pub e: i32,
    /// Requested feed rate in mm/min.
    pub f: u32,
}

impl Position {
    /// Create a position from step counts and a feed rate.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32, e: i32, f: u32) -> Self {
        Self { x, y, z, e, f }
    }

    /// The origin at a given feed rate.
    #[inline]
    pub const fn origin(f: u32) -> Self {
        Self::new(0, 0, 0, 0, f)
    }

    /// Step count on one axis.
    #[inline]
    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::E => self.e,
        }
    }

    /// Set the step count on one axis.
    #[inline]
    pub fn set_axis(&mut self, axis: Axis, steps: i32) {
        match axis {
            Axis::X => self.x = steps,
            Axis::Y => self.y = steps,
            Axis::Z => self.z = steps,
            Axis::E => self.e = steps,
        }
    }

    /// Same position with a different feed rate.
    #[inline]
    pub fn with_feed(mut self, f: u32) -> Self {
        self.f = f;
        self
    }
}

/// Live position estimate shared between the stepper and its readers.
///
/// Every field is an independent atomic. Only crate code writes it (the step
/// generator on completion, the position tracker on refresh), anyone may
/// [`load`](Self::load) it. A load racing a store can mix fields from two
/// updates; each field is still whole, so the error is bounded by the
/// progress of one refresh and disappears at the next one.
#[derive(Debug, Default)]
pub struct PositionCell {
    x: AtomicI32,
    y: AtomicI32,
    z: AtomicI32,
    e: AtomicI32,
    f: AtomicU32,
}

impl PositionCell {
    /// Create a cell holding `position`.
    pub const fn new(position: Position) -> Self {
        Self {
            x: AtomicI32::new(position.x),
            y: AtomicI32::new(position.y),
            z: AtomicI32::new(position.z),
            e: AtomicI32::new(position.e),
            f: AtomicU32::new(position.f),
        }
    }

    /// Read the current estimate.
    pub fn load(&self) -> Position {
        Position {
            x: self.x.load(Ordering::Relaxed),
            y: self.y.load(Ordering::Relaxed),
            z: self.z.load(Ordering::Relaxed),
            e: self.e.load(Ordering::Relaxed),
            f: self.f.load(Ordering::Relaxed),
        }
    }

    /// Read the feed rate only.
    pub fn feed(&self) -> u32 {
        self.f.load(Ordering::Relaxed)
    }

    pub(crate) fn store(&self, position: Position) {
        for axis in Axis::ALL {
            self.store_axis(axis, position.axis(axis));
        }
        self.store_feed(position.f);
    }

    pub(crate) fn store_axis(&self, axis: Axis, steps: i32) {
        let slot = match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::E => &self.e,
        };
        slot.store(steps, Ordering::Relaxed);
    }

    pub(crate) fn store_feed(&self, f: u32) {
        self.f.store(f, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_between() {
        assert_eq!(Direction::between(0, 10), Direction::Positive);
        assert_eq!(Direction::between(10, 0), Direction::Negative);
        // zero travel counts as positive
        assert_eq!(Direction::between(5, 5), Direction::Positive);
    }

    #[test]
    fn test_axis_accessors() {
        let mut pos = Position::new(1, 2, 3, 4, 1500);
        assert_eq!(pos.axis(Axis::Z), 3);
        pos.set_axis(Axis::E, -7);
        assert_eq!(pos.e, -7);
        assert_eq!(pos.with_feed(300).f, 300);
    }

    #[test]
    fn test_position_cell_roundtrip() {
        let cell = PositionCell::new(Position::origin(600));
        cell.store_axis(Axis::Y, 42);
        cell.store_feed(1200);
        assert_eq!(cell.load(), Position::new(0, 42, 0, 0, 1200));
    }
}
