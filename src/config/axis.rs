//! Per-axis drive train configuration from TOML.

use serde::Deserialize;

use super::units::{Microsteps, MmPerRev, RevPerSec};

/// Drive train of one axis: motor, driver and mechanics.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Full steps per motor revolution (typically 200 for 1.8° motors).
    pub steps_per_revolution: u16,

    /// Driver microstep setting.
    pub microsteps: Microsteps,

    /// Linear travel per motor revolution (belt pitch × pulley teeth, screw lead, ...).
    pub mm_per_revolution: MmPerRev,

    /// Maximum obtainable motor speed.
    #[serde(rename = "max_revolutions_per_sec")]
    pub max_speed: RevPerSec,

    /// Fraction of the maximum feed used for slow search moves.
    #[serde(default = "default_search_fraction")]
    pub search_feed_fraction: f32,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Enable pin is active-low (A4988/DRV8825 style).
    #[serde(default = "default_invert_enable")]
    pub invert_enable: bool,
}

fn default_search_fraction() -> f32 {
    0.1
}

fn default_invert_enable() -> bool {
    true
}

impl AxisConfig {
    /// Microsteps per motor revolution.
    pub fn microsteps_per_revolution(&self) -> u32 {
        self.steps_per_revolution as u32 * self.microsteps.value() as u32
    }

    /// Steps per millimetre of travel.
    pub fn steps_per_mm(&self) -> f32 {
        self.microsteps_per_revolution() as f32 / self.mm_per_revolution.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_per_mm() {
        let config = AxisConfig {
            steps_per_revolution: 200,
            microsteps: Microsteps::EIGHTH,
            mm_per_revolution: MmPerRev(32.0),
            max_speed: RevPerSec(3.5),
            search_feed_fraction: 0.1,
            invert_direction: false,
            invert_enable: true,
        };

        // 200 * 8 / 32 mm = 50 steps/mm
        assert_eq!(config.microsteps_per_revolution(), 1600);
        assert!((config.steps_per_mm() - 50.0).abs() < 1e-6);
    }
}
