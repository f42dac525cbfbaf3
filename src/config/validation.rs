//! Configuration validation.

use crate::dda::Axis;
use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, MachineConfig};

/// Validate a machine configuration.
///
/// Checks:
/// - Timer clock is at least 1 kHz (the planner works in ticks per millisecond)
/// - Acceleration is positive
/// - Every axis has a usable drive train whose step rate stays below the timer clock
/// - The extruder fold shift keeps the comparison inside 32 bits of headroom
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    if config.clock_hz < 1000 {
        return Err(Error::Config(ConfigError::InvalidClock(config.clock_hz)));
    }

    if config.acceleration.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.acceleration.0,
        )));
    }

    if config.extruder_fold_shift > 16 {
        return Err(Error::Config(ConfigError::InvalidExtruderFoldShift(
            config.extruder_fold_shift,
        )));
    }

    for axis in Axis::ALL {
        validate_axis(axis, config.axes.get(axis), config.clock_hz)?;
    }

    Ok(())
}

fn validate_axis(axis: Axis, config: &AxisConfig, clock_hz: u32) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(axis)));
    }

    if config.mm_per_revolution.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidFeedPerRevolution {
            axis,
            value: config.mm_per_revolution.0,
        }));
    }

    if config.max_speed.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed {
            axis,
            value: config.max_speed.0,
        }));
    }

    if config.search_feed_fraction <= 0.0 || config.search_feed_fraction > 1.0 {
        return Err(Error::Config(ConfigError::InvalidSearchFraction {
            axis,
            value: config.search_feed_fraction,
        }));
    }

    // At least one timer tick per step.
    let step_freq = libm::roundf(config.max_speed * config.microsteps_per_revolution() as f32);
    if step_freq < 1.0 || step_freq >= clock_hz as f32 {
        return Err(Error::Config(ConfigError::StepRateOutOfRange {
            axis,
            step_freq: step_freq as u32,
            clock_hz,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::machine::sample_config;
    use crate::config::units::{MmPerRev, MmPerSecSquared};

    #[test]
    fn test_sample_config_is_valid() {
        assert!(validate_config(&sample_config()).is_ok());
    }

    #[test]
    fn test_invalid_feed_per_revolution() {
        let mut config = sample_config();
        config.axes.y.mm_per_revolution = MmPerRev(-1.0);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidFeedPerRevolution { axis: Axis::Y, .. }))
        ));
    }

    #[test]
    fn test_zero_acceleration_rejected() {
        let mut config = sample_config();
        config.acceleration = MmPerSecSquared(0.0);

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidAcceleration(_)))
        ));
    }

    #[test]
    fn test_step_rate_above_clock_rejected() {
        let mut config = sample_config();
        // 1600 microsteps/rev at 3.5 rev/s = 5600 steps/s > 1 kHz timer
        config.clock_hz = 1_000;

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::StepRateOutOfRange { axis: Axis::X, .. }))
        ));
    }

    #[test]
    fn test_fold_shift_limit() {
        let mut config = sample_config();
        config.extruder_fold_shift = 17;

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidExtruderFoldShift(17)))
        ));
    }
}
