//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::MachineConfig;

/// Load a machine configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_dda::load_config;
///
/// let config = load_config("machine.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MachineConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse a machine configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<MachineConfig> {
    let config: MachineConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileKind;

    const AXES: &str = r#"
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

    #[test]
    fn test_parse_defaults() {
        let config = parse_config(AXES).unwrap();

        assert_eq!(config.clock_hz, 16_000_000);
        assert_eq!(config.profile, ProfileKind::Ramping);
        assert!(!config.e_absolute);
        assert!(config.step_interrupt_interruptible);
        assert_eq!(config.extruder_fold_shift, 3);
        assert!(config.axes.x.invert_enable);
        assert!((config.axes.z.search_feed_fraction - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_parse_machine_section() {
        let toml = format!(
            r#"
clock_hz = 20000000
acceleration = 1000.0
profile = "taper"
e_absolute = true
dc_extruder = true
{}"#,
            AXES
        );

        let config = parse_config(&toml).unwrap();
        assert_eq!(config.clock_hz, 20_000_000);
        assert_eq!(config.profile, ProfileKind::Taper);
        assert!(config.e_absolute);
        assert!(config.dc_extruder);
    }

    #[test]
    fn test_parse_rejects_bad_microsteps() {
        let toml = AXES.replacen("microsteps = 8", "microsteps = 12", 1);

        assert!(matches!(
            parse_config(&toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_parse_runs_validation() {
        let toml = format!("acceleration = 0.0\n{}", AXES);

        assert!(matches!(
            parse_config(&toml),
            Err(Error::Config(ConfigError::InvalidAcceleration(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/machine.toml"),
            Err(Error::Config(ConfigError::IoError(_)))
        ));
    }
}
