//! Loading of simulation options from TOML files.

use std::path::Path;

use thiserror::Error;

use crate::sim::SimulationOptions;

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid option {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Load simulation options from a TOML file. Missing fields take their
/// defaults.
pub fn load_options<P: AsRef<Path>>(path: P) -> Result<SimulationOptions, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_options(&contents)
}

/// Parse and validate simulation options from TOML text.
pub fn parse_options(contents: &str) -> Result<SimulationOptions, ConfigError> {
    let options: SimulationOptions = toml::from_str(contents)?;
    validate(&options)?;
    Ok(options)
}

fn validate(options: &SimulationOptions) -> Result<(), ConfigError> {
    let positive = [
        ("time_step", options.time_step),
        ("max_time", options.max_time),
        ("max_angle_step", options.max_angle_step),
    ];
    for (field, value) in positive {
        if !(value > 0.0) {
            return Err(ConfigError::Invalid { field, reason: format!("must be positive, got {}", value) });
        }
    }
    if options.launch_rod_length < 0.0 {
        return Err(ConfigError::Invalid {
            field: "launch_rod_length",
            reason: "must not be negative".into(),
        });
    }
    if !(0.0..std::f64::consts::FRAC_PI_2).contains(&options.launch_rod_angle.abs()) {
        return Err(ConfigError::Invalid {
            field: "launch_rod_angle",
            reason: "must be below 90 degrees".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let opts = parse_options("").unwrap();
        let defaults = SimulationOptions::default();
        assert_eq!(opts.time_step, defaults.time_step);
        assert_eq!(opts.launch_rod_length, defaults.launch_rod_length);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let opts = parse_options("launch_rod_length = 2.5\nwind_speed = 4.0\n").unwrap();
        assert_eq!(opts.launch_rod_length, 2.5);
        assert_eq!(opts.wind_speed, 4.0);
        assert_eq!(opts.max_time, SimulationOptions::default().max_time);
    }

    #[test]
    fn negative_time_step_is_rejected() {
        let err = parse_options("time_step = -0.01").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "time_step", .. }));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(parse_options("time_step = ").unwrap_err(), ConfigError::Toml(_)));
    }
}
