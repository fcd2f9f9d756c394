//! Run configuration for the simulator.
//!
//! Loaded from YAML; every field is optional and falls back to the defaults below.
//!
//! ```yaml
//! options:
//!   position: true
//!   values: up-other
//!   hidden-visible: false
//!   grid: { width: 200, height: 200 }
//! run:
//!   trials: 1000
//!   max_rerolls: 100
//!   seed: 7
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::ValueScheme;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown value scheme {0:?} (expected up-other|up-side-down|up-4-down|up-360-down)")]
    UnknownScheme(String),
    #[error("unknown option {0:?} (expected position|values|hidden-visible)")]
    UnknownOption(String),
    #[error("invalid value {value:?} for option {key}")]
    BadOptionValue { key: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// What the strategy gets to observe.
    #[serde(default)]
    pub options: SimOptions,
    /// Trial counts and seeding.
    #[serde(default)]
    pub run: RunConfig,
}

/// Observability options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SimOptions {
    /// Report a table position for every face.
    #[serde(default = "default_position")]
    pub position: bool,
    /// Observability scheme for face directions.
    #[serde(default)]
    pub values: ValueScheme,
    /// Mask the values of downward faces and hand observations over unordered.
    #[serde(default, rename = "hidden-visible")]
    pub hidden_visible: bool,
    /// Bounds of the position grid.
    #[serde(default)]
    pub grid: PositionGrid,
}

fn default_position() -> bool {
    true
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            position: default_position(),
            values: ValueScheme::default(),
            hidden_visible: false,
            grid: PositionGrid::default(),
        }
    }
}

impl SimOptions {
    /// Set one option by its key, parsing `value` from text.
    ///
    /// Recognized keys: `position`, `values`, `hidden-visible`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "position" => self.position = parse_bool("position", value)?,
            "values" => self.values = value.parse()?,
            "hidden-visible" => self.hidden_visible = parse_bool("hidden-visible", value)?,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Build options from key/value pairs, starting from the defaults.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = Self::default();
        for (k, v) in pairs {
            out.set(k, v)?;
        }
        Ok(out)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.position && (self.grid.width == 0 || self.grid.height == 0) {
            return Err(ConfigError::Invalid("options.grid dimensions must be > 0"));
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::BadOptionValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Inclusive integer grid `[0, width] x [0, height]` for face positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PositionGrid {
    #[serde(default = "default_grid_extent")]
    pub width: u32,
    #[serde(default = "default_grid_extent")]
    pub height: u32,
}

fn default_grid_extent() -> u32 {
    200
}

impl Default for PositionGrid {
    fn default() -> Self {
        Self {
            width: default_grid_extent(),
            height: default_grid_extent(),
        }
    }
}

/// Trial counts and seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of independent trials.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Attempts per trial before giving up.
    #[serde(default = "default_max_rerolls")]
    pub max_rerolls: u32,
    /// RNG seed. If None, a seed is drawn from OS entropy and reported with the result.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_trials() -> u32 {
    1000
}

fn default_max_rerolls() -> u32 {
    100
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            max_rerolls: default_max_rerolls(),
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.options.validate()?;
        validate_max_rerolls(self.run.max_rerolls)
    }
}

pub fn validate_max_rerolls(max_rerolls: u32) -> Result<(), ConfigError> {
    if max_rerolls == 0 {
        return Err(ConfigError::Invalid("run.max_rerolls must be > 0"));
    }
    Ok(())
}
