//! Configuration for the pushdown planner.
//!
//! Settings are read from a TOML file with two tables:
//!
//! ```toml
//! [planner]
//! max_plan_depth = 64
//!
//! [logging]
//! filter = "shard_pushdown=info"
//! format = "text"   # or "json"
//! ```
//!
//! Missing keys fall back to their defaults. Numeric settings are validated
//! against the same kind of min/max bounds a server setting registry applies.
//! `SHARD_PUSHDOWN_MAX_PLAN_DEPTH` overrides `planner.max_plan_depth`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`PlannerConfig::max_plan_depth`].
pub const ENV_MAX_PLAN_DEPTH: &str = "SHARD_PUSHDOWN_MAX_PLAN_DEPTH";

/// Lower bound for `planner.max_plan_depth`.
pub const MIN_PLAN_DEPTH: usize = 1;
/// Upper bound for `planner.max_plan_depth`.
///
/// Both passes recurse once per plan level and move the subtree by value at
/// each step, so the bound must keep an unoptimised build inside a 2 MiB
/// thread stack. It also matches the explain tool's input limit: serde_json
/// refuses documents nested deeper than 128 levels, and every plan level adds
/// one, so a serialized plan cannot get much deeper than this anyway.
pub const MAX_PLAN_DEPTH: usize = 128;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub planner: PlannerConfig,
    pub logging: LoggingConfig,
}

/// Knobs consumed by [`crate::pushdown::PushdownContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Deepest plan tree either pass will descend into before failing
    /// with an internal error.
    pub max_plan_depth: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_plan_depth: 64 }
    }
}

/// Output format of the log subscriber installed by the explain tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings; only the binary installs a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "shard_pushdown=info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_PLAN_DEPTH) {
            let depth = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidChoice {
                    name: ENV_MAX_PLAN_DEPTH,
                    value: raw.clone(),
                })?;
            self.planner.max_plan_depth = depth;
        }
        self.validate()
    }

    /// Check every numeric setting against its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let depth = self.planner.max_plan_depth;
        if !(MIN_PLAN_DEPTH..=MAX_PLAN_DEPTH).contains(&depth) {
            return Err(ConfigError::OutOfRange {
                name: "planner.max_plan_depth",
                value: i64::try_from(depth).unwrap_or(i64::MAX),
                min: MIN_PLAN_DEPTH as i64,
                max: MAX_PLAN_DEPTH as i64,
            });
        }
        Ok(())
    }
}
