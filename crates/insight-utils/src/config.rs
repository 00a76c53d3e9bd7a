//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable selecting the environment name
pub const ENV_ENVIRONMENT: &str = "INSIGHT_ENV";

/// Environment variable overriding the data directory
pub const ENV_DATA_DIR: &str = "INSIGHT_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Directory holding persisted user state (settings)
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "symbol-insight".to_string(),
            environment: "development".to_string(),
            data_dir: PathBuf::from(".insight"),
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// The data directory resolves in order: `INSIGHT_DATA_DIR`,
    /// `$HOME/.config/insight`, `%USERPROFILE%/.config/insight`, `./.insight`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let environment = lookup(ENV_ENVIRONMENT)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.environment);

        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                lookup("HOME")
                    .or_else(|| lookup("USERPROFILE"))
                    .map(|home| PathBuf::from(home).join(".config").join("insight"))
            })
            .unwrap_or(defaults.data_dir);

        Self {
            app_name: defaults.app_name,
            environment,
            data_dir,
        }
    }

    /// Override the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}
