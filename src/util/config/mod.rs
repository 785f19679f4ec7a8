//! complect configuration
//!
//! Runtime limits for a [`Registry`](crate::registry::Registry).
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. Environment variables (COMPLECT_MAX_DEPTH)
//! 2. RON file or string
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use complect::util::config::Config;
//!
//! let config = Config::from_ron_str("(max_depth: 128)").unwrap();
//! assert_eq!(config.max_depth, 128);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding [`Config::max_depth`]
pub const MAX_DEPTH_ENV: &str = "COMPLECT_MAX_DEPTH";

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum nesting of trait dispatch within one outermost call
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Fresh constructions between automatic sweeps of the canonical store
    /// (0 disables automatic sweeps)
    #[serde(default = "default_purge_interval")]
    pub purge_interval: usize,
}

fn default_max_depth() -> usize {
    1 << 16
}

fn default_purge_interval() -> usize {
    4096
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            purge_interval: default_purge_interval(),
        }
    }
}

impl Config {
    /// Parse a RON document; missing fields take their defaults
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(ConfigError::ParseError)
    }

    /// Load a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_ron_str(&content)
    }

    /// Render as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::SerializeError)
    }

    /// Apply environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::var(MAX_DEPTH_ENV).ok().as_deref())
    }

    fn with_overrides(
        mut self,
        max_depth: Option<&str>,
    ) -> Self {
        if let Some(depth) = max_depth.and_then(|s| s.trim().parse().ok()) {
            self.max_depth = depth;
        }
        self
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
