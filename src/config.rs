//! Optional TOML configuration for logsieve.
//!
//! Every key has a default, so an absent file and an empty file behave the
//! same. Command-line flags take precedence over values read here.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use logsieve_logs::{ErrorPolicy, LogLevel};
use logsieve_types::FilterParamError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {path}\n\n{source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid level in configuration: {0}")]
    Level(#[from] FilterParamError),
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Abort on the first malformed line instead of skipping it
    #[serde(default)]
    pub strict: bool,

    /// Level filter used when none is given on the command line
    #[serde(default)]
    pub levels: Vec<String>,

    /// Default tracing directive when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String { "warn".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            levels: Vec::new(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load from `path`, or return defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Configured levels, validated against the known set
    pub fn level_set(&self) -> Result<HashSet<LogLevel>, ConfigError> {
        let levels = self
            .levels
            .iter()
            .map(|level| level.parse::<LogLevel>())
            .collect::<Result<_, _>>()?;
        Ok(levels)
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        if self.strict {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Skip
        }
    }
}
