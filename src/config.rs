//! Control server configuration, loaded from TOML.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! max_connections = 100
//!
//! [limits]
//! min_philosophers = 2
//! max_philosophers = 100
//! default_philosophers = 5
//! min_duration_secs = 60
//! max_duration_secs = 1200
//! default_duration_secs = 60
//!
//! [timing]
//! think_base_ms = 500
//! think_step_ms = 100
//! eat_base_ms = 800
//! eat_step_ms = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::simulation::CycleTiming;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "dining.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Accepted ranges and defaults for `/start` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_philosophers: usize,
    pub max_philosophers: usize,
    pub default_philosophers: usize,
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
    pub default_duration_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_philosophers: 2,
            max_philosophers: 100,
            default_philosophers: 5,
            min_duration_secs: 60,
            max_duration_secs: 1200,
            default_duration_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Concurrent connection handlers; further connections are closed.
    pub max_connections: usize,
    pub limits: Limits,
    pub timing: CycleTiming,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 100,
            limits: Limits::default(),
            timing: CycleTiming::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// First existing file of `./dining.toml` and the per-user config file,
    /// or the defaults when neither exists.
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("dining").join("config.toml"));
        }
        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if l.min_philosophers < 2 {
            return Err(invalid(format!(
                "min_philosophers must be at least 2, got {}",
                l.min_philosophers
            )));
        }
        if l.min_philosophers > l.max_philosophers {
            return Err(invalid(format!(
                "min_philosophers ({}) exceeds max_philosophers ({})",
                l.min_philosophers, l.max_philosophers
            )));
        }
        if !(l.min_philosophers..=l.max_philosophers).contains(&l.default_philosophers) {
            return Err(invalid(format!(
                "default_philosophers ({}) is outside {}..={}",
                l.default_philosophers, l.min_philosophers, l.max_philosophers
            )));
        }
        if l.min_duration_secs == 0 {
            return Err(invalid("min_duration_secs must be greater than zero".to_string()));
        }
        if l.min_duration_secs > l.max_duration_secs {
            return Err(invalid(format!(
                "min_duration_secs ({}) exceeds max_duration_secs ({})",
                l.min_duration_secs, l.max_duration_secs
            )));
        }
        if !(l.min_duration_secs..=l.max_duration_secs).contains(&l.default_duration_secs) {
            return Err(invalid(format!(
                "default_duration_secs ({}) is outside {}..={}",
                l.default_duration_secs, l.min_duration_secs, l.max_duration_secs
            )));
        }
        if self.max_connections == 0 {
            return Err(invalid("max_connections must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// `host:port` suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}
