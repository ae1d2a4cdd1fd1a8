//! Configuration loading for Eventual hosts.
//!
//! The config file lives at `~/.eventual/config.toml` unless `EVENTUAL_CONFIG`
//! points elsewhere. Every section is optional; absent values fall back to
//! defaults.
//!
//! ```toml
//! [rejections]
//! policy = "collect"
//!
//! [queue]
//! drain_limit = 50000
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use eventual_types::UnhandledRejectionPolicy;

/// Jobs a `JobQueue` may run in a single drain before it gives up.
pub const DEFAULT_DRAIN_LIMIT: usize = 100_000;

const CONFIG_PATH_ENV: &str = "EVENTUAL_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct EventualConfig {
    pub rejections: Option<RejectionsConfig>,
    pub queue: Option<QueueConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectionsConfig {
    /// Reaction to a rejection nobody handles. Default: panic.
    #[serde(default)]
    pub policy: UnhandledRejectionPolicy,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueueConfig {
    /// Maximum jobs per `run_until_idle`. Zero is treated as unset.
    pub drain_limit: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl EventualConfig {
    /// Load the config from its default location.
    ///
    /// Returns `Ok(None)` when no home directory can be found or the file does not exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn rejection_policy(&self) -> UnhandledRejectionPolicy {
        self.rejections
            .as_ref()
            .map(|rejections| rejections.policy)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn drain_limit(&self) -> usize {
        self.queue
            .as_ref()
            .and_then(|queue| queue.drain_limit)
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_DRAIN_LIMIT)
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".eventual").join("config.toml"))
}
