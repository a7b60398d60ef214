//! Configuration management for feedlist.
//!
//! Configuration is read from `~/.config/feedlist/config.toml` unless a path
//! is given. If the file doesn't exist, a default configuration with comments
//! is created.

pub mod demo;
pub mod feed;

pub use demo::DemoConfig;
pub use feed::{FeedConfig, DEFAULT_LOAD_MORE_THRESHOLD};

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/feedlist/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedlist").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# feedlist configuration

[feed]
# A row this many positions before the end of the list loads the next page
load_more_threshold = 2

# Hint for the presentation layer to animate state changes
animated = true

[demo]
# Rows served by the in-memory API
items = 25

# Rows per page
page_size = 9

# Simulated latency per request (milliseconds)
latency_ms = 150

# Rows visible at once
viewport = 5

# One of: plain, inset, grouped, inset_grouped
style = "plain"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
