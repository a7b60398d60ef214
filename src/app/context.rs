use std::path::PathBuf;

use crate::app::error::Result;
use crate::config::Config;

pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    /// Loads the configuration from `config_path`, or from the default
    /// location when none is given.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(p) => p,
            None => Config::default_config_path()?,
        };
        let config = Config::load_from(&config_path)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            config_path: PathBuf::new(),
        }
    }
}
