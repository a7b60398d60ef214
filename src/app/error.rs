use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid page parameter: {0}")]
    InvalidPage(String),

    #[error("Fetch callback was dropped before delivering rows")]
    CallbackDropped,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
