//! Error types for spendsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Remote failures a run survives by treating the source as empty
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Backend(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
