use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or rejected API credential.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network, quota or protocol failure talking to the chat service.
    #[error("Chat service unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Failed to access appointment records at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl BotError {
    pub fn storage(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::Storage {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        Self::OracleUnavailable(e.without_url().to_string())
    }
}
