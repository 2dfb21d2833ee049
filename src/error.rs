//! Library error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store is not a JSON object: {0}")]
    CorruptStore(String),

    #[error("Alert sound unavailable: {0}")]
    Audio(String),

    #[error("Price feed already ran to completion")]
    FeedExhausted,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
