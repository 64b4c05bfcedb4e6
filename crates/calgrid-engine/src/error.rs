//! Error types for calgrid-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed template {id}: end {end} is before start {start}")]
    MalformedTemplate {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Unknown event color: {0}")]
    UnknownColor(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
