use thiserror::Error;

use crate::data::source::IngestionError;

#[derive(Error, Debug)]
pub enum EngineError {
    // Rejects the whole build; never clamped.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Local to a single ratio field, which is then reported as undefined.
    #[error("Division by zero while computing {metric}")]
    DivisionByZero { metric: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Ingestion error: {source}")]
    IngestionError {
        #[from]
        source: IngestionError,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Settings format error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl EngineError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EngineError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
