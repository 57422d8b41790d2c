// Boundary to whatever produces raw monthly facts (spreadsheets, CSV exports, test doubles).
use std::path::Path;

use async_trait::async_trait;
use metrics_shared::models::RawMonthlyFacts;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestionError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Source parse error: {0}")]
    ParseError(String),

    #[error("Source I/O error: {0}")]
    IoError(String),

    #[error("Source read timed out after {0} ms")]
    Timeout(u64),
}

impl From<std::io::Error> for IngestionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IngestionError::NotFound(err.to_string()),
            _ => IngestionError::IoError(err.to_string()),
        }
    }
}

/// Produces the raw facts for a load. Rows need not be sorted; the loader sorts them.
#[async_trait]
pub trait MonthlyFactsSource: Send + Sync {
    async fn read_source(&self, path: &Path) -> Result<Vec<RawMonthlyFacts>, IngestionError>;
}
