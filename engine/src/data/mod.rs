// Ingestion boundary and the bundled CSV adapter.
pub mod csv_source;
pub mod source;

pub use csv_source::CsvFactsSource;
pub use source::{IngestionError, MonthlyFactsSource};
