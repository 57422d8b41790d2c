// Metrics engine library root.
//
// Raw monthly facts come from a `MonthlyFactsSource` (or the synthetic generator), are folded
// through the derivation in `metrics`, and leave as `DerivedMonthlyRecord`s for presentation.

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod services;

pub use error::{EngineError, Result};
pub use metrics_shared::models::{DerivedMonthlyRecord, GenerationBounds, RawMonthlyFacts, SeedState};
