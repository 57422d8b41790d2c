// Load orchestration between the ingestion boundary and the derivation pipeline.
pub mod metrics_service;

pub use metrics_service::{DataOrigin, LoadOutcome, MetricsService};
