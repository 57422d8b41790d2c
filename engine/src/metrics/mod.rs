// SaaS metrics derivation: per-period derivation, sequence folding, synthetic data and summaries.
pub mod derive;
pub mod generator;
pub mod sequence;
pub mod summary;

pub use derive::{derive, PreviousState};
pub use generator::SyntheticGenerator;
pub use sequence::build;
pub use summary::{MetricChange, PeriodSummary};

/// Months per year, used to annualize net MRR into ARR.
pub const MONTHS_PER_YEAR: f64 = 12.0;
