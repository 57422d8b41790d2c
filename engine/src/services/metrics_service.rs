// Chooses between ingested and synthetic monthly facts and derives the display sequence.
use metrics_shared::models::DerivedMonthlyRecord;
use serde::Serialize;

use crate::config::MetricsSettings;
use crate::data::source::{IngestionError, MonthlyFactsSource};
use crate::error::{EngineError, Result};
use crate::metrics::{build, PeriodSummary, SyntheticGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataOrigin {
    Ingested,
    Synthetic,
}

/// What a load hands to the presentation layer. `warning` is advisory, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub records: Vec<DerivedMonthlyRecord>,
    pub warning: Option<String>,
    pub origin: DataOrigin,
}

impl LoadOutcome {
    pub fn summary(&self) -> Option<PeriodSummary> {
        PeriodSummary::from_records(&self.records)
    }
}

/// Holds only immutable configuration, so independent consumers may load concurrently.
pub struct MetricsService {
    settings: MetricsSettings,
    generator: SyntheticGenerator,
}

impl MetricsService {
    pub fn new(settings: MetricsSettings) -> Result<Self> {
        settings.validate()?;
        let generator = SyntheticGenerator::new(settings.bounds)?;
        Ok(MetricsService { settings, generator })
    }

    pub fn settings(&self) -> &MetricsSettings {
        &self.settings
    }

    /// Loads from `source`, falling back to generated data on any ingestion or build failure.
    pub async fn load(&self, source: &dyn MonthlyFactsSource) -> LoadOutcome {
        let path = &self.settings.source_path;
        tracing::info!(path = %path.display(), "Loading monthly facts");

        match self.load_ingested(source).await {
            Ok(records) => {
                tracing::info!(path = %path.display(), periods = records.len(), "Derived metrics from source data");
                LoadOutcome {
                    records,
                    warning: None,
                    origin: DataOrigin::Ingested,
                }
            }
            Err(e) => {
                let reason = format!("Could not use source data at {} ({})", path.display(), e);
                tracing::warn!(path = %path.display(), reason = %reason, "Falling back to synthetic metrics");
                self.fallback(reason)
            }
        }
    }

    /// Reads and derives source data without falling back. Empty sources are `InvalidInput`.
    pub async fn load_ingested(&self, source: &dyn MonthlyFactsSource) -> Result<Vec<DerivedMonthlyRecord>> {
        let path = &self.settings.source_path;
        let mut facts = tokio::time::timeout(self.settings.load_timeout(), source.read_source(path))
            .await
            .unwrap_or(Err(IngestionError::Timeout(self.settings.load_timeout_ms)))?;

        if facts.is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "Source data at {} contains no monthly rows",
                path.display()
            )));
        }

        facts.sort_by_key(|f| f.period_start);
        build(&facts, &self.settings.seed)
    }

    fn fallback(&self, reason: String) -> LoadOutcome {
        let seed = &self.settings.seed;
        let generated = self
            .generator
            .generate(self.settings.default_period_count, seed, self.settings.rng_seed)
            .and_then(|facts| build(&facts, seed));

        match generated {
            Ok(records) => LoadOutcome {
                records,
                warning: Some(format!("{}. Showing sample data.", reason)),
                origin: DataOrigin::Synthetic,
            },
            Err(e) => {
                tracing::error!(error_detail = %e, "Sample data generation failed");
                LoadOutcome {
                    records: Vec::new(),
                    warning: Some(format!("{}. Sample data could not be generated either ({}).", reason, e)),
                    origin: DataOrigin::Synthetic,
                }
            }
        }
    }
}
