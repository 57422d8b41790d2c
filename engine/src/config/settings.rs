// Metrics engine settings, loaded from a JSON file over the built-in defaults.
use std::path::{Path, PathBuf};
use std::time::Duration;

use metrics_shared::models::{GenerationBounds, SeedState};
use serde::Deserialize;

use crate::error::{EngineError, Result};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsSettings {
    pub source_path: PathBuf,
    pub default_period_count: usize,
    pub seed: SeedState,
    pub bounds: GenerationBounds,
    pub rng_seed: Option<u64>,
    pub load_timeout_ms: u64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        MetricsSettings {
            source_path: PathBuf::from("data/saas_data.csv"),
            default_period_count: 6,
            seed: SeedState::default(),
            bounds: GenerationBounds::default(),
            rng_seed: None,
            load_timeout_ms: 5_000,
        }
    }
}

impl MetricsSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings: MetricsSettings = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded metrics settings");
        Ok(settings)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Checks what the generator cannot check on its own. Bounds are validated by the generator.
    pub fn validate(&self) -> Result<()> {
        if self.default_period_count == 0 {
            return Err(EngineError::ConfigError("default_period_count must be greater than 0".to_string()));
        }
        if !self.seed.arr.is_finite() || self.seed.arr < 0.0 {
            return Err(EngineError::ConfigError(format!(
                "Seed ARR must be a non-negative amount, got {}",
                self.seed.arr
            )));
        }
        if self.load_timeout_ms == 0 {
            return Err(EngineError::ConfigError("load_timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }
}
