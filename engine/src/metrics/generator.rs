// Synthetic monthly facts for demos and for when no real dataset can be loaded.
use metrics_shared::models::{GenerationBounds, RawMonthlyFacts, SeedState};
use metrics_shared::utils::next_month;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::MONTHS_PER_YEAR;
use crate::error::{EngineError, Result};

/// Draws attempted for a component before falling back to its narrowed valid range.
pub const MAX_REDRAWS: usize = 16;

/// Generates internally consistent raw facts under configured bounds.
///
/// New and churned MRR are not drawn: they follow the drawn customer counts at
/// `per_customer_mrr`, so revenue churn tracks customer churn.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    bounds: GenerationBounds,
}

impl SyntheticGenerator {
    pub fn new(bounds: GenerationBounds) -> Result<Self> {
        validate_bounds(&bounds)?;
        Ok(SyntheticGenerator { bounds })
    }

    /// Generates `period_count` months after `seed.period_start`.
    ///
    /// `rng_seed` makes the output reproducible; `None` seeds from the operating system.
    pub fn generate(&self, period_count: usize, seed: &SeedState, rng_seed: Option<u64>) -> Result<Vec<RawMonthlyFacts>> {
        let mut rng = match rng_seed {
            Some(value) => StdRng::seed_from_u64(value),
            None => StdRng::from_os_rng(),
        };
        self.generate_with(period_count, seed, &mut rng)
    }

    pub fn generate_with<R: Rng>(&self, period_count: usize, seed: &SeedState, rng: &mut R) -> Result<Vec<RawMonthlyFacts>> {
        if period_count == 0 {
            return Err(EngineError::ConfigError("Period count must be greater than 0".to_string()));
        }

        let b = &self.bounds;
        let per_customer = b.per_customer_mrr as f64;
        let mut facts = Vec::with_capacity(period_count);
        let mut period = seed.period_start;
        let mut customers = seed.customers;
        let mut arr = seed.arr;

        for _ in 0..period_count {
            period = next_month(period)
                .ok_or_else(|| EngineError::ConfigError(format!("No calendar month follows {}", period)))?;

            let new_customers = rng.random_range(b.min_new_customers..=b.max_new_customers);
            let available = customers.saturating_add(new_customers);
            let churned_customers = self.draw_churned_customers(rng, available, &period);

            let expansion_mrr = rng.random_range(b.min_expansion_mrr..=b.max_expansion_mrr) as f64;
            let reactivation_mrr = rng.random_range(b.min_reactivation_mrr..=b.max_reactivation_mrr) as f64;
            let new_mrr = new_customers as f64 * per_customer;
            let churn_mrr = churned_customers as f64 * per_customer;

            // Largest contraction that keeps ARR non-negative this month.
            let headroom = arr / MONTHS_PER_YEAR + new_mrr + expansion_mrr + reactivation_mrr - churn_mrr;
            let contraction_mrr = self.draw_contraction_mrr(rng, headroom, &period)? as f64;

            let month = RawMonthlyFacts {
                period_start: period,
                new_customers,
                churned_customers,
                new_mrr,
                expansion_mrr,
                reactivation_mrr,
                churn_mrr,
                contraction_mrr,
            };
            customers = available - churned_customers;
            arr += month.net_mrr() * MONTHS_PER_YEAR;
            facts.push(month);
        }

        tracing::debug!(periods = facts.len(), first = %seed.period_start, "Generated synthetic monthly facts");
        Ok(facts)
    }

    fn draw_churned_customers<R: Rng>(&self, rng: &mut R, available: u32, period: &chrono::NaiveDate) -> u32 {
        let b = &self.bounds;
        for attempt in 0..MAX_REDRAWS {
            let churned = rng.random_range(b.min_churned_customers..=b.max_churned_customers);
            if churned <= available {
                return churned;
            }
            tracing::debug!(%period, attempt, churned, available, "Redrawing churned customers");
        }
        // min_churned_customers <= min_new_customers <= available, so the range is never empty.
        rng.random_range(b.min_churned_customers..=b.max_churned_customers.min(available))
    }

    fn draw_contraction_mrr<R: Rng>(&self, rng: &mut R, headroom: f64, period: &chrono::NaiveDate) -> Result<u64> {
        let b = &self.bounds;
        for attempt in 0..MAX_REDRAWS {
            let contraction = rng.random_range(b.min_contraction_mrr..=b.max_contraction_mrr);
            if contraction as f64 <= headroom {
                return Ok(contraction);
            }
            tracing::debug!(%period, attempt, contraction, headroom, "Redrawing contraction MRR");
        }
        let ceiling = headroom.floor();
        if ceiling < b.min_contraction_mrr as f64 {
            return Err(EngineError::InvalidInput(format!(
                "Minimum contraction of {} would bring ARR below zero in period {}",
                b.min_contraction_mrr, period
            )));
        }
        Ok(rng.random_range(b.min_contraction_mrr..=b.max_contraction_mrr.min(ceiling as u64)))
    }
}

fn validate_bounds(b: &GenerationBounds) -> Result<()> {
    let ranges = [
        ("new_customers", b.min_new_customers as u64, b.max_new_customers as u64),
        ("churned_customers", b.min_churned_customers as u64, b.max_churned_customers as u64),
        ("expansion_mrr", b.min_expansion_mrr, b.max_expansion_mrr),
        ("contraction_mrr", b.min_contraction_mrr, b.max_contraction_mrr),
        ("reactivation_mrr", b.min_reactivation_mrr, b.max_reactivation_mrr),
    ];
    for (name, min, max) in ranges {
        if min > max {
            return Err(EngineError::ConfigError(format!(
                "Bounds for {} are inverted: min {} > max {}",
                name, min, max
            )));
        }
    }
    if b.per_customer_mrr == 0 {
        return Err(EngineError::ConfigError("per_customer_mrr must be greater than 0".to_string()));
    }
    if b.min_churned_customers > b.min_new_customers {
        return Err(EngineError::ConfigError(format!(
            "min_churned_customers ({}) cannot exceed min_new_customers ({})",
            b.min_churned_customers, b.min_new_customers
        )));
    }
    Ok(())
}
