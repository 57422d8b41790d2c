use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of raw business facts, as produced by ingestion or the synthetic generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMonthlyFacts {
    pub period_start: NaiveDate,
    pub new_customers: u32,
    pub churned_customers: u32,
    pub new_mrr: f64,
    pub expansion_mrr: f64,
    pub reactivation_mrr: f64,
    pub churn_mrr: f64,
    pub contraction_mrr: f64,
}

impl RawMonthlyFacts {
    /// Net recurring revenue movement for the month.
    pub fn net_mrr(&self) -> f64 {
        self.new_mrr + self.expansion_mrr + self.reactivation_mrr - self.churn_mrr - self.contraction_mrr
    }
}

/// Derived metrics for one month. Ratios that could not be computed are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMonthlyRecord {
    pub period_start: NaiveDate,
    pub period_label: String,
    pub arr: f64,
    pub mom_growth_pct: Option<f64>,
    pub customers: u32,
    pub arpa: Option<f64>,
    pub net_mrr: f64,
    // MRR movements for charting; churn and contraction are stored negated.
    pub new_mrr: f64,
    pub expansion_mrr: f64,
    pub reactivation_mrr: f64,
    pub churn_mrr: f64,
    pub contraction_mrr: f64,
}

/// State before the first derived period. A configuration value, never computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedState {
    pub period_start: NaiveDate,
    pub arr: f64,
    pub customers: u32,
}

impl Default for SeedState {
    fn default() -> Self {
        SeedState {
            period_start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap_or_default(),
            arr: 3_000_000.0,
            customers: 150,
        }
    }
}

/// Inclusive draw ranges for the synthetic generator. Amounts are whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationBounds {
    pub min_new_customers: u32,
    pub max_new_customers: u32,
    pub min_churned_customers: u32,
    pub max_churned_customers: u32,
    pub min_expansion_mrr: u64,
    pub max_expansion_mrr: u64,
    pub min_contraction_mrr: u64,
    pub max_contraction_mrr: u64,
    pub min_reactivation_mrr: u64,
    pub max_reactivation_mrr: u64,
    pub per_customer_mrr: u64,
}

impl Default for GenerationBounds {
    fn default() -> Self {
        GenerationBounds {
            min_new_customers: 5,
            max_new_customers: 14,
            min_churned_customers: 0,
            max_churned_customers: 4,
            min_expansion_mrr: 10_000,
            max_expansion_mrr: 59_999,
            min_contraction_mrr: 0,
            max_contraction_mrr: 19_999,
            min_reactivation_mrr: 0,
            max_reactivation_mrr: 9_999,
            per_customer_mrr: 2_000,
        }
    }
}
