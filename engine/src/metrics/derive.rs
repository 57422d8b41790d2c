// Single-period metrics derivation. Pure: the previous period's state is passed in explicitly.
use metrics_shared::models::{DerivedMonthlyRecord, RawMonthlyFacts, SeedState};
use metrics_shared::utils::{is_first_of_month, period_label};

use super::MONTHS_PER_YEAR;
use crate::error::{EngineError, Result};

/// The slice of the previous period the next derivation depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousState {
    pub arr: f64,
    pub customers: u32,
}

impl From<&SeedState> for PreviousState {
    fn from(seed: &SeedState) -> Self {
        PreviousState {
            arr: seed.arr,
            customers: seed.customers,
        }
    }
}

impl From<&DerivedMonthlyRecord> for PreviousState {
    fn from(record: &DerivedMonthlyRecord) -> Self {
        PreviousState {
            arr: record.arr,
            customers: record.customers,
        }
    }
}

/// `numerator / denominator`, or `DivisionByZero` naming the metric.
pub fn checked_ratio(numerator: f64, denominator: f64, metric: &'static str) -> Result<f64> {
    if denominator == 0.0 {
        return Err(EngineError::DivisionByZero { metric });
    }
    Ok(numerator / denominator)
}

pub fn derive(current: &RawMonthlyFacts, previous: &PreviousState) -> Result<DerivedMonthlyRecord> {
    let period = current.period_start;

    if !is_first_of_month(period) {
        return Err(EngineError::InvalidInput(format!(
            "Period {} does not start on the first day of a month",
            period
        )));
    }
    if !previous.arr.is_finite() || previous.arr < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "Previous ARR {} before period {} is not a non-negative amount",
            previous.arr, period
        )));
    }

    let components = [
        ("new_mrr", current.new_mrr),
        ("expansion_mrr", current.expansion_mrr),
        ("reactivation_mrr", current.reactivation_mrr),
        ("churn_mrr", current.churn_mrr),
        ("contraction_mrr", current.contraction_mrr),
    ];
    for (name, value) in components {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "{} for period {} must be a non-negative amount, got {}",
                name, period, value
            )));
        }
    }

    let available = previous
        .customers
        .checked_add(current.new_customers)
        .ok_or_else(|| EngineError::InvalidInput(format!("Customer count overflows in period {}", period)))?;
    let customers = available.checked_sub(current.churned_customers).ok_or_else(|| {
        EngineError::InvalidInput(format!(
            "Period {} churns {} customers but only {} were active",
            period, current.churned_customers, available
        ))
    })?;

    let net_mrr = current.net_mrr();
    let arr = previous.arr + net_mrr * MONTHS_PER_YEAR;
    if arr < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "Period {} would bring ARR below zero ({})",
            period, arr
        )));
    }

    let mom_growth_pct = defined_or_undefined(
        checked_ratio((arr - previous.arr) * 100.0, previous.arr, "mom_growth_pct"),
        current,
    );
    let arpa = defined_or_undefined(checked_ratio(arr, customers as f64, "arpa"), current);

    Ok(DerivedMonthlyRecord {
        period_start: period,
        period_label: period_label(period),
        arr,
        mom_growth_pct,
        customers,
        arpa,
        net_mrr,
        new_mrr: current.new_mrr,
        expansion_mrr: current.expansion_mrr,
        reactivation_mrr: current.reactivation_mrr,
        churn_mrr: -current.churn_mrr,
        contraction_mrr: -current.contraction_mrr,
    })
}

// A zero denominator marks the field undefined; the record itself is still valid.
fn defined_or_undefined(ratio: Result<f64>, current: &RawMonthlyFacts) -> Option<f64> {
    match ratio {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(period = %current.period_start, reason = %err, "Ratio left undefined");
            None
        }
    }
}
