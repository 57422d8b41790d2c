// Folds the per-period derivation over an ordered sequence of raw monthly facts.
use metrics_shared::models::{DerivedMonthlyRecord, RawMonthlyFacts, SeedState};
use metrics_shared::utils::months_between;

use super::derive::{derive, PreviousState};
use crate::error::{EngineError, Result};

/// Derives every period in order, threading ARR and customers forward from `seed`.
///
/// Fails for the whole sequence on the first invalid period: periods must be strictly
/// increasing and one calendar month apart. Only the seed's ARR and customers are used.
pub fn build(raw: &[RawMonthlyFacts], seed: &SeedState) -> Result<Vec<DerivedMonthlyRecord>> {
    check_ordering(raw)?;

    let mut records: Vec<DerivedMonthlyRecord> = Vec::with_capacity(raw.len());
    for facts in raw {
        let previous = records
            .last()
            .map(PreviousState::from)
            .unwrap_or_else(|| PreviousState::from(seed));
        let record = derive(facts, &previous).map_err(|e| {
            tracing::warn!(period = %facts.period_start, reason = %e, "Rejecting monthly sequence");
            e
        })?;
        records.push(record);
    }

    tracing::debug!(periods = records.len(), "Built derived monthly sequence");
    Ok(records)
}

fn check_ordering(raw: &[RawMonthlyFacts]) -> Result<()> {
    for pair in raw.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        match months_between(prev.period_start, next.period_start) {
            1 => {}
            0 => {
                return Err(EngineError::InvalidInput(format!(
                    "Duplicate period {}",
                    next.period_start
                )))
            }
            gap if gap > 1 => {
                return Err(EngineError::InvalidInput(format!(
                    "Gap of {} months between {} and {}",
                    gap - 1,
                    prev.period_start,
                    next.period_start
                )))
            }
            _ => {
                return Err(EngineError::InvalidInput(format!(
                    "Period {} is out of order after {}",
                    next.period_start, prev.period_start
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MONTHS_PER_YEAR;
    use chrono::NaiveDate;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn seed() -> SeedState {
        SeedState {
            period_start: month(2023, 12),
            arr: 3_000_000.0,
            customers: 150,
        }
    }

    fn facts_at(period_start: NaiveDate, new_customers: u32, churned_customers: u32, expansion_mrr: f64) -> RawMonthlyFacts {
        RawMonthlyFacts {
            period_start,
            new_customers,
            churned_customers,
            new_mrr: new_customers as f64 * 2_000.0,
            expansion_mrr,
            reactivation_mrr: 1_500.0,
            churn_mrr: churned_customers as f64 * 2_000.0,
            contraction_mrr: 3_000.0,
        }
    }

    fn six_months() -> Vec<RawMonthlyFacts> {
        (1..=6)
            .map(|m| facts_at(month(2024, m), 5 + m, m % 3, 10_000.0 * m as f64))
            .collect()
    }

    #[test]
    fn test_build_preserves_length_and_order() {
        let raw = six_months();
        let records = build(&raw, &seed()).unwrap();
        assert_eq!(records.len(), raw.len());
        for (record, facts) in records.iter().zip(raw.iter()) {
            assert_eq!(record.period_start, facts.period_start);
        }
        assert_eq!(records[0].period_label, "jan-24");
        assert_eq!(records[5].period_label, "jun-24");
    }

    #[test]
    fn test_build_arr_recurrence_is_exact() {
        let raw = six_months();
        let records = build(&raw, &seed()).unwrap();

        assert_eq!(records[0].arr, seed().arr + records[0].net_mrr * MONTHS_PER_YEAR);
        for pair in records.windows(2) {
            assert_eq!(pair[1].arr, pair[0].arr + pair[1].net_mrr * MONTHS_PER_YEAR);
        }
    }

    #[test]
    fn test_build_threads_customers() {
        let raw = six_months();
        let records = build(&raw, &seed()).unwrap();
        let mut expected = seed().customers;
        for (record, facts) in records.iter().zip(raw.iter()) {
            expected = expected + facts.new_customers - facts.churned_customers;
            assert_eq!(record.customers, expected);
        }
    }

    #[test]
    fn test_build_empty_sequence() {
        assert!(build(&[], &seed()).unwrap().is_empty());
    }

    #[test]
    fn test_build_fails_fast_on_negative_customers() {
        let mut raw = six_months();
        raw[3].churned_customers = 10_000;
        let err = build(&raw, &seed()).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("2024-04-01"));
    }

    #[test]
    fn test_build_rejects_gap() {
        let raw = vec![facts_at(month(2024, 1), 5, 0, 0.0), facts_at(month(2024, 3), 5, 0, 0.0)];
        let err = build(&raw, &seed()).unwrap_err();
        assert!(err.to_string().contains("Gap of 1 months"));
    }

    #[test]
    fn test_build_rejects_duplicate() {
        let raw = vec![facts_at(month(2024, 1), 5, 0, 0.0), facts_at(month(2024, 1), 5, 0, 0.0)];
        let err = build(&raw, &seed()).unwrap_err();
        assert!(err.to_string().contains("Duplicate period"));
    }

    #[test]
    fn test_build_rejects_out_of_order() {
        let raw = vec![facts_at(month(2024, 2), 5, 0, 0.0), facts_at(month(2024, 1), 5, 0, 0.0)];
        let err = build(&raw, &seed()).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn test_build_history_dated_before_seed() {
        let raw: Vec<RawMonthlyFacts> = (1..=3).map(|m| facts_at(month(2023, m), 10, 2, 30_000.0)).collect();
        let records = build(&raw, &seed()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].period_label, "jan-23");
        assert_eq!(records[0].arr, seed().arr + records[0].net_mrr * MONTHS_PER_YEAR);
        assert_eq!(records[2].customers, 150 + 3 * 8);
    }

    #[test]
    fn test_build_first_period_equal_to_seed_period() {
        let raw = vec![facts_at(month(2023, 12), 5, 0, 0.0)];
        assert_eq!(build(&raw, &seed()).unwrap().len(), 1);
    }

    #[test]
    fn test_build_allows_first_period_later_than_next_month() {
        let raw = vec![facts_at(month(2024, 5), 5, 0, 0.0)];
        let records = build(&raw, &seed()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_build_zero_seed_arr_marks_first_growth_undefined() {
        let zero_seed = SeedState { arr: 0.0, ..seed() };
        let records = build(&six_months(), &zero_seed).unwrap();
        assert_eq!(records[0].mom_growth_pct, None);
        assert!(records[1].mom_growth_pct.is_some());
    }
}
