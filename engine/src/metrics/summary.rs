// Headline figures: the latest period against the one before it.
use metrics_shared::models::DerivedMonthlyRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricChange {
    pub current: Option<f64>,
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period_label: String,
    /// ARR with its percentage change.
    pub arr: MetricChange,
    /// MoM growth with its change in percentage points.
    pub mom_growth: MetricChange,
    /// Customers with their percentage change.
    pub customers: MetricChange,
    /// ARPA with its percentage change.
    pub arpa: MetricChange,
}

impl PeriodSummary {
    /// Needs at least two records; compares the last against the second to last.
    pub fn from_records(records: &[DerivedMonthlyRecord]) -> Option<PeriodSummary> {
        let [.., previous, latest] = records else {
            return None;
        };

        Some(PeriodSummary {
            period_label: latest.period_label.clone(),
            arr: percent_change(Some(latest.arr), Some(previous.arr)),
            mom_growth: MetricChange {
                current: latest.mom_growth_pct,
                change: latest.mom_growth_pct.zip(previous.mom_growth_pct).map(|(l, p)| l - p),
            },
            customers: percent_change(Some(latest.customers as f64), Some(previous.customers as f64)),
            arpa: percent_change(latest.arpa, previous.arpa),
        })
    }
}

fn percent_change(current: Option<f64>, previous: Option<f64>) -> MetricChange {
    let change = match (current, previous) {
        (Some(c), Some(p)) if p != 0.0 => Some((c - p) * 100.0 / p),
        _ => None,
    };
    MetricChange { current, change }
}
