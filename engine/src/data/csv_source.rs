use std::path::Path;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use metrics_shared::models::RawMonthlyFacts;

use super::source::{IngestionError, MonthlyFactsSource};

// Field-level parsing for the monthly facts export.
pub mod facts_format {
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;
    use metrics_shared::utils::first_of_month;

    // Accepts "2024-01-01" or "2024-01"; any day is normalized to the first of the month.
    pub fn parse_period(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d"))
            .map_err(|e| anyhow!("Failed to parse period '{}': {}", s, e))?;
        Ok(first_of_month(date))
    }

    pub fn parse_count(s: &str) -> Result<u32> {
        s.trim()
            .parse::<u32>()
            .map_err(|e| anyhow!("Failed to parse count '{}': {}", s, e))
    }

    pub fn parse_amount(s: &str) -> Result<f64> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("Failed to parse amount '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Amount '{}' is not a finite number", s));
        }
        Ok(value)
    }

    // Churn and contraction are often exported negated for charting; only the magnitude matters.
    pub fn parse_magnitude(s: &str) -> Result<f64> {
        parse_amount(s).map(f64::abs)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_period_full_date() {
            assert_eq!(parse_period("2024-03-01").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        }

        #[test]
        fn test_parse_period_mid_month_normalized() {
            assert_eq!(parse_period(" 2024-03-17 ").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        }

        #[test]
        fn test_parse_period_year_month() {
            assert_eq!(parse_period("2024-11").unwrap(), NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        }

        #[test]
        fn test_parse_period_invalid() {
            assert!(parse_period("01/03/2024").is_err());
            assert!(parse_period("2024-13").is_err());
        }

        #[test]
        fn test_parse_amount_rejects_non_finite() {
            assert!(parse_amount("NaN").is_err());
            assert!(parse_amount("inf").is_err());
            assert_eq!(parse_amount("1250.5").unwrap(), 1250.5);
        }

        #[test]
        fn test_parse_magnitude() {
            assert_eq!(parse_magnitude("-4000").unwrap(), 4000.0);
            assert_eq!(parse_magnitude("4000").unwrap(), 4000.0);
        }

        #[test]
        fn test_parse_count_rejects_negative() {
            assert!(parse_count("-1").is_err());
            assert_eq!(parse_count("12").unwrap(), 12);
        }
    }
}

// Accepted header names per field. The short names match the dashboard's chart keys.
const DATE_HEADERS: &[&str] = &["date", "period", "period_start"];
const NEW_CUSTOMERS_HEADERS: &[&str] = &["new_customers"];
const CHURNED_CUSTOMERS_HEADERS: &[&str] = &["churned_customers"];
const NEW_MRR_HEADERS: &[&str] = &["new_mrr", "new"];
const EXPANSION_MRR_HEADERS: &[&str] = &["expansion_mrr", "expansion"];
const REACTIVATION_MRR_HEADERS: &[&str] = &["reactivation_mrr", "reactivation"];
const CHURN_MRR_HEADERS: &[&str] = &["churn_mrr", "churn"];
const CONTRACTION_MRR_HEADERS: &[&str] = &["contraction_mrr", "contraction"];

/// Reads monthly facts from a delimited text export with a header row.
pub struct CsvFactsSource {
    delimiter: u8,
}

impl CsvFactsSource {
    pub fn new() -> Self {
        CsvFactsSource { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        CsvFactsSource { delimiter }
    }

    pub fn parse_facts(&self, content: &[u8]) -> Result<Vec<RawMonthlyFacts>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let headers = rdr.headers()?.clone();
        let mut facts = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let period_str = Self::required_field(&record, &headers, DATE_HEADERS, line)?;
            let new_customers_str = Self::required_field(&record, &headers, NEW_CUSTOMERS_HEADERS, line)?;
            let churned_customers_str = Self::required_field(&record, &headers, CHURNED_CUSTOMERS_HEADERS, line)?;
            let new_mrr_str = Self::required_field(&record, &headers, NEW_MRR_HEADERS, line)?;
            let expansion_str = Self::required_field(&record, &headers, EXPANSION_MRR_HEADERS, line)?;
            let reactivation_str = Self::required_field(&record, &headers, REACTIVATION_MRR_HEADERS, line)?;
            let churn_str = Self::required_field(&record, &headers, CHURN_MRR_HEADERS, line)?;
            let contraction_str = Self::required_field(&record, &headers, CONTRACTION_MRR_HEADERS, line)?;

            let period_start = facts_format::parse_period(period_str)
                .map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", DATE_HEADERS[0], line, e))?;
            let new_customers = facts_format::parse_count(new_customers_str)
                .map_err(|e| anyhow!("Error parsing 'new_customers' at line {}: {}", line, e))?;
            let churned_customers = facts_format::parse_count(churned_customers_str)
                .map_err(|e| anyhow!("Error parsing 'churned_customers' at line {}: {}", line, e))?;
            let new_mrr = facts_format::parse_amount(new_mrr_str)
                .map_err(|e| anyhow!("Error parsing 'new_mrr' at line {}: {}", line, e))?;
            let expansion_mrr = facts_format::parse_amount(expansion_str)
                .map_err(|e| anyhow!("Error parsing 'expansion_mrr' at line {}: {}", line, e))?;
            let reactivation_mrr = facts_format::parse_amount(reactivation_str)
                .map_err(|e| anyhow!("Error parsing 'reactivation_mrr' at line {}: {}", line, e))?;
            let churn_mrr = facts_format::parse_magnitude(churn_str)
                .map_err(|e| anyhow!("Error parsing 'churn_mrr' at line {}: {}", line, e))?;
            let contraction_mrr = facts_format::parse_magnitude(contraction_str)
                .map_err(|e| anyhow!("Error parsing 'contraction_mrr' at line {}: {}", line, e))?;

            facts.push(RawMonthlyFacts {
                period_start,
                new_customers,
                churned_customers,
                new_mrr,
                expansion_mrr,
                reactivation_mrr,
                churn_mrr,
                contraction_mrr,
            });
        }
        Ok(facts)
    }

    fn required_field<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        names: &[&str],
        line: usize,
    ) -> Result<&'a str> {
        headers
            .iter()
            .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
            .and_then(|pos| record.get(pos))
            .ok_or_else(|| anyhow!("Missing '{}' field in CSV record at line {}", names[0], line))
    }
}

impl Default for CsvFactsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonthlyFactsSource for CsvFactsSource {
    async fn read_source(&self, path: &Path) -> std::result::Result<Vec<RawMonthlyFacts>, IngestionError> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            tracing::debug!(path = %path.display(), error_detail = %e, "Failed to open facts source");
            IngestionError::from(e)
        })?;

        let facts = self
            .parse_facts(&content)
            .map_err(|e| IngestionError::ParseError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), rows = facts.len(), "Parsed monthly facts");
        Ok(facts)
    }
}
