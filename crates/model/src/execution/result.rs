use crate::core::date::{DateRange, TargetDate};
use serde::{Deserialize, Serialize};

/// Outcome of replacing one date partition. Produced once per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionResult {
    pub success: bool,
    pub processed_date: TargetDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PartitionResult {
    pub fn succeeded(date: TargetDate, row_count: u64) -> Self {
        Self {
            success: true,
            processed_date: date,
            row_count: Some(row_count),
            error: None,
        }
    }

    pub fn failed(date: TargetDate, error: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_date: date,
            row_count: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every date succeeded.
    Complete,
    /// At least one date failed and at least one succeeded.
    Partial,
    /// No date succeeded.
    Failed,
}

/// Aggregated outcome of a date-range run.
///
/// `failed_dates` is absent, not empty, when nothing failed; `success` holds
/// exactly when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success: bool,
    pub start_date: TargetDate,
    pub end_date: TargetDate,
    pub results: Vec<PartitionResult>,
    pub total_row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_dates: Option<Vec<TargetDate>>,
}

impl BatchResult {
    /// Folds per-date results, kept in the order given.
    pub fn from_results(range: DateRange, results: Vec<PartitionResult>) -> Self {
        let total_row_count: u64 = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.row_count)
            .sum();

        let failed = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.processed_date)
            .collect::<Vec<_>>();
        let failed_dates = (!failed.is_empty()).then_some(failed);

        Self {
            success: failed_dates.is_none(),
            start_date: range.start(),
            end_date: range.end(),
            results,
            total_row_count,
            failed_dates,
        }
    }

    pub fn outcome(&self) -> BatchOutcome {
        match &self.failed_dates {
            None => BatchOutcome::Complete,
            Some(failed) if failed.len() < self.results.len() => BatchOutcome::Partial,
            Some(_) => BatchOutcome::Failed,
        }
    }
}
