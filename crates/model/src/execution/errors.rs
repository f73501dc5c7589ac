use crate::core::date::TargetDate;
use thiserror::Error;

/// Malformed or missing input rejected before any processing starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing {0} parameter")]
    MissingParameter(String),

    #[error("Invalid date format: {0}. Expected format: YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid date parameter: {0}")]
    InvalidDateParameter(String),

    #[error("startDate {start} is after endDate {end}")]
    InvertedRange { start: TargetDate, end: TargetDate },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableIdentError {
    #[error("Table name must not be empty")]
    Empty,

    #[error("Table name '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("Table name '{0}' has more than three segments")]
    TooManySegments(String),
}
