//! Calendar days in the reporting timezone.
//!
//! Every date the job touches is a whole day in `Asia/Tokyo`. Instants are
//! converted with [`TargetDate::from_instant`] before they are used, so two
//! `TargetDate`s compare equal exactly when their `YYYY-MM-DD` forms do.

use crate::execution::errors::ValidationError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::{Asia::Tokyo, Tz};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Timezone in which calendar days are evaluated.
pub const REFERENCE_TZ: Tz = Tokyo;

/// Offset of the reference timezone from UTC, in hours.
pub const REFERENCE_UTC_OFFSET_HOURS: i64 = 9;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    /// Parses exactly `YYYY-MM-DD`.
    ///
    /// Single-digit months or days, other separators and impossible calendar
    /// days (`2025-02-30`, `2025-13-01`) are rejected.
    pub fn parse_strict(input: &str) -> Result<Self, ValidationError> {
        let bytes = input.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });

        if !well_formed {
            return Err(ValidationError::InvalidDateFormat(input.to_string()));
        }

        NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDateFormat(input.to_string()))
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. Timestamps are moved
    /// into the reference timezone and truncated to their calendar day.
    pub fn parse_lenient(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(date) = Self::parse_strict(trimmed) {
            return Ok(date);
        }

        DateTime::parse_from_rfc3339(trimmed)
            .map(|ts| Self::from_instant(ts.with_timezone(&Utc)))
            .map_err(|_| ValidationError::InvalidDateParameter(input.to_string()))
    }

    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&REFERENCE_TZ).date_naive())
    }

    /// The reference-timezone day before the one containing `now`.
    pub fn yesterday_at(now: DateTime<Utc>) -> Self {
        Self::from_instant(now).pred()
    }

    pub fn yesterday() -> Self {
        Self::yesterday_at(Utc::now())
    }

    pub fn succ(self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(Self)
    }

    pub fn pred(self) -> Self {
        self.0.pred_opt().map_or(self, Self)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Compact form used in generated identifiers, e.g. `20250322`.
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for TargetDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TargetDate::parse_strict(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: TargetDate,
    end: TargetDate,
}

impl DateRange {
    pub fn new(start: TargetDate, end: TargetDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: TargetDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> TargetDate {
        self.start
    }

    pub fn end(&self) -> TargetDate {
        self.end
    }

    pub fn num_days(&self) -> usize {
        let span = (self.end.as_naive() - self.start.as_naive()).num_days();
        usize::try_from(span).unwrap_or(0) + 1
    }

    /// Every day of the range in ascending order.
    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = TargetDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DateRangeIter {
    next: Option<TargetDate>,
    end: TargetDate,
}

impl Iterator for DateRangeIter {
    type Item = TargetDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.succ();
        Some(current)
    }
}
