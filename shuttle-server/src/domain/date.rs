//! Service date handling.

use std::fmt;

use chrono::NaiveDate;

/// Error returned when parsing an invalid service date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service date: {reason}")]
pub struct InvalidServiceDate {
    reason: &'static str,
}

/// The calendar date an optimization run operates on.
///
/// Parsed from the `YYYY-MM-DD` wire format used throughout the admin
/// tooling; `Display` produces the same format, so dates round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceDate(NaiveDate);

impl ServiceDate {
    /// Parse a date in `YYYY-MM-DD` format.
    pub fn parse(s: &str) -> Result<Self, InvalidServiceDate> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidServiceDate {
                reason: "must not be empty",
            });
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(ServiceDate)
            .map_err(|_| InvalidServiceDate {
                reason: "must be YYYY-MM-DD",
            })
    }

    /// Construct from an already-validated calendar date.
    pub fn from_naive(date: NaiveDate) -> Self {
        ServiceDate(date)
    }

    /// The underlying calendar date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
