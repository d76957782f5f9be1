use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems turning a `M/D-M/D` string into calendar dates
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("date range `{0}` has no `-` separator")]
    MissingSeparator(String),
    #[error("`{0}` is not a M/D or M/D/YYYY date")]
    Malformed(String),
    #[error("`{0}` is not a calendar date")]
    OutOfRange(String),
    #[error("date range `{0}` ends before it starts")]
    Inverted(String),
}

/// Why a raw spreadsheet row was dropped during normalization
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing required column `{0}`")]
    MissingField(&'static str),
    #[error("date range `{0}` has no `-` separator")]
    BadDateRange(String),
}

/// User-facing search and selection problems
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select both check-in and check-out dates")]
    MissingDates,
    #[error("`{0}` is not a valid date")]
    BadDate(String),
    #[error("Check-out must be after check-in")]
    CheckOutNotAfterCheckIn,
    #[error("Guest count must be at least 1")]
    NoGuests,
    #[error("Requested dates fall outside the available period {date_range}")]
    OutsideSpan { date_range: String },
    #[error("Minimum stay of {min_stay} nights not met ({nights} requested)")]
    MinStayNotMet { min_stay: u32, nights: i64 },
    #[error("No availability with id `{0}`")]
    UnknownAvailability(String),
}

/// Failures talking to the availability backend
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("availability request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("availability request timed out after {0}s")]
    Timeout(u64),
    #[error("availability service returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("availability payload was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("availability response superseded by a newer refresh")]
    Stale,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Reason a booking draft could not be priced
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DraftIssue {
    #[error("availability has no nightly basis to prorate from")]
    ZeroBaseNights,
    #[error("check-out must be after check-in")]
    EmptyStay,
    #[error("cost `{cost}` is not a currency amount")]
    MalformedCost { cost: String },
    #[error("cost `{cost}` is too large to prorate")]
    CostOverflow { cost: String },
}
