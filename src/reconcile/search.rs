use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::dates::days_between;
use crate::error::ValidationError;
use crate::models::{AvailabilityRecord, SearchRequest, Span};

/// Spans that can host the requested stay and pass every filter.
///
/// An empty result is not an error; only a malformed request is.
pub fn search(spans: &[Span], request: &SearchRequest) -> Result<Vec<Span>, ValidationError> {
    validate_request(request)?;

    let matches: Vec<Span> = spans
        .iter()
        .filter(|span| matches_filters(span, request) && matches_stay(span, request))
        .cloned()
        .collect();

    debug!(
        candidates = spans.len(),
        matches = matches.len(),
        check_in = %request.check_in,
        check_out = %request.check_out,
        "Searched availability"
    );
    Ok(matches)
}

pub fn validate_request(request: &SearchRequest) -> Result<(), ValidationError> {
    if request.check_out <= request.check_in {
        return Err(ValidationError::CheckOutNotAfterCheckIn);
    }
    if request.guests == Some(0) {
        return Err(ValidationError::NoGuests);
    }
    Ok(())
}

fn matches_filters(span: &Span, request: &SearchRequest) -> bool {
    let resort = request
        .resort
        .as_deref()
        .map_or(true, |resort| span.resort == resort);
    let unit_type = request
        .unit_type
        .as_deref()
        .map_or(true, |unit| {
            span.unit_type
                .to_lowercase()
                .contains(&unit.to_lowercase())
        });
    let guests = request
        .guests
        .map_or(true, |guests| guests_fit(guests, &span.unit_type));
    let min_stay = request
        .min_stay
        .map_or(true, |min| span.min_stay_days >= min);
    let max_stay = request
        .max_stay
        .map_or(true, |max| span.min_stay_days <= max);

    resort && unit_type && guests && min_stay && max_stay
}

fn matches_stay(span: &Span, request: &SearchRequest) -> bool {
    span.contains_stay(request.check_in, request.check_out)
        && request.nights() >= i64::from(span.min_stay_days)
}

/// Rough party-size to bedroom-count mapping; a single guest fits anywhere.
pub fn guests_fit(guests: u32, unit_type: &str) -> bool {
    let unit = unit_type.to_lowercase();
    guests == 1
        || (guests <= 2 && unit.contains("1 bedroom"))
        || (guests <= 4 && unit.contains("2 bedroom"))
        || (guests <= 6 && unit.contains("3 bedroom"))
}

/// Check a concrete stay chosen inside one span, returning its length in nights.
pub fn validate_selection(
    span: &Span,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<i64, ValidationError> {
    if check_out <= check_in {
        return Err(ValidationError::CheckOutNotAfterCheckIn);
    }
    if !span.contains_stay(check_in, check_out) {
        return Err(ValidationError::OutsideSpan {
            date_range: span.date_range.clone(),
        });
    }
    let nights = days_between(check_in, check_out);
    if nights < i64::from(span.min_stay_days) {
        return Err(ValidationError::MinStayNotMet {
            min_stay: span.min_stay_days,
            nights,
        });
    }
    Ok(nights)
}

/// Distinct resorts and unit types, in first-seen order, for filter pickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub resorts: Vec<String>,
    pub unit_types: Vec<String>,
}

impl SearchOptions {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AvailabilityRecord>,
    {
        let mut options = Self::default();
        for record in records {
            if !options.resorts.contains(&record.resort) {
                options.resorts.push(record.resort.clone());
            }
            if !options.unit_types.contains(&record.unit_type) {
                options.unit_types.push(record.unit_type.clone());
            }
        }
        options
    }
}
