//! Availability reconciliation: turn fetched records into bookable spans, match
//! them against a requested stay and price the chosen dates.
//!
//! Everything here is pure. The reference date used to resolve year-less ranges
//! and the `now` used to expire pending bookings are passed in by the caller.

pub mod conflicts;
pub mod draft;
pub mod merge;
pub mod search;

pub use conflicts::filter_conflicts;
pub use draft::build_draft;
pub use merge::merge;
pub use search::{search, validate_selection, SearchOptions};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::models::{AvailabilityRecord, Booking, Span};

/// Convert records to spans, dropping any whose date range cannot be resolved.
pub fn spans_from_records(records: &[AvailabilityRecord], reference: NaiveDate) -> Vec<Span> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| match Span::from_record(record, reference, idx) {
            Ok(span) => Some(span),
            Err(err) => {
                warn!(
                    resort = %record.resort,
                    unit_type = %record.unit_type,
                    %err,
                    "Skipping availability record"
                );
                None
            }
        })
        .collect()
}

/// Resolve, merge, and strip already-booked spans.
pub fn reconcile(
    records: &[AvailabilityRecord],
    bookings: &[Booking],
    reference: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<Span> {
    let spans = spans_from_records(records, reference);
    let merged = merge(spans);
    let merged_count = merged.len();
    let available = filter_conflicts(merged, bookings, now);

    info!(
        records = records.len(),
        merged = merged_count,
        available = available.len(),
        "Reconciled availability"
    );
    available
}
