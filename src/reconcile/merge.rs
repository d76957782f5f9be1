use std::collections::BTreeMap;

use tracing::debug;

use crate::dates::days_between;
use crate::models::{availability_id, Span};

/// Largest gap, in days, between one span's end and the next one's start that still merges.
pub const MAX_MERGE_GAP_DAYS: i64 = 1;

/// Coalesce overlapping or adjacent spans within each account/resort/unit partition.
///
/// Partitions come out ordered by key, spans within a partition by start date, and
/// availability ids are re-assigned from the span's position in its partition, so
/// merging an already merged set returns it unchanged.
pub fn merge(spans: Vec<Span>) -> Vec<Span> {
    let input = spans.len();
    let mut partitions: BTreeMap<(String, String, String), Vec<Span>> = BTreeMap::new();
    for span in spans {
        partitions.entry(span.partition_key()).or_default().push(span);
    }

    let mut merged = Vec::with_capacity(input);
    for ((account, resort, unit_type), mut group) in partitions {
        // Stable: equal starts keep input order
        group.sort_by_key(|span| span.start);

        let mut runs: Vec<Span> = Vec::with_capacity(group.len());
        for next in group {
            match runs.last_mut() {
                Some(current) if days_between(current.end, next.start) <= MAX_MERGE_GAP_DAYS => {
                    current.extend_to(next.end);
                    current.min_stay_days = current.min_stay_days.max(next.min_stay_days);
                }
                _ => runs.push(next),
            }
        }

        for (index, mut span) in runs.into_iter().enumerate() {
            span.availability_id = availability_id(&account, &resort, &unit_type, index);
            merged.push(span);
        }
    }

    debug!(input, output = merged.len(), "Merged availability periods");
    merged
}
