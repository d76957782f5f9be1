use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::RowError;
use crate::models::AvailabilityRecord;

/// One spreadsheet row, columns in sheet order
pub type RawRow = Vec<String>;

const DEFAULT_PHOTO: &str =
    "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=400&h=250&fit=crop&q=80";

const RESORT_PHOTOS: &[(&str, &str)] = &[
    ("Dolphin C", DEFAULT_PHOTO),
    (
        "Dolphin Cove",
        "https://images.unsplash.com/photo-1571003123894-1f0594d2b5d9?w=400&h=250&fit=crop&q=80",
    ),
    (
        "Yellowstone",
        "https://images.unsplash.com/photo-1544551763-46a013bb70d5?w=400&h=250&fit=crop&q=80",
    ),
];

// Column order of the availability sheet
const CANCEL_BY: usize = 0;
const ACCOUNT: usize = 1;
const RESORT: usize = 2;
const UNIT_TYPE: usize = 3;
const DATE_RANGE: usize = 4;
const NIGHTS: usize = 5;
const BOOK_DATE: usize = 6;
const CASH_COST: usize = 7;
const POINTS_COST: usize = 8;
const BOOKING_CODE: usize = 9;
const HOUSEKEEPING: usize = 10;
const USAGE: usize = 11;

fn min_stay_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+)D").expect("valid min-stay pattern"))
}

/// Minimum stay encoded in the usage column as an `<n>D` token, 1 when absent.
pub fn extract_min_stay_days(usage: &str) -> u32 {
    min_stay_pattern()
        .captures(usage)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(|days| days.max(1))
        .unwrap_or(1)
}

pub fn resort_photo(resort: &str) -> &'static str {
    let resort = resort.trim();
    RESORT_PHOTOS
        .iter()
        .find(|(name, _)| *name == resort)
        .map(|(_, url)| *url)
        .unwrap_or(DEFAULT_PHOTO)
}

/// External listing link built from the first booking code and a resort slug.
pub fn booking_link(resort: &str, booking_code: &str) -> String {
    let code = booking_code
        .split(',')
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("airbnb");
    let slug = resort
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("https://airbnb.com/{}-{}", code, slug)
}

fn column(row: &[String], index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

fn required<'a>(row: &'a [String], index: usize, name: &'static str) -> Result<&'a str, RowError> {
    let value = column(row, index);
    if value.is_empty() {
        return Err(RowError::MissingField(name));
    }
    Ok(value)
}

/// Turn one raw row into a record, or say why it cannot be used.
pub fn normalize_row(row: &[String]) -> Result<AvailabilityRecord, RowError> {
    let cancel_by_date = required(row, CANCEL_BY, "cancelByDate")?;
    let account = required(row, ACCOUNT, "account")?;
    let resort = required(row, RESORT, "resort")?;
    let unit_type = required(row, UNIT_TYPE, "unitType")?;
    let date_range = required(row, DATE_RANGE, "dateRange")?;
    if !date_range.contains('-') {
        return Err(RowError::BadDateRange(date_range.to_string()));
    }

    let booking_code = column(row, BOOKING_CODE);
    let usage = column(row, USAGE);
    let points_cost = match column(row, POINTS_COST) {
        "" => "N/A",
        other => other,
    };

    Ok(AvailabilityRecord {
        cancel_by_date: cancel_by_date.to_string(),
        account: account.to_string(),
        resort: resort.to_string(),
        unit_type: unit_type.to_string(),
        date_range: date_range.to_string(),
        nights: column(row, NIGHTS).parse().unwrap_or(0),
        book_date: column(row, BOOK_DATE).to_string(),
        cost: column(row, CASH_COST).to_string(),
        points_cost: points_cost.to_string(),
        booking_code: booking_code.to_string(),
        hk: column(row, HOUSEKEEPING).to_string(),
        usage: usage.to_string(),
        min_stay_days: extract_min_stay_days(usage),
        photo: resort_photo(resort).to_string(),
        link: booking_link(resort, booking_code),
    })
}

/// Normalize a batch, skipping rows that fail validation.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<AvailabilityRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        match normalize_row(row) {
            Ok(record) => records.push(record),
            // +2: header row plus one-based sheet numbering
            Err(err) => warn!(row = idx + 2, %err, "Skipping availability row"),
        }
    }

    info!(
        kept = records.len(),
        dropped = rows.len() - records.len(),
        "Normalized availability rows"
    );
    records
}
