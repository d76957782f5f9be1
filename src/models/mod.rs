use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{days_between, format_date_range, parse_date_range};
use crate::error::{DateRangeError, DraftIssue};

fn default_min_stay() -> u32 {
    1
}

fn default_points_cost() -> String {
    "N/A".to_string()
}

/// Normalized availability row, as served by `/api/availability`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub cancel_by_date: String,
    pub account: String,
    pub resort: String,
    pub unit_type: String,
    /// `M/D-M/D` as written in the sheet
    pub date_range: String,
    /// Night count of the original row
    #[serde(default)]
    pub nights: u32,
    #[serde(default)]
    pub book_date: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default = "default_points_cost", alias = "pointsCosts")]
    pub points_cost: String,
    #[serde(default)]
    pub booking_code: String,
    #[serde(default)]
    pub hk: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default = "default_min_stay")]
    pub min_stay_days: u32,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub link: String,
}

/// Contiguous availability for one account, resort and unit type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub availability_id: String,
    pub account: String,
    pub resort: String,
    pub unit_type: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub date_range: String,
    /// Length of the span in nights
    pub nights: u32,
    /// Cost of the row the span was built from; proration basis
    pub base_cost: String,
    /// Night count `base_cost` pays for
    pub base_nights: u32,
    pub min_stay_days: u32,
    pub cancel_by_date: String,
    pub booking_code: String,
    pub photo: String,
    pub link: String,
}

/// Stable identifier for the `index`-th span of a partition.
///
/// Components are joined with `-`; any `-` or `%` inside a component is
/// percent-escaped so distinct partitions never share an id.
pub fn availability_id(account: &str, resort: &str, unit_type: &str, index: usize) -> String {
    format!(
        "{}-{}-{}-{}",
        escape_id_part(account),
        escape_id_part(resort),
        escape_id_part(unit_type),
        index
    )
}

fn escape_id_part(part: &str) -> String {
    part.replace('%', "%25").replace('-', "%2D")
}

impl Span {
    /// Resolve a record's date range against `reference` and build a span from it.
    pub fn from_record(
        record: &AvailabilityRecord,
        reference: NaiveDate,
        index: usize,
    ) -> Result<Self, DateRangeError> {
        let (start, end) = parse_date_range(&record.date_range, reference)?;

        Ok(Self {
            availability_id: availability_id(
                &record.account,
                &record.resort,
                &record.unit_type,
                index,
            ),
            account: record.account.clone(),
            resort: record.resort.clone(),
            unit_type: record.unit_type.clone(),
            start,
            end,
            date_range: format_date_range(start, end),
            nights: nights_between(start, end),
            base_cost: record.cost.clone(),
            base_nights: record.nights,
            min_stay_days: record.min_stay_days.max(1),
            cancel_by_date: record.cancel_by_date.clone(),
            booking_code: record.booking_code.clone(),
            photo: record.photo.clone(),
            link: record.link.clone(),
        })
    }

    pub fn partition_key(&self) -> (String, String, String) {
        (
            self.account.clone(),
            self.resort.clone(),
            self.unit_type.clone(),
        )
    }

    /// Move the end forward to cover `end`, keeping derived fields in step.
    pub fn extend_to(&mut self, end: NaiveDate) {
        self.end = self.end.max(end);
        self.nights = nights_between(self.start, self.end);
        self.date_range = format_date_range(self.start, self.end);
    }

    /// True when `[check_in, check_out]` lies inside the span, bounds inclusive.
    pub fn contains_stay(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        check_in >= self.start && check_out <= self.end
    }

    /// Last check-in that still leaves room for the minimum stay.
    pub fn latest_check_in(&self) -> Option<NaiveDate> {
        self.end
            .checked_sub_signed(Duration::days(i64::from(self.min_stay_days)))
            .filter(|latest| *latest >= self.start)
    }

    /// Calendar nights of the span, half-open `[start, end)`.
    pub fn nights_iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d < self.end)
    }
}

fn nights_between(start: NaiveDate, end: NaiveDate) -> u32 {
    u32::try_from(days_between(start, end)).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// A booking made elsewhere against one of our spans
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub status: BookingStatus,
    #[serde(default)]
    pub booking_expiration: Option<DateTime<Utc>>,
    pub original_availability_id: String,
    #[serde(default)]
    pub booked_dates: Vec<NaiveDate>,
}

impl Booking {
    /// Confirmed bookings always hold their dates; pending ones only until they expire.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Confirmed => true,
            BookingStatus::Cancelled => false,
            BookingStatus::Pending => self
                .booking_expiration
                .map(|expires| now < expires)
                .unwrap_or(false),
        }
    }
}

/// Requested stay plus optional filters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Exact resort name
    pub resort: Option<String>,
    /// Substring of the unit type, any case
    pub unit_type: Option<String>,
    pub guests: Option<u32>,
    /// Lower bound on a span's minimum-stay requirement
    pub min_stay: Option<u32>,
    /// Upper bound on a span's minimum-stay requirement
    pub max_stay: Option<u32>,
}

impl SearchRequest {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
            resort: None,
            unit_type: None,
            guests: None,
            min_stay: None,
            max_stay: None,
        }
    }

    pub fn with_resort(mut self, resort: impl Into<String>) -> Self {
        self.resort = Some(resort.into());
        self
    }

    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = Some(unit_type.into());
        self
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = Some(guests);
        self
    }

    pub fn with_stay_bounds(mut self, min_stay: Option<u32>, max_stay: Option<u32>) -> Self {
        self.min_stay = min_stay;
        self.max_stay = max_stay;
        self
    }

    pub fn nights(&self) -> i64 {
        days_between(self.check_in, self.check_out)
    }
}

/// Handoff object for the booking confirmation step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub resort: String,
    pub unit_type: String,
    pub check_in: String,
    pub check_out: String,
    pub nights: u32,
    pub cost: String,
    pub date_range: String,
    pub availability_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<DraftIssue>,
}

impl BookingDraft {
    pub fn is_ready(&self) -> bool {
        self.issue.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date_range: &str) -> AvailabilityRecord {
        AvailabilityRecord {
            cancel_by_date: "8/1".to_string(),
            account: "A".to_string(),
            resort: "Dolphin Cove".to_string(),
            unit_type: "2 bedroom".to_string(),
            date_range: date_range.to_string(),
            nights: 4,
            book_date: String::new(),
            cost: "$400.00".to_string(),
            points_cost: "N/A".to_string(),
            booking_code: String::new(),
            hk: String::new(),
            usage: "3D".to_string(),
            min_stay_days: 3,
            photo: String::new(),
            link: String::new(),
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).expect("valid date")
    }

    #[test]
    fn span_from_record_resolves_dates() {
        let span = Span::from_record(&record("9/1-9/5"), date(1, 1), 2).unwrap();
        assert_eq!(span.start, date(9, 1));
        assert_eq!(span.end, date(9, 5));
        assert_eq!(span.nights, 4);
        assert_eq!(span.base_nights, 4);
        assert_eq!(span.availability_id, "A-Dolphin Cove-2 bedroom-2");
    }

    #[test]
    fn ids_keep_dashed_names_apart() {
        let left = availability_id("A-B", "C", "1 bedroom", 0);
        let right = availability_id("A", "B-C", "1 bedroom", 0);
        assert_ne!(left, right);
        assert_eq!(left, "A%2DB-C-1 bedroom-0");
        assert_ne!(
            availability_id("A%2DB", "C", "1 bedroom", 0),
            availability_id("A-B", "C", "1 bedroom", 0)
        );
    }

    #[test]
    fn latest_check_in_respects_min_stay() {
        let span = Span::from_record(&record("9/1-9/10"), date(1, 1), 0).unwrap();
        assert_eq!(span.latest_check_in(), Some(date(9, 7)));

        let short = Span::from_record(&record("9/1-9/2"), date(1, 1), 0).unwrap();
        assert_eq!(short.latest_check_in(), None);
    }

    #[test]
    fn nights_iter_is_half_open() {
        let span = Span::from_record(&record("9/1-9/3"), date(1, 1), 0).unwrap();
        let nights: Vec<_> = span.nights_iter().collect();
        assert_eq!(nights, vec![date(9, 1), date(9, 2)]);
    }

    #[test]
    fn booking_activity_follows_status() {
        let now = Utc::now();
        let mut booking = Booking {
            status: BookingStatus::Confirmed,
            booking_expiration: None,
            original_availability_id: "X".to_string(),
            booked_dates: vec![],
        };
        assert!(booking.is_active(now));

        booking.status = BookingStatus::Cancelled;
        assert!(!booking.is_active(now));

        booking.status = BookingStatus::Pending;
        assert!(!booking.is_active(now));
        booking.booking_expiration = Some(now + Duration::hours(24));
        assert!(booking.is_active(now));
        booking.booking_expiration = Some(now - Duration::hours(1));
        assert!(!booking.is_active(now));
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let json = r#"{"account":"Q","resort":"Yellowstone","unitType":"1 bedroom","dateRange":"7/1-7/4"}"#;
        let record: AvailabilityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.min_stay_days, 1);
        assert_eq!(record.points_cost, "N/A");
        assert_eq!(record.nights, 0);
    }

    #[test]
    fn record_accepts_legacy_points_costs_field() {
        let json = r#"{"account":"Q","resort":"Yellowstone","unitType":"1 bedroom","dateRange":"7/1-7/4","pointsCosts":"MM"}"#;
        let record: AvailabilityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.points_cost, "MM");
    }
}
