use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::models::{Booking, Span};

/// Drop every span that has a night held by an active booking.
///
/// Spans are kept or dropped whole; a partially booked span is never split.
pub fn filter_conflicts(spans: Vec<Span>, bookings: &[Booking], now: DateTime<Utc>) -> Vec<Span> {
    let mut booked: HashMap<&str, HashSet<NaiveDate>> = HashMap::new();
    let mut active = 0usize;
    for booking in bookings.iter().filter(|b| b.is_active(now)) {
        active += 1;
        booked
            .entry(booking.original_availability_id.as_str())
            .or_default()
            .extend(booking.booked_dates.iter().copied());
    }

    let input = spans.len();
    let kept: Vec<Span> = spans
        .into_iter()
        .filter(|span| match booked.get(span.availability_id.as_str()) {
            Some(dates) => !span.nights_iter().any(|night| dates.contains(&night)),
            None => true,
        })
        .collect();

    debug!(
        input,
        dropped = input - kept.len(),
        active_bookings = active,
        "Filtered booked availability"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::models::{AvailabilityRecord, BookingStatus};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).expect("valid date")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn span(id: &str) -> Span {
        let record = AvailabilityRecord {
            cancel_by_date: "8/1".to_string(),
            account: "A".to_string(),
            resort: "Dolphin Cove".to_string(),
            unit_type: "2 bedroom".to_string(),
            date_range: "9/1-9/5".to_string(),
            nights: 4,
            book_date: String::new(),
            cost: "$400.00".to_string(),
            points_cost: "N/A".to_string(),
            booking_code: String::new(),
            hk: String::new(),
            usage: String::new(),
            min_stay_days: 1,
            photo: String::new(),
            link: String::new(),
        };
        let mut span = Span::from_record(&record, date(1, 1), 0).unwrap();
        span.availability_id = id.to_string();
        span
    }

    fn booking(status: BookingStatus, id: &str, dates: Vec<NaiveDate>) -> Booking {
        Booking {
            status,
            booking_expiration: None,
            original_availability_id: id.to_string(),
            booked_dates: dates,
        }
    }

    #[test]
    fn confirmed_booking_drops_whole_span() {
        let kept = filter_conflicts(
            vec![span("X"), span("Y")],
            &[booking(BookingStatus::Confirmed, "X", vec![date(9, 3)])],
            now(),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].availability_id, "Y");
    }

    #[test]
    fn cancelled_booking_never_suppresses() {
        let kept = filter_conflicts(
            vec![span("X")],
            &[booking(BookingStatus::Cancelled, "X", vec![date(9, 1), date(9, 2)])],
            now(),
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn pending_booking_holds_until_expiration() {
        let mut pending = booking(BookingStatus::Pending, "X", vec![date(9, 2)]);

        pending.booking_expiration = Some(now() + Duration::hours(24));
        assert!(filter_conflicts(vec![span("X")], &[pending.clone()], now()).is_empty());

        pending.booking_expiration = Some(now() - Duration::minutes(1));
        assert_eq!(filter_conflicts(vec![span("X")], &[pending], now()).len(), 1);
    }

    #[test]
    fn checkout_day_is_not_a_conflict() {
        let kept = filter_conflicts(
            vec![span("X")],
            &[booking(BookingStatus::Confirmed, "X", vec![date(9, 5), date(8, 31)])],
            now(),
        );
        assert_eq!(kept.len(), 1);
    }
}
