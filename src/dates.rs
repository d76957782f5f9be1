//! Conversion between spreadsheet date-range strings and calendar dates.
//!
//! Rows carry ranges such as `9/23-9/25` without a year. They are resolved once,
//! against an explicit reference date, and everything downstream works on
//! [`NaiveDate`] values.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{DateRangeError, ValidationError};

#[derive(Debug, Clone, Copy)]
struct MonthDay {
    month: u32,
    day: u32,
    year: Option<i32>,
}

impl MonthDay {
    fn parse(text: &str) -> Result<Self, DateRangeError> {
        let malformed = || DateRangeError::Malformed(text.trim().to_string());
        let mut parts = text.trim().split('/');

        let month = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let day = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let year = match parts.next() {
            Some(p) => {
                let y = p.trim().parse::<i32>().map_err(|_| malformed())?;
                Some(if y < 100 { 2000 + y } else { y })
            }
            None => None,
        };
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self { month, day, year })
    }

    fn resolve(&self, fallback_year: i32, source: &str) -> Result<NaiveDate, DateRangeError> {
        let year = self.year.unwrap_or(fallback_year);
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .ok_or_else(|| DateRangeError::OutOfRange(source.trim().to_string()))
    }
}

/// Parse `M/D-M/D` (either side may carry `/YYYY`) into a start and end date.
///
/// Year-less starts take the reference date's year. A year-less end that would land
/// before the start rolls into the next year, so `12/28-1/3` crosses New Year.
pub fn parse_date_range(
    text: &str,
    reference: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), DateRangeError> {
    let trimmed = text.trim();
    let (start_text, end_text) = trimmed
        .split_once('-')
        .ok_or_else(|| DateRangeError::MissingSeparator(trimmed.to_string()))?;

    let start_part = MonthDay::parse(start_text)?;
    let end_part = MonthDay::parse(end_text)?;

    let start = start_part.resolve(reference.year(), start_text)?;
    let end_year = match end_part.year {
        Some(year) => year,
        None if (end_part.month, end_part.day) < (start.month(), start.day()) => start.year() + 1,
        None => start.year(),
    };
    let end = end_part.resolve(end_year, end_text)?;

    if end < start {
        return Err(DateRangeError::Inverted(trimmed.to_string()));
    }

    Ok((start, end))
}

/// Render a span as `M/D-M/D`.
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}/{}-{}/{}",
        start.month(),
        start.day(),
        end.month(),
        end.day()
    )
}

/// Render a single date as `M/D/YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Parse a user-entered date, either `YYYY-MM-DD` or `M/D/YYYY`.
pub fn parse_request_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDates);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .map_err(|_| ValidationError::BadDate(trimmed.to_string()))
}

/// Parse a requested stay given either an explicit check-out or a night count.
pub fn parse_stay(
    check_in: &str,
    check_out: Option<&str>,
    nights: Option<u32>,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let start = parse_request_date(check_in)?;
    let end = match (check_out, nights) {
        (Some(text), _) => parse_request_date(text)?,
        (None, Some(0)) => return Err(ValidationError::CheckOutNotAfterCheckIn),
        (None, Some(n)) => start
            .checked_add_days(Days::new(u64::from(n)))
            .ok_or_else(|| ValidationError::BadDate(format!("{} + {} nights", start, n)))?,
        (None, None) => return Err(ValidationError::MissingDates),
    };
    Ok((start, end))
}

/// Whole days from `start` to `end`; negative when `end` comes first.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_year_less_range_against_reference_year() {
        let (start, end) = parse_date_range("9/23-9/25", date(2026, 1, 1)).unwrap();
        assert_eq!(start, date(2026, 9, 23));
        assert_eq!(end, date(2026, 9, 25));
    }

    #[test]
    fn rolls_year_less_end_into_next_year() {
        let (start, end) = parse_date_range("12/28-1/3", date(2026, 6, 1)).unwrap();
        assert_eq!(start, date(2026, 12, 28));
        assert_eq!(end, date(2027, 1, 3));
    }

    #[test]
    fn rolls_into_leap_day_of_next_year() {
        let (start, end) = parse_date_range("12/28-2/29", date(2027, 6, 1)).unwrap();
        assert_eq!(start, date(2027, 12, 28));
        assert_eq!(end, date(2028, 2, 29));

        assert!(matches!(
            parse_date_range("12/28-2/29", date(2026, 6, 1)),
            Err(DateRangeError::OutOfRange(_))
        ));
    }

    #[test]
    fn honours_explicit_years() {
        let (start, end) = parse_date_range("12/30/25-1/2/2026", date(2030, 1, 1)).unwrap();
        assert_eq!(start, date(2025, 12, 30));
        assert_eq!(end, date(2026, 1, 2));
    }

    #[test]
    fn rejects_bad_ranges() {
        let reference = date(2026, 1, 1);
        assert!(matches!(
            parse_date_range("9/23", reference),
            Err(DateRangeError::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_date_range("9/x-9/25", reference),
            Err(DateRangeError::Malformed(_))
        ));
        assert!(matches!(
            parse_date_range("13/1-13/4", reference),
            Err(DateRangeError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_date_range("9/5/2026-9/1/2026", reference),
            Err(DateRangeError::Inverted(_))
        ));
    }

    #[test]
    fn stay_end_comes_from_check_out_or_nights() {
        assert_eq!(
            parse_stay("2026-09-03", Some("9/7/2026"), None),
            Ok((date(2026, 9, 3), date(2026, 9, 7)))
        );
        assert_eq!(
            parse_stay("2026-12-30", None, Some(4)),
            Ok((date(2026, 12, 30), date(2027, 1, 3)))
        );
        assert_eq!(
            parse_stay("2026-09-03", None, Some(0)),
            Err(ValidationError::CheckOutNotAfterCheckIn)
        );
        assert_eq!(
            parse_stay("2026-09-03", None, None),
            Err(ValidationError::MissingDates)
        );
    }

    #[test]
    fn formats_for_display() {
        assert_eq!(format_date_range(date(2026, 9, 1), date(2026, 9, 10)), "9/1-9/10");
        assert_eq!(format_display_date(date(2026, 9, 3)), "9/3/2026");
    }

    #[test]
    fn parses_request_dates() {
        assert_eq!(parse_request_date("2026-09-03").unwrap(), date(2026, 9, 3));
        assert_eq!(parse_request_date("9/3/2026").unwrap(), date(2026, 9, 3));
        assert_eq!(parse_request_date("  "), Err(ValidationError::MissingDates));
        assert!(matches!(
            parse_request_date("tomorrow"),
            Err(ValidationError::BadDate(_))
        ));
    }
}
