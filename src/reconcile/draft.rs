use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::dates::{days_between, format_date_range, format_display_date};
use crate::error::DraftIssue;
use crate::models::{BookingDraft, Span};

/// Parse `$1,234.50` style amounts.
pub fn parse_currency(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned).ok()
}

pub fn format_currency(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// Price `nights` at the per-night rate implied by `cost` over `base_nights`.
pub fn prorate(cost: &str, base_nights: u32, nights: u32) -> Result<Decimal, DraftIssue> {
    if base_nights == 0 {
        return Err(DraftIssue::ZeroBaseNights);
    }
    let total = parse_currency(cost).ok_or_else(|| DraftIssue::MalformedCost {
        cost: cost.to_string(),
    })?;
    let amount = total
        .checked_div(Decimal::from(base_nights))
        .and_then(|rate| rate.checked_mul(Decimal::from(nights)))
        .ok_or_else(|| DraftIssue::CostOverflow {
            cost: cost.to_string(),
        })?;
    Ok(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Build the confirmation handoff for a stay of `[start, end)` in `span`.
///
/// Pricing failures do not abort; the draft comes back with a zero cost and an issue set.
pub fn build_draft(span: &Span, start: NaiveDate, end: NaiveDate) -> BookingDraft {
    let nights = u32::try_from(days_between(start, end)).unwrap_or(0);

    let priced = if nights == 0 {
        Err(DraftIssue::EmptyStay)
    } else {
        prorate(&span.base_cost, span.base_nights, nights)
    };

    let (cost, issue) = match priced {
        Ok(amount) => (format_currency(amount), None),
        Err(issue) => {
            warn!(availability_id = %span.availability_id, %issue, "Booking draft not priced");
            (format_currency(Decimal::ZERO), Some(issue))
        }
    };

    BookingDraft {
        resort: span.resort.clone(),
        unit_type: span.unit_type.clone(),
        check_in: format_display_date(start),
        check_out: format_display_date(end),
        nights,
        cost,
        date_range: format_date_range(start, end),
        availability_id: span.availability_id.clone(),
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).expect("valid date")
    }

    fn span(cost: &str, base_nights: u32) -> Span {
        Span {
            availability_id: "X".to_string(),
            account: "A".to_string(),
            resort: "Dolphin Cove".to_string(),
            unit_type: "2 bedroom".to_string(),
            start: date(9, 1),
            end: date(9, 10),
            date_range: "9/1-9/10".to_string(),
            nights: 9,
            base_cost: cost.to_string(),
            base_nights,
            min_stay_days: 1,
            cancel_by_date: String::new(),
            booking_code: String::new(),
            photo: String::new(),
            link: String::new(),
        }
    }

    #[test]
    fn prorates_from_original_night_count() {
        let draft = build_draft(&span("$300.00", 3), date(9, 2), date(9, 4));
        assert!(draft.is_ready());
        assert_eq!(draft.cost, "$200.00");
        assert_eq!(draft.nights, 2);
        assert_eq!(draft.check_in, "9/2/2026");
        assert_eq!(draft.check_out, "9/4/2026");
        assert_eq!(draft.date_range, "9/2-9/4");
        assert_eq!(draft.availability_id, "X");
    }

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_currency("$1,366.60"), Some(Decimal::new(136660, 2)));
        assert_eq!(parse_currency("N/A"), None);
        let draft = build_draft(&span("$1,200", 4), date(9, 1), date(9, 2));
        assert_eq!(draft.cost, "$300.00");
    }

    #[test]
    fn proration_is_linear() {
        for (cost, base) in [("$366.60", 3), ("$1,000.00", 7), ("$179", 1)] {
            let one = prorate(cost, base, 1).unwrap();
            for n in 1..=14u32 {
                let total = prorate(cost, base, n).unwrap();
                let exact = parse_currency(cost).unwrap() / Decimal::from(base) * Decimal::from(n);
                assert!((total - exact).abs() <= Decimal::new(1, 2));
                if base == 1 || cost == "$366.60" {
                    assert_eq!(total, one * Decimal::from(n));
                }
            }
        }
    }

    #[test]
    fn flags_unpriceable_drafts() {
        let zero = build_draft(&span("$300.00", 0), date(9, 2), date(9, 4));
        assert_eq!(zero.issue, Some(DraftIssue::ZeroBaseNights));
        assert_eq!(zero.cost, "$0.00");

        let inverted = build_draft(&span("$300.00", 3), date(9, 4), date(9, 4));
        assert_eq!(inverted.issue, Some(DraftIssue::EmptyStay));
        assert_eq!(inverted.nights, 0);

        let garbage = build_draft(&span("call us", 3), date(9, 2), date(9, 4));
        assert!(matches!(garbage.issue, Some(DraftIssue::MalformedCost { .. })));
        assert!(!garbage.is_ready());
    }

    #[test]
    fn oversized_cost_is_flagged_not_fatal() {
        let huge = "$79,228,162,514,264,337,593,543,950,335";
        assert_eq!(
            prorate(huge, 1, 2),
            Err(DraftIssue::CostOverflow {
                cost: huge.to_string()
            })
        );

        let draft = build_draft(&span(huge, 1), date(9, 2), date(9, 4));
        assert!(matches!(draft.issue, Some(DraftIssue::CostOverflow { .. })));
        assert_eq!(draft.cost, "$0.00");
    }

    #[test]
    fn serializes_for_confirmation_step() {
        let draft = build_draft(&span("$300.00", 3), date(9, 2), date(9, 4));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["unitType"], "2 bedroom");
        assert_eq!(json["availabilityId"], "X");
        assert!(json.get("issue").is_none());
    }
}
