//! Presentation helpers
//!
//! Currency, dates and notification icons as the surface shows them.
//! Currency follows Ukrainian grouping (no-break space, decimal comma); dates
//! use day-first `dd.mm.yyyy`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Currency sign prefixed to amounts
pub const CURRENCY_SIGN: &str = "₴";

const GROUP_SEPARATOR: char = '\u{a0}';

/// Placeholder for a missing or unreadable date
pub const MISSING: &str = "-";

/// Format a UAH amount: `₴1 234,5`
///
/// At most two fraction digits, trailing zeros dropped. A missing or
/// non-finite amount renders as `₴0`.
#[must_use]
pub fn format_currency(amount: Option<f64>) -> String {
    let amount = amount.filter(|a| a.is_finite()).unwrap_or(0.0);
    let cents = (amount.abs() * 100.0).round();
    if cents == 0.0 {
        return format!("{CURRENCY_SIGN}0");
    }

    // Whole UAH and kopecks from the rounded cent count
    let whole = (cents / 100.0).trunc();
    let fraction = cents - whole * 100.0;

    let mut out = String::from(CURRENCY_SIGN);
    if amount < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(&format!("{whole:.0}")));
    if fraction > 0.0 {
        let digits = format!("{fraction:02.0}");
        out.push(',');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Parse the timestamp shapes the API produces
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `dd.mm.yyyy`, or `-`
#[must_use]
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map_or_else(|| MISSING.to_string(), |dt| dt.format("%d.%m.%Y").to_string())
}

/// `dd.mm.yyyy, hh:mm`, or `-`
#[must_use]
pub fn format_datetime(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp).map_or_else(
        || MISSING.to_string(),
        |dt| dt.format("%d.%m.%Y, %H:%M").to_string(),
    )
}

/// Icon for a notification type tag
#[must_use]
pub fn notification_icon(kind: &str) -> &'static str {
    match kind {
        "requisites" => "💳",
        "confirmed" => "✅",
        "rejected" => "❌",
        "expired" => "⏰",
        "referral" => "🎉",
        _ => "🔔",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(Some(1_234_567.0)), "₴1\u{a0}234\u{a0}567");
        assert_eq!(format_currency(Some(999.0)), "₴999");
    }

    #[test]
    fn test_currency_fraction_digits() {
        assert_eq!(format_currency(Some(1234.5)), "₴1\u{a0}234,5");
        assert_eq!(format_currency(Some(10.257)), "₴10,26");
        assert_eq!(format_currency(Some(3.999)), "₴4");
        assert_eq!(format_currency(Some(0.05)), "₴0,05");
    }

    #[test]
    fn test_currency_missing() {
        assert_eq!(format_currency(None), "₴0");
        assert_eq!(format_currency(Some(f64::NAN)), "₴0");
    }

    #[test]
    fn test_currency_negative() {
        assert_eq!(format_currency(Some(-1500.0)), "₴-1\u{a0}500");
    }

    #[test]
    fn test_dates() {
        assert_eq!(format_date(Some("2024-05-01T10:07:00")), "01.05.2024");
        assert_eq!(
            format_datetime(Some("2024-05-01T10:07:00.123456")),
            "01.05.2024, 10:07"
        );
        assert_eq!(
            format_datetime(Some("2024-12-31T23:59:00+02:00")),
            "31.12.2024, 23:59"
        );
        assert_eq!(format_date(Some("2024-05-01")), "01.05.2024");
    }

    #[test]
    fn test_bad_dates() {
        assert_eq!(format_date(None), "-");
        assert_eq!(format_datetime(Some("yesterday")), "-");
    }

    #[test]
    fn test_notification_icons() {
        assert_eq!(notification_icon("requisites"), "💳");
        assert_eq!(notification_icon("referral"), "🎉");
        assert_eq!(notification_icon("something_new"), "🔔");
    }
}
