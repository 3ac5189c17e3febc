//! Typed coercion of raw export cells.
//!
//! Every coercer is total: malformed input becomes `None` rather than an
//! error, because vendor exports routinely leave cells blank or fill them
//! with placeholders. A missing date or price is a legitimate absence, not a
//! failed row.

use crate::import::sanitize::sanitize_text;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Minimum digit count for a phone number to be stored.
pub const MIN_PHONE_DIGITS: usize = 7;

static DATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("Invalid date regex")
    })
}

/// Trim a cell and sanitize it; blank cells are absent.
pub fn coerce_string(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let sanitized = sanitize_text(trimmed);
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized.to_string())
    }
}

/// Parse a `month-day-year` date with a four digit year.
///
/// Accepts `/` or `-` as the separator. Impossible dates such as `02/30/2024`
/// are absent, as is every other shape.
pub fn coerce_date(raw: Option<&str>) -> Option<NaiveDate> {
    let trimmed = raw?.trim();
    let caps = date_regex().captures(trimmed)?;

    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Keep digits, signs and, for decimals, the decimal point.
fn numeric_chars(raw: &str, keep_point: bool) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+') || (keep_point && *c == '.'))
        .collect()
}

/// Parse a decimal after stripping currency symbols, grouping and units.
///
/// `"$1,250,000"` becomes `1250000.0`; `"N/A"` and `""` are absent. The
/// stripped text must parse as a whole: `"1.2.3"` or a range like `"12-15"`
/// is absent rather than read as its leading number.
pub fn coerce_decimal(raw: Option<&str>) -> Option<f64> {
    let cleaned = numeric_chars(raw?, true);
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse an integer after stripping everything but digits and sign.
///
/// The decimal point is stripped too, so `"2.5"` is 25. Values outside the
/// `i32` range are absent.
pub fn coerce_int(raw: Option<&str>) -> Option<i32> {
    let cleaned = numeric_chars(raw?, false);
    let value: i64 = cleaned.parse().ok()?;
    i32::try_from(value).ok()
}

/// Strip a phone cell down to digits.
///
/// Returns `None` when fewer than [`MIN_PHONE_DIGITS`] digits remain; such
/// numbers are dropped rather than stored with a flag.
pub fn normalize_phone(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        None
    } else {
        Some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_trims_and_sanitizes() {
        assert_eq!(coerce_string(Some("  Jane\0 Doe ")), Some("Jane Doe".to_string()));
        assert_eq!(coerce_string(Some("   ")), None);
        assert_eq!(coerce_string(Some("\u{1}\u{2}")), None);
        assert_eq!(coerce_string(None), None);
    }

    #[test]
    fn date_accepts_month_day_year() {
        assert_eq!(
            coerce_date(Some("3/15/2024")),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            coerce_date(Some(" 12-01-1999 ")),
            NaiveDate::from_ymd_opt(1999, 12, 1)
        );
    }

    #[test]
    fn date_rejects_other_shapes() {
        assert_eq!(coerce_date(Some("2024-03-15")), None);
        assert_eq!(coerce_date(Some("3/15/24")), None);
        assert_eq!(coerce_date(Some("02/30/2024")), None);
        assert_eq!(coerce_date(Some("soon")), None);
        assert_eq!(coerce_date(Some("")), None);
        assert_eq!(coerce_date(None), None);
    }

    #[test]
    fn decimal_strips_formatting() {
        assert_eq!(coerce_decimal(Some("$1,250,000")), Some(1_250_000.0));
        assert_eq!(coerce_decimal(Some("2.5 ba")), Some(2.5));
        assert_eq!(coerce_decimal(Some("-3.25")), Some(-3.25));
        assert_eq!(coerce_decimal(Some("N/A")), None);
        assert_eq!(coerce_decimal(Some("")), None);
        assert_eq!(coerce_decimal(Some("1.2.3")), None);
    }

    #[test]
    fn decimal_rejects_ambiguous_numbers() {
        assert_eq!(coerce_decimal(Some("12-15")), None);
        assert_eq!(coerce_decimal(Some("+-")), None);
    }

    #[test]
    fn int_strips_everything_but_digits_and_sign() {
        assert_eq!(coerce_int(Some("1,850 sqft")), Some(1850));
        assert_eq!(coerce_int(Some("2.5")), Some(25));
        assert_eq!(coerce_int(Some("1,850.00")), Some(185_000));
        assert_eq!(coerce_int(Some("-12")), Some(-12));
        assert_eq!(coerce_int(Some("1998")), Some(1998));
        assert_eq!(coerce_int(Some("--")), None);
        assert_eq!(coerce_int(Some("")), None);
        assert_eq!(coerce_int(Some("99999999999")), None);
    }

    #[test]
    fn phone_requires_seven_digits() {
        assert_eq!(
            normalize_phone(Some("(775) 555-0100")),
            Some("7755550100".to_string())
        );
        assert_eq!(normalize_phone(Some("555-010")), Some("5550100".to_string()));
        assert_eq!(normalize_phone(Some("555-01")), None);
        assert_eq!(normalize_phone(Some("n/a")), None);
        assert_eq!(normalize_phone(None), None);
    }
}
