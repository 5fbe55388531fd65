// Field coercion and formatting helpers.
//
// This module centralizes all the "dirty" sheet-cell handling so the
// aggregator can assume typed values. Nothing here fails: malformed cells
// degrade to a visible default in the return type.
use crate::types::Row;
use num_format::{Locale, ToFormattedString};

/// Look up the first of `names` present on the row.
///
/// Used for headers whose exact spelling drifted between exports, such as
/// the reporting CM column with and without its leading space.
pub fn field<'a>(row: &'a Row, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| row.get(*name).map(String::as_str))
}

/// Parse a counter cell like `"1,250"` into an integer.
///
/// - Strips thousands separators.
/// - Contributes 0 when the field is absent, empty, or anything other than
///   ASCII digits remains (signs, decimals, whitespace, text).
pub fn parse_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let digits = raw.replace(',', "");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    // Digit strings too long for u64 are treated like any other bad cell.
    digits.parse::<u64>().unwrap_or(0)
}

pub fn coerce_int(row: &Row, field_name: &str) -> u64 {
    parse_count(row.get(field_name).map(String::as_str))
}

/// Trimmed cell text, or `default` when the field is absent.
pub fn coerce_string(row: &Row, field_name: &str, default: &str) -> String {
    row.get(field_name)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

pub fn classify_status(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators, e.g.
    // `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g. `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn counts_strip_thousands_separators() {
        assert_eq!(parse_count(Some("1,000")), 1000);
        assert_eq!(parse_count(Some("12,345,678")), 12_345_678);
        assert_eq!(parse_count(Some("42")), 42);
    }

    #[test]
    fn malformed_counts_default_to_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(Some(",")), 0);
        assert_eq!(parse_count(Some("-5")), 0);
        assert_eq!(parse_count(Some("3.5")), 0);
        assert_eq!(parse_count(Some(" 7")), 0);
        assert_eq!(parse_count(Some("N/A")), 0);
        assert_eq!(parse_count(Some("99999999999999999999999")), 0);
    }

    #[test]
    fn coerce_int_reads_named_field() {
        let r = row(&[("Total leads dialled", "2,500")]);
        assert_eq!(coerce_int(&r, "Total leads dialled"), 2500);
        assert_eq!(coerce_int(&r, "Total connnected calls"), 0);
    }

    #[test]
    fn coerce_string_trims_or_defaults() {
        let r = row(&[("Client", "  Acme  "), ("Bot Name", "   ")]);
        assert_eq!(coerce_string(&r, "Client", "x"), "Acme");
        assert_eq!(coerce_string(&r, "Bot Name", "x"), "");
        assert_eq!(coerce_string(&r, "Missing", "fallback"), "fallback");
    }

    #[test]
    fn blank_status_is_unknown() {
        assert_eq!(classify_status("  Live "), "Live");
        assert_eq!(classify_status("   "), "Unknown");
        assert_eq!(classify_status(""), "Unknown");
    }

    #[test]
    fn field_prefers_first_present_name() {
        let r = row(&[("reporting CM", "Sam")]);
        assert_eq!(field(&r, &[" reporting CM", "reporting CM"]), Some("Sam"));
        assert_eq!(field(&r, &["nope"]), None);
    }

    #[test]
    fn rates_guard_zero_denominators() {
        assert_eq!(percentage(250, 1000), 25.0);
        assert_eq!(percentage(10, 0), 0.0);
        assert_eq!(ratio(9, 3), 3.0);
        assert_eq!(ratio(9, 0), 0.0);
        assert_eq!(round2(33.33333), 33.33);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 1), "-1,500.0");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855u64), "9,855");
    }
}
