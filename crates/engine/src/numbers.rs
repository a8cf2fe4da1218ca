//! Scalar helpers for prices, quantities and percentages.
//!
//! Every number typed by a user goes through [`parse_number`]. The helpers on
//! top of it never fail: an unusable value falls back to zero (or to "absent"
//! for quantities), so a bad keystroke can't poison the bill.
//!
//! Monetary values are kept as unrounded `f64` while computing; rounding to 2
//! decimals happens only when presenting ([`round2`], [`format_amount`]).
//!
//! # Examples
//!
//! ```rust
//! use engine::numbers;
//!
//! assert_eq!(numbers::parse_number("10,5"), Some(10.5));
//! assert_eq!(numbers::parse_price("abc"), 0.0);
//! assert_eq!(numbers::format_amount(12.0), "12.00");
//! assert_eq!(numbers::format_quantity(1.50), "1.5");
//! ```

/// Tolerance used when comparing floating point amounts.
pub const EPSILON: f64 = 1e-9;

/// Parses a decimal string.
///
/// Accepts `.` or `,` as decimal separator, an optional leading `+`/`-` and
/// surrounding whitespace.
///
/// Validation rules:
/// - rejects empty strings
/// - rejects anything that is not digits with at most one separator
///   (`inf`, `NaN`, `1e3`, `12abc` are all refused)
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (-1.0, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (1.0, stripped)
    } else {
        (1.0, trimmed)
    };

    let rest = rest.replace(',', ".");
    if rest.is_empty() || rest == "." {
        return None;
    }

    let mut separators = 0;
    for c in rest.chars() {
        match c {
            '.' => separators += 1,
            c if c.is_ascii_digit() => {}
            _ => return None,
        }
    }
    if separators > 1 {
        return None;
    }

    let value: f64 = rest.parse().ok()?;
    value.is_finite().then_some(sign * value)
}

/// Parses a price, falling back to `0` when the input is unusable or negative.
pub fn parse_price(raw: &str) -> f64 {
    parse_number(raw).filter(|v| *v >= 0.0).unwrap_or(0.0)
}

/// Parses a quantity. Returns `None` when the value is unusable or `<= 0`,
/// which callers treat as "no share".
pub fn parse_quantity(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|v| *v > 0.0)
}

/// Parses a percentage, falling back to `0` when the input is unusable.
pub fn parse_percent(raw: &str) -> f64 {
    clamp_rate(parse_number(raw).unwrap_or(0.0))
}

/// Forces a rate into the valid `>= 0` finite range.
pub fn clamp_rate(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Returns `true` if `value` can be used as an item price.
pub fn is_valid_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a monetary value with exactly 2 decimals.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round2(value))
}

/// Formats a quantity rounded to 2 decimals without trailing zeros.
pub fn format_quantity(value: f64) -> String {
    let formatted = format!("{:.2}", round2(value));
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Compares two amounts with [`EPSILON`] tolerance.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(parse_number("10"), Some(10.0));
        assert_eq!(parse_number("10.5"), Some(10.5));
        assert_eq!(parse_number("10,50"), Some(10.5));
        assert_eq!(parse_number("-0.01"), Some(-0.01));
        assert_eq!(parse_number("+1.00"), Some(1.0));
        assert_eq!(parse_number("  2.30 "), Some(2.3));
        assert_eq!(parse_number(".5"), Some(0.5));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e3"), None);
    }

    #[test]
    fn fallbacks_to_zero() {
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price("-4"), 0.0);
        assert_eq!(parse_price("4.5"), 4.5);
        assert_eq!(parse_percent(""), 0.0);
        assert_eq!(parse_percent("-3"), 0.0);
        assert_eq!(parse_percent("8,25"), 8.25);
    }

    #[test]
    fn quantity_must_be_positive() {
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("-1"), None);
        assert_eq!(parse_quantity("x"), None);
        assert_eq!(parse_quantity("0.5"), Some(0.5));
    }

    #[test]
    fn clamp_rejects_non_finite() {
        assert_eq!(clamp_rate(f64::NAN), 0.0);
        assert_eq!(clamp_rate(f64::INFINITY), 0.0);
        assert_eq!(clamp_rate(-1.0), 0.0);
        assert_eq!(clamp_rate(15.0), 15.0);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(10.0 / 3.0), "3.33");
        assert_eq!(format_amount(2.5), "2.50");
        assert_eq!(format_quantity(1.0), "1");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(2.0 / 3.0), "0.67");
        assert_eq!(format_quantity(10.0), "10");
    }
}
