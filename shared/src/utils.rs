//! # Shared Utility Functions
//!
//! Amount formatting used by the content script, the popup and the preview tool.
//!
//! ## Amount Formatting
//!
//! Prices on the target site use a decimal comma and exactly two fractional
//! digits, with no thousands separators:
//! - [`format_amount`] - `14.289` → `"14,29"` (half-up)
//! - [`format_price`] - `14.289, "USD"` → `"14,29 USD"`
//! - [`parse_amount`] - `"12,99"` → `12.99`
//! - [`parse_leading_float`] - lenient leading-number parse for sort keys
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::{format_amount, parse_amount};
//!
//! let amount = parse_amount("12,99").unwrap();
//! assert_eq!(format_amount(amount * 1.10), "14,29");
//! ```

/// Format an amount with a decimal comma and two fractional digits.
///
/// Rounds half away from zero on the cent.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_amount;
///
/// assert_eq!(format_amount(10.555), "10,56");
/// assert_eq!(format_amount(3.0), "3,00");
/// ```
pub fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}{},{:02}", sign, cents / 100, cents % 100)
}

/// Format an amount followed by a space and the currency code.
pub fn format_price(value: f64, currency: &str) -> String {
    format!("{} {}", format_amount(value), currency)
}

/// Parse a decimal-comma amount such as `"12,99"`.
///
/// Trailing whitespace and a currency symbol are tolerated, so a full match
/// like `"12,99 €"` parses as well.
pub fn parse_amount(text: &str) -> Option<f64> {
    let numeric: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.replacen(',', ".", 1).parse().ok()
}

/// Parse the longest leading decimal number of `text`, ignoring leading
/// whitespace and any trailing garbage (`"80%"` → `80.0`, `"14.29 USD"` → `14.29`).
///
/// Returns `None` when the text does not start with a number.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    trimmed[..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_rounds_half_up() {
        assert_eq!(format_amount(10.555), "10,56");
        assert_eq!(format_amount(12.99 * 1.10), "14,29");
        assert_eq!(format_amount(0.004), "0,00");
        assert_eq!(format_amount(1234.5), "1234,50");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(14.289, "USD"), "14,29 USD");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12,99"), Some(12.99));
        assert_eq!(parse_amount("12,99 €"), Some(12.99));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("80%"), Some(80.0));
        assert_eq!(parse_leading_float("  14.29 USD"), Some(14.29));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("-2.5px"), Some(-2.5));
        assert_eq!(parse_leading_float("n/a"), None);
        assert_eq!(parse_leading_float(""), None);
    }
}
