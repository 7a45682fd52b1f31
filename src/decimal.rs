//! Lenient number parsing for user input and fixed-point formatting of amounts.
//!
//! Form fields arrive as raw strings that may be empty, half typed or use a
//! comma as the decimal separator. Anything that does not start with a number
//! counts as zero so totals never fail and never become NaN.

/// Parse the longest numeric prefix of `input` as a decimal number.
///
/// Leading and trailing whitespace is ignored and a comma is accepted as the
/// decimal separator. Empty input, input without a numeric prefix and values
/// that overflow to infinity all parse as `0.0`.
pub fn parse_lenient_decimal(input: &str) -> f64 {
    let normalized = input.trim().replace(',', ".");
    let prefix = numeric_prefix(&normalized, true);

    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parse the longest integer prefix of `input`, e.g. "3.7" parses as 3.
///
/// Returns 0 for empty or non-numeric input.
pub fn parse_lenient_integer(input: &str) -> i64 {
    let trimmed = input.trim();
    let prefix = numeric_prefix(trimmed, false);

    prefix.parse::<i64>().unwrap_or(0)
}

/// Format `value` as a fixed-point string with two decimal places.
///
/// Negative zero is rendered as "0.00".
pub fn format_fixed(value: f64) -> String {
    let formatted = format!("{value:.2}");

    if formatted == "-0.00" {
        "0.00".to_owned()
    } else {
        formatted
    }
}

fn numeric_prefix(text: &str, allow_fraction: bool) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let integer_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digit_count = end - integer_start;

    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }

        let fraction_digits = fraction_end - fraction_start;
        if digit_count > 0 || fraction_digits > 0 {
            end = fraction_end;
            digit_count += fraction_digits;
        }
    }

    if digit_count == 0 {
        return "";
    }

    if allow_fraction && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+') | Some(b'-')) {
            exponent_end += 1;
        }

        let exponent_digits_start = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }

        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    &text[..end]
}
