//! Numeric value and reference range parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Two decimals joined by a hyphen or en dash: `4.0-10.0`, `3,5 – 5,0`.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+(?:[.,][0-9]+)?)\s*[-\u{2013}]\s*(-?[0-9]+(?:[.,][0-9]+)?)")
        .expect("Invalid range regex")
});

/// First decimal in a string; comma or dot as the separator.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[0-9]+(?:[.,][0-9]+)?").expect("Invalid number regex"));

/// Extracts a single number from a raw value string.
///
/// Returns `None` for blank input, for input containing a two-number range,
/// and for input without any digits.
pub fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() || RANGE_PATTERN.is_match(text) {
        return None;
    }
    NUMBER_PATTERN
        .find(text)
        .and_then(|found| parse_decimal(found.as_str()))
}

/// Parses a reference range into `(low, high)`.
///
/// The range may sit anywhere in the text (`4.0-10.0 x10^9/L`). Text without
/// a two-number range yields `(None, None)`; bounds are never reordered.
pub fn parse_range(raw: &str) -> (Option<f64>, Option<f64>) {
    let text = raw.trim();
    if text.is_empty() {
        return (None, None);
    }
    match RANGE_PATTERN.captures(text) {
        Some(caps) => (
            caps.get(1).and_then(|m| parse_decimal(m.as_str())),
            caps.get(2).and_then(|m| parse_decimal(m.as_str())),
        ),
        None => (None, None),
    }
}

/// Digit runs that overflow `f64` count as malformed.
fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
