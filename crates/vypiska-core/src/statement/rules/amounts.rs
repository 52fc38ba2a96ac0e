//! Amount normalization for statement fields.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{CARD_SUFFIX, CURRENCY_GLYPHS, DATE_PREFIX, TIME_PREFIX};

/// Normalize a raw amount field into a signed decimal.
///
/// Dates, times and bare four-digit card suffixes are rejected. Currency
/// glyphs and whitespace are dropped, `,` becomes the decimal point and an
/// en-dash counts as a minus. When both signs appear anywhere in the field
/// the amount is negative.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty()
        || DATE_PREFIX.is_match(raw)
        || TIME_PREFIX.is_match(raw)
        || CARD_SUFFIX.is_match(raw)
    {
        return None;
    }

    let cleaned: String = CURRENCY_GLYPHS
        .replace_all(raw, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            ',' => '.',
            '–' => '-',
            other => other,
        })
        .collect();

    // A '-' anywhere wins over '+'.
    let negative = cleaned.contains('-');
    let digits = cleaned.trim_start_matches(['+', '-']);

    let value = parse_unsigned(digits)?;
    Some(if negative { -value } else { value })
}

/// Whether the field holds an amount `normalize_amount` accepts.
pub fn is_amount(raw: &str) -> bool {
    normalize_amount(raw).is_some()
}

/// Parse `123`, `123.45`, `.5` or `123.` as a non-negative decimal.
fn parse_unsigned(digits: &str) -> Option<Decimal> {
    let valid = digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());
    if !valid {
        return None;
    }

    let digits = digits.trim_end_matches('.');
    let padded;
    let digits = if digits.starts_with('.') {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };

    Decimal::from_str(digits).ok()
}
