//! Date normalization for statement fields.

use chrono::NaiveDate;
use regex::Regex;

use super::patterns::{DATE_DMY_DOT, DATE_DMY_SLASH, DATE_ISO};

/// Component order of a date pattern's capture groups.
#[derive(Debug, Clone, Copy)]
enum Order {
    DayMonthYear,
    YearMonthDay,
}

/// Normalize a raw date field.
///
/// Accepts `DD.MM.YYYY`, `YYYY-MM-DD` and `DD/MM/YYYY` at the start of the
/// field. A trailing time is allowed when separated by whitespace. Returns
/// `None` when no shape matches or the calendar date does not exist.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let patterns: [(&Regex, Order); 3] = [
        (&DATE_DMY_DOT, Order::DayMonthYear),
        (&DATE_ISO, Order::YearMonthDay),
        (&DATE_DMY_SLASH, Order::DayMonthYear),
    ];

    let raw = raw.trim();
    patterns.iter().find_map(|(pattern, order)| {
        let caps = pattern.captures(raw)?;
        let (year, month, day) = match order {
            Order::DayMonthYear => (&caps[3], &caps[2], &caps[1]),
            Order::YearMonthDay => (&caps[1], &caps[2], &caps[3]),
        };
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    })
}

/// Whether the field holds a date `normalize_date` accepts.
pub fn is_date(raw: &str) -> bool {
    normalize_date(raw).is_some()
}
