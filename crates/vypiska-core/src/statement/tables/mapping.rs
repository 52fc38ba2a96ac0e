//! Header-to-field mapping shared by both table backends.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{ExtractionMethod, Transaction};
use crate::statement::build_transaction;
use crate::statement::rules::patterns::{CARD_SUFFIX, WHITESPACE_RUN};
use crate::statement::rules::vocabulary::{
    AMOUNT_KEYS, DATE_KEYS, DESCRIPTION_FALLBACK_MIN_CHARS, DESCRIPTION_KEYS, NON_AMOUNT_KEYS,
    REASON_MISSING_AMOUNT, REASON_MISSING_DATE, REASON_MISSING_DESCRIPTION,
};
use crate::statement::rules::{is_amount, is_date, normalize_amount, normalize_date};

/// Lower-case a header cell and collapse its whitespace.
pub fn normalize_header(raw: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&raw.trim().to_lowercase(), " ")
        .into_owned()
}

/// Cell values of one row keyed by header.
///
/// A repeated header keeps its first position and takes the last value.
#[derive(Debug, Clone, Default)]
pub struct RowFields {
    entries: Vec<(String, String)>,
}

impl RowFields {
    pub fn new(headers: &[String], row: &[String]) -> Self {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(headers.len());
        for (header, value) in headers.iter().zip(row) {
            match entries.iter_mut().find(|(h, _)| h == header) {
                Some(entry) => entry.1 = value.clone(),
                None => entries.push((header.clone(), value.clone())),
            }
        }
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How far a ranked key reaches into the headers that contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    /// Every header containing the key, until a value is accepted.
    AllHeaders,
    /// Only the first header containing the key.
    FirstHeader,
}

/// An ordered key list: the first key that yields an accepted value wins.
struct RankedRule {
    keys: &'static [&'static str],
    reach: Reach,
    accept: fn(&str) -> bool,
}

impl RankedRule {
    fn resolve<'a>(&self, fields: &'a RowFields) -> Option<&'a str> {
        self.keys.iter().find_map(|key| {
            let mut candidates = fields
                .iter()
                .filter(|(header, _)| header.to_lowercase().contains(key))
                .map(|(_, value)| value);
            match self.reach {
                Reach::AllHeaders => candidates.find(|value| (self.accept)(value)),
                Reach::FirstHeader => candidates.next().filter(|value| (self.accept)(value)),
            }
        })
    }
}

const AMOUNT_RULE: RankedRule = RankedRule {
    keys: AMOUNT_KEYS,
    reach: Reach::AllHeaders,
    accept: is_amount,
};

const DATE_RULE: RankedRule = RankedRule {
    keys: DATE_KEYS,
    reach: Reach::AllHeaders,
    accept: is_date,
};

const DESCRIPTION_RULE: RankedRule = RankedRule {
    keys: DESCRIPTION_KEYS,
    reach: Reach::FirstHeader,
    accept: |value| !value.is_empty(),
};

fn fallback_amount(fields: &RowFields) -> Option<Decimal> {
    fields
        .iter()
        .filter(|(header, _)| {
            let header = header.to_lowercase();
            !NON_AMOUNT_KEYS.iter().any(|key| header.contains(key))
        })
        .find_map(|(_, value)| normalize_amount(value))
}

fn fallback_date(fields: &RowFields) -> Option<NaiveDate> {
    fields.iter().find_map(|(_, value)| normalize_date(value))
}

/// Longest value that is not a date, an amount or a card suffix.
fn fallback_description(fields: &RowFields) -> Option<&str> {
    fields
        .iter()
        .map(|(_, value)| value)
        .filter(|value| {
            value.chars().count() > DESCRIPTION_FALLBACK_MIN_CHARS
                && !is_date(value)
                && !is_amount(value)
                && !CARD_SUFFIX.is_match(value)
        })
        .fold(None, |best: Option<&str>, value| match best {
            Some(b) if b.chars().count() >= value.chars().count() => Some(b),
            _ => Some(value),
        })
}

/// Map one table row onto a transaction.
///
/// On failure returns the reason, listing every missing field.
pub fn parse_table_row(
    headers: &[String],
    row: &[String],
    description_max_chars: usize,
) -> Result<Transaction, String> {
    let fields = RowFields::new(headers, row);

    let amount = AMOUNT_RULE
        .resolve(&fields)
        .and_then(normalize_amount)
        .or_else(|| fallback_amount(&fields));
    let date = DATE_RULE
        .resolve(&fields)
        .and_then(normalize_date)
        .or_else(|| fallback_date(&fields));
    let description = DESCRIPTION_RULE
        .resolve(&fields)
        .or_else(|| fallback_description(&fields));

    match (date, amount, description) {
        (Some(date), Some(amount), Some(description)) => Ok(build_transaction(
            date,
            amount,
            description,
            ExtractionMethod::Table,
            None,
            description_max_chars,
        )),
        (date, amount, description) => {
            let mut reasons = Vec::new();
            if date.is_none() {
                reasons.push(REASON_MISSING_DATE);
            }
            if amount.is_none() {
                reasons.push(REASON_MISSING_AMOUNT);
            }
            if description.is_none() {
                reasons.push(REASON_MISSING_DESCRIPTION);
            }
            Err(reasons.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Дата\nОПЕРАЦИИ  "), "дата операции");
    }

    #[test]
    fn test_row_fields_duplicate_headers() {
        let fields = RowFields::new(
            &strings(&["сумма", "описание", "сумма"]),
            &strings(&["1", "текст", "2"]),
        );
        let entries: Vec<_> = fields.iter().collect();

        assert_eq!(entries, [("сумма", "2"), ("описание", "текст")]);
    }

    #[test]
    fn test_row_fields_short_row() {
        let fields = RowFields::new(&strings(&["дата", "сумма", "описание"]), &strings(&["01.01.2024"]));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_priority_keys() {
        let headers = strings(&[
            "дата обработки",
            "дата и время операции",
            "сумма в валюте карты",
            "сумма в валюте операции",
            "описание операции",
        ]);
        let row = strings(&["02.03.2024", "01.03.2024 12:00", "-100,00", "-1 250,50 ₽", "Оплата в магазине"]);

        let tx = parse_table_row(&headers, &row, 300).unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(tx.amount, Decimal::from_str("-1250.50").unwrap());
        assert_eq!(tx.description, "Оплата в магазине");
        assert_eq!(tx.category, Category::Payment);
        assert_eq!(tx.method, ExtractionMethod::Table);
    }

    #[test]
    fn test_amount_fallback_skips_non_amount_columns() {
        let headers = strings(&["дата", "номер карты", "итого", "комментарий"]);
        let row = strings(&["05.04.2024", "1234", "750", "Перевод по договору"]);

        let tx = parse_table_row(&headers, &row, 300).unwrap();
        assert_eq!(tx.amount, Decimal::from(750));
        assert_eq!(tx.description, "Перевод по договору");
    }

    #[test]
    fn test_description_fallback_prefers_first_longest() {
        let headers = strings(&["a", "b", "c", "d"]);
        let row = strings(&["05.04.2024", "100", "Первый текст", "Второй текст"]);

        let tx = parse_table_row(&headers, &row, 300).unwrap();
        assert_eq!(tx.description, "Первый текст");
    }

    #[test]
    fn test_empty_priority_description_moves_on() {
        let headers = strings(&["дата", "сумма", "описание", "назначение"]);
        let row = strings(&["05.04.2024", "100", "", "Оплата связи"]);

        let tx = parse_table_row(&headers, &row, 300).unwrap();
        assert_eq!(tx.description, "Оплата связи");
    }

    #[test]
    fn test_missing_fields_reason() {
        let headers = strings(&["дата операции", "сумма операции", "описание"]);
        let row = strings(&["31.02.2024", "100,00", "Оплата"]);

        assert_eq!(parse_table_row(&headers, &row, 300).unwrap_err(), "Отсутствует дата");

        let row = strings(&["", "", ""]);
        assert_eq!(
            parse_table_row(&headers, &row, 300).unwrap_err(),
            "Отсутствует дата; Отсутствует сумма; Отсутствует описание"
        );
    }
}
