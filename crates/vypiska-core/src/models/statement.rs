//! Bank statement data models.

use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single accepted transaction.
///
/// Only ever constructed once both the date and the amount normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date.
    pub date: NaiveDate,

    /// Signed amount, sign preserved from the source document.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Cleaned description text.
    pub description: String,

    /// Keyword-derived category.
    #[serde(rename = "type")]
    pub category: Category,

    /// Extraction strategy that produced this record.
    pub method: ExtractionMethod,

    /// Card suffix captured next to the transaction, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
}

impl Transaction {
    /// Key used to collapse duplicates: date, amount and the first
    /// `description_chars` characters of the description.
    pub fn dedup_key(&self, description_chars: usize) -> (NaiveDate, Decimal, String) {
        (
            self.date,
            self.amount.normalize(),
            self.description.chars().take(description_chars).collect(),
        )
    }
}

/// Transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Incoming funds.
    Income,
    /// Purchases and bill payments.
    Payment,
    /// Transfers between accounts.
    Transfer,
    /// Cash withdrawals.
    Withdrawal,
    /// Bank fees and commissions.
    Fee,
    /// Anything else.
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Payment => "payment",
            Category::Transfer => "transfer",
            Category::Withdrawal => "withdrawal",
            Category::Fee => "fee",
            Category::Other => "other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of an accepted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Read from a detected table.
    Table,
    /// Matched by a text pattern.
    Regex,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Table => "table",
            ExtractionMethod::Regex => "regex",
        }
    }
}

/// Extractor that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Primary table backend (stream/lattice grid detection).
    GridTables,
    /// Secondary table backend (text-line geometry).
    PageTables,
    /// Pattern-based fallback.
    Regex,
}

impl ExtractorKind {
    /// Method tag for transactions produced by this extractor.
    pub fn method(&self) -> ExtractionMethod {
        match self {
            ExtractorKind::GridTables | ExtractorKind::PageTables => ExtractionMethod::Table,
            ExtractorKind::Regex => ExtractionMethod::Regex,
        }
    }
}

/// A candidate that could not be turned into a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Extractor that produced the candidate.
    pub source: ExtractorKind,

    /// Human-readable cause.
    pub reason: String,

    /// Page the row was read from (table extractors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Normalized header row of the table the row came from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    /// Raw cell values of the row (table extractors).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row: Vec<String>,

    /// Raw capture groups (pattern extractor).
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<String>,
}

impl RejectedRow {
    pub fn new(source: ExtractorKind, reason: impl Into<String>) -> Self {
        Self {
            source,
            reason: reason.into(),
            page: None,
            headers: Vec::new(),
            row: Vec::new(),
            captures: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_headers(mut self, headers: &[String]) -> Self {
        self.headers = headers.to_vec();
        self
    }

    pub fn with_row(mut self, row: &[String]) -> Self {
        self.row = row.to_vec();
        self
    }

    pub fn with_captures(mut self, captures: Vec<String>) -> Self {
        self.captures = captures;
        self
    }
}

/// Document-level account metadata. Missing fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Start of the statement period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,

    /// End of the statement period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,

    /// Contract or account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.period_start.is_none() && self.period_end.is_none() && self.contract_number.is_none()
    }
}

/// Complete output of one statement parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Detected bank name, or the unknown-bank sentinel.
    pub bank_name: String,

    /// Period and contract metadata.
    pub account_info: AccountInfo,

    /// Number of unique transactions.
    pub transactions_count: usize,

    /// Unique transactions sorted by date.
    pub transactions: Vec<Transaction>,

    /// Number of rejected candidates.
    pub rejected_rows_count: usize,

    /// Rejected candidates in the order they were produced.
    pub rejected_rows: Vec<RejectedRow>,

    /// When this result was generated.
    pub extraction_timestamp: DateTime<Local>,

    /// Number of pages in the source document.
    #[serde(default)]
    pub document_pages: u32,

    /// Cascade step that produced the transactions.
    #[serde(default)]
    pub winning_strategy: Option<String>,
}

impl ParseResult {
    /// Assemble a result, deriving both counts from the lists.
    pub fn new(
        bank_name: String,
        account_info: AccountInfo,
        transactions: Vec<Transaction>,
        rejected_rows: Vec<RejectedRow>,
    ) -> Self {
        Self {
            bank_name,
            account_info,
            transactions_count: transactions.len(),
            transactions,
            rejected_rows_count: rejected_rows.len(),
            rejected_rows,
            extraction_timestamp: Local::now(),
            document_pages: 0,
            winning_strategy: None,
        }
    }
}
