//! Core library for bank statement parsing.
//!
//! This crate provides:
//! - PDF processing (text, positioned text chunks, ruling lines)
//! - Table detection with two independent backends
//! - Pattern-based fallback extraction over plain text
//! - Field normalizers for dates, amounts and descriptions
//! - Bank and account metadata detection

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{ExtractionError, PdfError, Result, VypiskaError};
pub use models::{
    AccountInfo, Category, ExtractionConfig, ExtractionMethod, ExtractorKind, GridVariant,
    PageTableConfig, ParseResult, PdfConfig, RejectedRow, Transaction, VypiskaConfig,
};
pub use pdf::{LayoutDocument, PageLayout, PdfExtractor, PdfSource};
pub use statement::{
    detect_bank_name, extract_account_info, extract_with_patterns, Cascade, ExtractionStrategy,
    StatementParser,
};
