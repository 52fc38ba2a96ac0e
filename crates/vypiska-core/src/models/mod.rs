//! Data models for statements and configuration.

pub mod config;
pub mod statement;

pub use config::{ExtractionConfig, GridVariant, PageTableConfig, PdfConfig, VypiskaConfig};
pub use statement::{
    AccountInfo, Category, ExtractionMethod, ExtractorKind, ParseResult, RejectedRow, Transaction,
};
