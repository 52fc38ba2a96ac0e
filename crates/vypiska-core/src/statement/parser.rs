//! Statement parser: runs the whole pipeline over one document.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use super::tables::TableExtractor;
use super::text::{detect_bank_name, extract_account_info, TextExtractor};
use super::{Cascade, ExtractionContext};
use crate::error::Result;
use crate::models::{ParseResult, Transaction, VypiskaConfig};
use crate::pdf::{PdfExtractor, PdfSource};

/// Parses bank statements into transactions.
///
/// Each call owns its document and state, so separate documents can be
/// parsed on separate threads.
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    config: VypiskaConfig,
}

impl StatementParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given configuration.
    pub fn with_config(config: VypiskaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VypiskaConfig {
        &self.config
    }

    /// Parse a statement file.
    pub fn parse_file(&self, path: &Path) -> Result<ParseResult> {
        info!("Parsing statement: {}", path.display());
        let data = std::fs::read(path)?;
        self.parse_bytes(&data)
    }

    /// Parse a statement held in memory.
    ///
    /// Fails only when the document cannot be opened.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ParseResult> {
        let mut extractor =
            PdfExtractor::new().with_empty_password(self.config.pdf.try_empty_password);
        extractor.load(data)?;
        Ok(self.parse_document(&extractor))
    }

    /// Parse an already-loaded document.
    pub fn parse_document(&self, source: &dyn PdfSource) -> ParseResult {
        let start = Instant::now();
        let config = &self.config.extraction;

        let full_text = TextExtractor::new(source).extract_full_text();
        let bank_name = detect_bank_name(&full_text);
        let account_info = extract_account_info(&full_text);
        debug!("Bank: {}, account info: {:?}", bank_name, account_info);

        let pages = TableExtractor::new(source, config).candidate_pages();
        let ctx = ExtractionContext {
            source,
            pages: &pages,
            full_text: &full_text,
            config,
        };
        let outcome = Cascade::standard(config).run(&ctx);

        let transactions = dedup_and_sort(outcome.transactions, config.dedup_description_chars);

        info!(
            "Parsed {} transactions ({} rejected) in {}ms",
            transactions.len(),
            outcome.rejected.len(),
            start.elapsed().as_millis()
        );

        let mut result = ParseResult::new(bank_name, account_info, transactions, outcome.rejected);
        result.document_pages = source.page_count();
        result.winning_strategy = outcome.winner;
        result
    }
}

/// Drop repeats of an earlier transaction, then order by date.
///
/// The first occurrence of each key survives; the sort is stable so equal
/// dates keep their extraction order.
pub fn dedup_and_sort(transactions: Vec<Transaction>, description_chars: usize) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.dedup_key(description_chars)))
        .collect();

    unique.sort_by_key(|tx| tx.date);
    unique
}
