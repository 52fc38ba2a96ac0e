//! Structured-table extraction.

mod grid;
pub mod mapping;
mod page;

pub use grid::{find_header_row, is_transaction_row, GridTables};
pub use mapping::{normalize_header, parse_table_row, RowFields};
pub use page::{find_page_header_row, PageTables};

use tracing::{debug, info};

use super::rules::patterns::PAGE_INDICATORS;
use super::{Cascade, CascadeOutcome, ExtractionContext};
use crate::models::ExtractionConfig;
use crate::pdf::PdfSource;

/// A table found on a page, as rows of cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// Page number (1-indexed).
    pub page: u32,
    /// Cell text, top row first.
    pub rows: Vec<Vec<String>>,
}

/// Pages whose text looks like it holds a transaction table.
pub fn find_transaction_pages(source: &dyn PdfSource) -> Vec<u32> {
    (1..=source.page_count())
        .filter(|&page| match source.extract_page_text(page) {
            Ok(text) => PAGE_INDICATORS.iter().any(|p| p.is_match(&text)),
            Err(e) => {
                debug!("Skipping page {} during page scan: {}", page, e);
                false
            }
        })
        .collect()
}

/// Runs the table backends over a document.
pub struct TableExtractor<'a> {
    source: &'a dyn PdfSource,
    config: &'a ExtractionConfig,
}

impl<'a> TableExtractor<'a> {
    pub fn new(source: &'a dyn PdfSource, config: &'a ExtractionConfig) -> Self {
        Self { source, config }
    }

    pub fn find_transaction_pages(&self) -> Vec<u32> {
        find_transaction_pages(self.source)
    }

    /// Pages the backends read: the detected ones, or the first
    /// `fallback_page_limit` pages when none were detected. Never past the
    /// end of the document.
    pub fn candidate_pages(&self) -> Vec<u32> {
        let page_count = self.source.page_count();
        let detected = self.find_transaction_pages();

        if detected.is_empty() {
            info!("No transaction pages detected, scanning all pages");
            (1..=self.config.fallback_page_limit.min(page_count)).collect()
        } else {
            debug!("Transaction pages: {:?}", detected);
            detected.into_iter().filter(|&p| p <= page_count).collect()
        }
    }

    /// Try each grid variant, then the page-geometry backend.
    pub fn extract_tables_universal(&self) -> CascadeOutcome {
        let pages = self.candidate_pages();
        let ctx = ExtractionContext {
            source: self.source,
            pages: &pages,
            full_text: "",
            config: self.config,
        };
        Cascade::tables(self.config).run(&ctx)
    }
}
