//! Transaction extraction from bank statements.
//!
//! Extraction runs as a cascade of [`ExtractionStrategy`] steps: table
//! backends first, then text patterns. The first step that yields any
//! transaction wins; rejected candidates from every step that ran are kept.

mod fallback;
mod parser;
pub mod rules;
pub mod tables;
mod text;

pub use fallback::{extract_with_patterns, PatternTemplate};
pub use parser::{dedup_and_sort, StatementParser};
pub use tables::{find_transaction_pages, GridTables, PageTables, TableExtractor};
pub use text::{detect_bank_name, extract_account_info, TextExtractor};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::{
    ExtractionConfig, ExtractionMethod, ExtractorKind, RejectedRow, Transaction,
};
use crate::pdf::PdfSource;
use rules::{classify, normalize_description};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Inputs shared by every step of one cascade run.
pub struct ExtractionContext<'a> {
    /// Document being parsed.
    pub source: &'a dyn PdfSource,
    /// Candidate pages for table backends, already clamped to the document.
    pub pages: &'a [u32],
    /// Full document text for pattern templates.
    pub full_text: &'a str,
    /// Extraction settings.
    pub config: &'a ExtractionConfig,
}

/// Output of a single extraction attempt.
#[derive(Debug, Default)]
pub struct Extraction {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRow>,
}

/// Assemble an accepted transaction. The category is derived from the raw
/// description, the stored description is the cleaned one.
pub(crate) fn build_transaction(
    date: NaiveDate,
    amount: Decimal,
    raw_description: &str,
    method: ExtractionMethod,
    card: Option<String>,
    description_max_chars: usize,
) -> Transaction {
    Transaction {
        date,
        amount,
        description: normalize_description(raw_description, description_max_chars),
        category: classify(raw_description),
        method,
        card,
    }
}

/// One step of the extraction cascade.
pub trait ExtractionStrategy {
    /// Label used in logs and in [`crate::ParseResult::winning_strategy`].
    fn name(&self) -> String;

    /// Extractor family this step belongs to. Tags its rejected rows.
    fn kind(&self) -> ExtractorKind;

    /// Try to extract transactions.
    fn attempt(&self, ctx: &ExtractionContext<'_>) -> Result<Extraction>;
}

/// Combined output of a cascade run.
#[derive(Debug, Default)]
pub struct CascadeOutcome {
    /// Transactions from the winning step.
    pub transactions: Vec<Transaction>,
    /// Rejected rows from every step that ran, in execution order.
    pub rejected: Vec<RejectedRow>,
    /// Name of the winning step.
    pub winner: Option<String>,
}

/// Ordered list of strategies, tried until one produces transactions.
pub struct Cascade {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Cascade {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Every configured grid variant, then the page-geometry backend.
    pub fn tables(config: &ExtractionConfig) -> Self {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = config
            .grid_variants
            .iter()
            .map(|variant| Box::new(GridTables::new(*variant)) as Box<dyn ExtractionStrategy>)
            .collect();
        strategies.push(Box::new(PageTables::new(config.page_tables.clone())));
        Self::new(strategies)
    }

    /// The text pattern templates, most specific first.
    pub fn patterns() -> Self {
        Self::new(
            PatternTemplate::all()
                .into_iter()
                .map(|t| Box::new(t) as Box<dyn ExtractionStrategy>)
                .collect(),
        )
    }

    /// Table backends followed by text patterns.
    pub fn standard(config: &ExtractionConfig) -> Self {
        let mut cascade = Self::tables(config);
        cascade.strategies.extend(Self::patterns().strategies);
        cascade
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order, stopping at the first with transactions.
    ///
    /// A failing strategy is logged and skipped.
    pub fn run(&self, ctx: &ExtractionContext<'_>) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::default();

        for strategy in &self.strategies {
            let name = strategy.name();
            match strategy.attempt(ctx) {
                Ok(extraction) => {
                    debug!(
                        "{} ({:?}): {} transactions, {} rejected",
                        name,
                        strategy.kind(),
                        extraction.transactions.len(),
                        extraction.rejected.len()
                    );
                    outcome.rejected.extend(extraction.rejected);
                    if !extraction.transactions.is_empty() {
                        info!("Found {} transactions via {}", extraction.transactions.len(), name);
                        outcome.transactions = extraction.transactions;
                        outcome.winner = Some(name);
                        return outcome;
                    }
                }
                Err(e) => warn!("Extraction step failed: {}", e),
            }
        }

        debug!("No extraction step produced transactions");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::pdf::LayoutDocument;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    struct Fixed {
        name: &'static str,
        transactions: usize,
        rejected: usize,
        fail: bool,
    }

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn kind(&self) -> ExtractorKind {
            ExtractorKind::Regex
        }

        fn attempt(&self, _ctx: &ExtractionContext<'_>) -> Result<Extraction> {
            if self.fail {
                return Err(ExtractionError::stage(self.name, "boom"));
            }
            let tx = Transaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: Decimal::ONE,
                description: self.name.to_string(),
                category: Category::Other,
                method: ExtractionMethod::Regex,
                card: None,
            };
            Ok(Extraction {
                transactions: vec![tx; self.transactions],
                rejected: (0..self.rejected)
                    .map(|_| RejectedRow::new(ExtractorKind::Regex, self.name))
                    .collect(),
            })
        }
    }

    fn step(name: &'static str, transactions: usize, rejected: usize, fail: bool) -> Box<dyn ExtractionStrategy> {
        Box::new(Fixed {
            name,
            transactions,
            rejected,
            fail,
        })
    }

    #[test]
    fn test_first_productive_step_wins() {
        let doc = LayoutDocument::default();
        let config = ExtractionConfig::default();
        let ctx = ExtractionContext {
            source: &doc,
            pages: &[],
            full_text: "",
            config: &config,
        };

        let cascade = Cascade::new(vec![
            step("empty", 0, 1, false),
            step("broken", 0, 0, true),
            step("winner", 2, 1, false),
            step("never", 5, 5, false),
        ]);
        let outcome = cascade.run(&ctx);

        assert_eq!(outcome.winner.as_deref(), Some("winner"));
        assert_eq!(outcome.transactions.len(), 2);
        let reasons: Vec<_> = outcome.rejected.iter().map(|r| r.reason.as_str()).collect();
        assert_eq!(reasons, ["empty", "winner"]);
    }

    #[test]
    fn test_standard_cascade_shape() {
        let config = ExtractionConfig::default();

        assert_eq!(Cascade::tables(&config).len(), 5);
        assert_eq!(Cascade::patterns().len(), 3);
        assert_eq!(Cascade::standard(&config).len(), 8);
    }
}
