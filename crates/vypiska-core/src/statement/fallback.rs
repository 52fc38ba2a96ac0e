//! Text pattern fallback, used when no table yields transactions.

use regex::Captures;
use tracing::debug;

use super::rules::patterns::TEMPLATES;
use super::rules::vocabulary::REASON_REGEX_UNPARSED;
use super::rules::{normalize_amount, normalize_date};
use super::{build_transaction, Cascade, CascadeOutcome, Extraction, ExtractionContext, ExtractionStrategy, Result};
use crate::models::{ExtractionConfig, ExtractorKind, RejectedRow};
use crate::pdf::LayoutDocument;

/// One regex template as a cascade step.
#[derive(Debug, Clone, Copy)]
pub struct PatternTemplate {
    index: usize,
}

impl PatternTemplate {
    /// Every template, most specific first.
    pub fn all() -> Vec<PatternTemplate> {
        (0..TEMPLATES.len()).map(|index| PatternTemplate { index }).collect()
    }
}

/// Fields of one match before normalization.
struct Candidate<'t> {
    date: &'t str,
    amount: &'t str,
    description: String,
    card: &'t str,
}

impl<'t> Candidate<'t> {
    /// Assign groups by arity: dual-timestamp rows carry eight groups,
    /// two-amount rows five, keyword rows four.
    fn from_groups(groups: &[&'t str]) -> Option<Self> {
        let candidate = match *groups {
            [date, _, _, _, amount1, amount2, description, card] => Candidate {
                date,
                amount: first_nonzero(amount1, amount2),
                description: description.to_string(),
                card,
            },
            [date, amount1, amount2, description, card] => Candidate {
                date,
                amount: first_nonzero(amount1, amount2),
                description: description.to_string(),
                card,
            },
            [date, amount, ref middle @ .., card] if groups.len() >= 4 => Candidate {
                date,
                amount,
                description: middle.join(" "),
                card,
            },
            _ => return None,
        };
        Some(candidate)
    }
}

fn first_nonzero<'t>(first: &'t str, second: &'t str) -> &'t str {
    if !first.is_empty() && first != "0" { first } else { second }
}

fn groups<'t>(caps: &Captures<'t>) -> Vec<&'t str> {
    caps.iter()
        .skip(1)
        .map(|m| m.map(|m| m.as_str()).unwrap_or_default())
        .collect()
}

impl ExtractionStrategy for PatternTemplate {
    fn name(&self) -> String {
        format!("regex:template-{}", self.index + 1)
    }

    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Regex
    }

    fn attempt(&self, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        let mut matches = 0;

        for caps in TEMPLATES[self.index].captures_iter(ctx.full_text) {
            matches += 1;
            let groups = groups(&caps);
            let Some(candidate) = Candidate::from_groups(&groups) else {
                continue;
            };

            match (normalize_date(candidate.date), normalize_amount(candidate.amount)) {
                (Some(date), Some(amount)) => extraction.transactions.push(build_transaction(
                    date,
                    amount,
                    &candidate.description,
                    self.kind().method(),
                    Some(candidate.card.to_string()),
                    ctx.config.description_max_chars,
                )),
                _ => extraction.rejected.push(
                    RejectedRow::new(self.kind(), REASON_REGEX_UNPARSED)
                        .with_captures(groups.iter().map(|g| g.to_string()).collect()),
                ),
            }
        }

        debug!("{}: {} matches", self.name(), matches);
        Ok(extraction)
    }
}

/// Run the pattern templates alone over already-extracted text.
pub fn extract_with_patterns(text: &str, config: &ExtractionConfig) -> CascadeOutcome {
    let empty = LayoutDocument::default();
    let ctx = ExtractionContext {
        source: &empty,
        pages: &[],
        full_text: text,
        config,
    };
    Cascade::patterns().run(&ctx)
}
