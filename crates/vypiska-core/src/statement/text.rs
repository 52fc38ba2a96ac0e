//! Whole-document text and metadata detection.

use tracing::{debug, warn};

use super::rules::patterns::{BANK_ALIAS_SETS, CONTRACTS, GENERIC_BANKS, PERIODS};
use super::rules::{normalize_date, UNKNOWN_BANK};
use crate::models::AccountInfo;
use crate::pdf::PdfSource;

/// Reads document text and pulls out bank and account metadata.
pub struct TextExtractor<'a> {
    source: &'a dyn PdfSource,
}

impl<'a> TextExtractor<'a> {
    pub fn new(source: &'a dyn PdfSource) -> Self {
        Self { source }
    }

    /// Full document text. Failures are logged and yield an empty string.
    pub fn extract_full_text(&self) -> String {
        match self.source.extract_text() {
            Ok(text) => {
                debug!("Extracted {} chars of text", text.chars().count());
                text
            }
            Err(e) => {
                warn!("Text extraction failed: {}", e);
                String::new()
            }
        }
    }
}

/// Identify the issuing bank.
///
/// Known aliases are tried first, bank by bank. Otherwise the first generic
/// legal-entity pattern that matches supplies the name. Returns
/// [`UNKNOWN_BANK`] when nothing matches.
pub fn detect_bank_name(text: &str) -> String {
    let lower = text.to_lowercase();

    if let Some((bank, _)) = BANK_ALIAS_SETS
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| alias.is_match(&lower)))
    {
        debug!("Bank detected by alias: {}", bank);
        return bank.to_string();
    }

    // Generic forms run on the original-case text so capitalised names survive.
    GENERIC_BANKS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .inspect(|bank| debug!("Bank detected by generic pattern: {}", bank))
        .unwrap_or_else(|| UNKNOWN_BANK.to_string())
}

/// Extract the statement period and contract number.
///
/// The first matching period pattern wins; its dates are normalized and the
/// period is left out if either fails. The first matching contract pattern
/// supplies the contract number.
pub fn extract_account_info(text: &str) -> AccountInfo {
    let mut info = AccountInfo::default();

    if let Some(caps) = PERIODS.iter().find_map(|pattern| pattern.captures(text)) {
        match (normalize_date(&caps[1]), normalize_date(&caps[2])) {
            (Some(start), Some(end)) => {
                info.period_start = Some(start);
                info.period_end = Some(end);
            }
            _ => debug!("Ignoring unparseable period {} - {}", &caps[1], &caps[2]),
        }
    }

    info.contract_number = CONTRACTS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .map(|caps| caps[1].to_string());

    info
}
