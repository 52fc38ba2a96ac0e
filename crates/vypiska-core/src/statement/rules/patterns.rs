//! Common regex patterns for bank statement extraction.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use super::vocabulary::{
    BANK_ALIASES, CONTRACT_PATTERNS, GENERIC_BANK_PATTERNS, PERIOD_PATTERNS, REGEX_TEMPLATES,
    TRANSACTION_PAGE_INDICATORS,
};

lazy_static! {
    // Canonical date shapes, anchored at the start of a trimmed field
    pub static ref DATE_DMY_DOT: Regex = Regex::new(
        r"^(\d{2})\.(\d{2})\.(\d{4})(?:\s|$)"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})(?:\s|T|$)"
    ).unwrap();

    pub static ref DATE_DMY_SLASH: Regex = Regex::new(
        r"^(\d{2})/(\d{2})/(\d{4})(?:\s|$)"
    ).unwrap();

    // Fields that look numeric but are not amounts
    pub static ref DATE_PREFIX: Regex = Regex::new(r"^\d{2}\.\d{2}\.\d{4}").unwrap();

    pub static ref TIME_PREFIX: Regex = Regex::new(r"^\d{2}:\d{2}").unwrap();

    pub static ref CARD_SUFFIX: Regex = Regex::new(r"^\d{4}$").unwrap();

    pub static ref CURRENCY_GLYPHS: Regex = Regex::new(r"[₽$€£¥]").unwrap();

    // Characters kept in descriptions
    pub static ref DESCRIPTION_DISALLOWED: Regex = Regex::new(r"[^\w\s\-.,():/№]").unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Table row acceptance: a date-bearing cell and an amount-like cell
    pub static ref ROW_DATE: Regex = Regex::new(r"^\d{2}\.\d{2}\.\d{4}").unwrap();

    pub static ref ROW_AMOUNT: Regex = Regex::new(r"[+-]?\d+[,.]?\d*").unwrap();
}

lazy_static! {
    // Vocabulary tables compiled once
    pub static ref BANK_ALIAS_SETS: Vec<(&'static str, Vec<Regex>)> = BANK_ALIASES
        .iter()
        .map(|(bank, aliases)| (*bank, compile_all(aliases, true, false)))
        .collect();

    pub static ref GENERIC_BANKS: Vec<Regex> = compile_all(GENERIC_BANK_PATTERNS, true, false);

    pub static ref PERIODS: Vec<Regex> = compile_all(PERIOD_PATTERNS, true, false);

    pub static ref CONTRACTS: Vec<Regex> = compile_all(CONTRACT_PATTERNS, true, false);

    pub static ref PAGE_INDICATORS: Vec<Regex> =
        compile_all(TRANSACTION_PAGE_INDICATORS, true, false);

    pub static ref TEMPLATES: Vec<Regex> = compile_all(REGEX_TEMPLATES, false, true);
}

fn compile_all(patterns: &[&str], case_insensitive: bool, multi_line: bool) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(case_insensitive)
                .multi_line(multi_line)
                .dot_matches_new_line(multi_line)
                .build()
                .unwrap()
        })
        .collect()
}

/// Cells shorter than this count as bare numbers when no rouble sign is present.
pub const BARE_AMOUNT_CHAR_LIMIT: usize = 20;
