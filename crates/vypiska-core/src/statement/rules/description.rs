//! Description cleanup.

use super::patterns::{DESCRIPTION_DISALLOWED, WHITESPACE_RUN};

/// Default description length cap, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Collapse whitespace, drop characters outside the allowed set and cap the
/// length at `max_chars` characters.
pub fn normalize_description(raw: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    DESCRIPTION_DISALLOWED
        .replace_all(&collapsed, "")
        .chars()
        .take(max_chars)
        .collect()
}
