//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use chrono::{NaiveDate, NaiveTime};

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a 24-hour `HH:MM` time of day
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Truncate text to at most `max_chars` characters, ending with `suffix`
///
/// Counts characters, not bytes, so multi-byte text never splits. When
/// `max_chars` cannot fit the suffix, the suffix itself is cut.
pub fn truncate_with(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let suffix_len = suffix.chars().count();
    if suffix_len >= max_chars {
        return suffix.chars().take(max_chars).collect();
    }

    let keep = max_chars.saturating_sub(suffix.chars().count());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(suffix);
    truncated
}

/// Truncate text to a maximum length with a trailing `...`
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    truncate_with(text, max_chars, "...")
}

/// Truncate a menu column with a trailing ellipsis character
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    truncate_with(text, max_chars, "…")
}
