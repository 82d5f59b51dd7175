/// Utility functions and helpers
use regex::Regex;
use std::sync::OnceLock;

pub mod string_utils;

pub use string_utils::StringUtils;

/// Default used when a price field is absent or unparseable.
pub const DEFAULT_PRICE: f64 = 0.0;

/// Default used when the review count cannot be read.
pub const DEFAULT_REVIEW_COUNT: u32 = 0;

/// Default used when the review score cannot be read.
pub const DEFAULT_REVIEW_SCORE: f64 = 0.0;

/// Parse a decimal number, accepting a comma as decimal separator.
///
/// A comma counts as a decimal separator only when the text has no `.` and
/// the comma is followed by one or two digits, so `"39,99"` is 39.99 while a
/// grouped `"1,299"` is rejected. Blank, non-numeric and non-finite input
/// yields `None`.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = StringUtils::non_blank(text)?;
    let normalized = match trimmed.split_once(',') {
        Some((whole, fraction))
            if !trimmed.contains('.')
                && (1..=2).contains(&fraction.len())
                && fraction.chars().all(|c| c.is_ascii_digit()) =>
        {
            format!("{}.{}", whole, fraction)
        }
        Some(_) => return None,
        None => trimmed.to_string(),
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a decimal number or fall back to `default`.
pub fn parse_f64_or(text: &str, default: f64) -> f64 {
    parse_decimal(text).unwrap_or(default)
}

/// First bracketed integer in `text` (`"Коментари [60]"` gives 60), or `default`.
pub fn parse_bracketed_count_or(text: &str, default: u32) -> u32 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\[\s*(\d+)\s*\]").unwrap());

    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(default)
}
