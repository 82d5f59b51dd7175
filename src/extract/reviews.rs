use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::{
    parse_bracketed_count_or, parse_f64_or, StringUtils, DEFAULT_REVIEW_COUNT, DEFAULT_REVIEW_SCORE,
};

/// Review metadata revealed by the review interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub count: u32,
    pub score: f64,
}

impl Default for ReviewSummary {
    fn default() -> Self {
        Self {
            count: DEFAULT_REVIEW_COUNT,
            score: DEFAULT_REVIEW_SCORE,
        }
    }
}

impl ReviewSummary {
    /// Count from a label such as `"Коментари [60]"`.
    pub fn count_from_text(text: &str) -> u32 {
        parse_bracketed_count_or(text, DEFAULT_REVIEW_COUNT)
    }

    /// Score from a label such as `"4.5"`.
    pub fn score_from_text(text: &str) -> f64 {
        parse_f64_or(text, DEFAULT_REVIEW_SCORE)
    }
}

/// Read count and score from the page markup captured after the reveal.
///
/// Missing elements or invalid selectors give zero values.
pub fn parse_review_summary(html: &str, count_selector: &str, score_selector: &str) -> ReviewSummary {
    let document = Html::parse_document(html);

    let count = first_text(&document, count_selector)
        .map(|text| ReviewSummary::count_from_text(&text))
        .unwrap_or(DEFAULT_REVIEW_COUNT);

    let score = first_text(&document, score_selector)
        .map(|text| ReviewSummary::score_from_text(&text))
        .unwrap_or(DEFAULT_REVIEW_SCORE);

    debug!("Parsed review summary: count={}, score={}", count, score);
    ReviewSummary { count, score }
}

/// Collapsed text of the first element matching `selector`.
pub fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| StringUtils::collapse_whitespace(&element.text().collect::<String>()))
}
