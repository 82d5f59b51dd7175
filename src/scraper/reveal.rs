use std::time::Duration;
use tracing::{debug, warn};

use super::browser::BrowserSession;
use crate::config::{ReviewConfig, SelectorConfig};
use crate::extract::{parse_review_summary, ReviewSummary};

/// Progress of the review interaction on one page.
///
/// `NotAttempted → Clicked → (Revealed | TimedOut) → ContentCaptured`, with
/// `PageClosed` appended by the page scope on every path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    NotAttempted,
    Clicked,
    Revealed,
    TimedOut,
    ContentCaptured,
    PageClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOutcome {
    pub summary: ReviewSummary,
    pub trail: Vec<RevealState>,
}

impl RevealOutcome {
    pub fn state(&self) -> RevealState {
        self.trail.last().copied().unwrap_or(RevealState::NotAttempted)
    }

    pub fn skipped() -> Self {
        Self {
            summary: ReviewSummary::default(),
            trail: vec![RevealState::NotAttempted],
        }
    }

    fn push(&mut self, state: RevealState) {
        debug!("Review reveal: {:?}", state);
        self.trail.push(state);
    }
}

/// Clicks the review trigger and reads count and score from the result.
#[derive(Debug, Clone)]
pub struct ReviewRevealer {
    trigger: String,
    revealed: String,
    count: String,
    score: String,
    timeout: Duration,
}

impl ReviewRevealer {
    pub fn new(selectors: &SelectorConfig, reviews: &ReviewConfig) -> Self {
        Self {
            trigger: selectors.review_trigger.clone(),
            revealed: selectors.review_revealed.clone(),
            count: selectors.review_count.clone(),
            score: selectors.review_score.clone(),
            timeout: Duration::from_millis(reviews.reveal_timeout_ms),
        }
    }

    /// Best effort: never fails, missing data becomes zero values.
    pub async fn reveal<S>(&self, session: &mut S) -> RevealOutcome
    where
        S: BrowserSession + ?Sized,
    {
        let mut outcome = RevealOutcome::skipped();

        if !session.supports_interaction() {
            debug!("Session cannot interact, skipping review reveal");
            return outcome;
        }

        match session.click(&self.trigger, self.timeout).await {
            Ok(()) => {
                outcome.push(RevealState::Clicked);
                match session.wait_for_selector(&self.revealed, self.timeout).await {
                    Ok(true) => outcome.push(RevealState::Revealed),
                    Ok(false) => {
                        warn!(
                            "Reviews did not appear within {}ms, capturing page as is",
                            self.timeout.as_millis()
                        );
                        outcome.push(RevealState::TimedOut);
                    }
                    Err(e) => {
                        warn!("Waiting for reviews failed: {}", e);
                        outcome.push(RevealState::TimedOut);
                    }
                }
            }
            Err(e) => warn!("Failed to click review trigger '{}': {}", self.trigger, e),
        }

        match session.content().await {
            Ok(html) => {
                outcome.push(RevealState::ContentCaptured);
                outcome.summary = parse_review_summary(&html, &self.count, &self.score);
            }
            Err(e) => warn!("Failed to capture page content after review interaction: {}", e),
        }

        outcome
    }
}
