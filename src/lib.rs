//! H&M product page scraper
//!
//! Renders a product page in a headless browser, reads the embedded
//! `__NEXT_DATA__` product payload, resolves the variant matching the
//! visible color, reveals the review summary and writes one flat record
//! per page to a JSON feed.

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod extract;
pub mod logging;
pub mod scraper;
pub mod utils;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::{HmScraper, RunSummary};
pub use crate::error::{ScrapeError, ScrapeResult};
pub use crate::extract::ProductRecord;
