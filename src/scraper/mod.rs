use async_trait::async_trait;
use scraper::Html;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub mod browser;
pub mod headers;
pub mod http_client;
pub mod reveal;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::{is_allowed_domain, AppConfig};
use crate::error::{ExtractionError, ScrapeError, ScrapeResult};
use crate::extract::{
    extract_product_details, reviews::first_text, FallbackPolicy, ProductRecord, VariantResolver,
};
use crate::logging::LogContext;
use crate::{log_error, log_info};

pub use browser::{BrowserSession, PageScope};
pub use http_client::{HttpClient, StaticSession};
pub use reveal::{RevealOutcome, RevealState, ReviewRevealer};

/// Opens one fresh session per page.
#[async_trait(?Send)]
pub trait SessionFactory {
    type Session: BrowserSession;

    async fn open(&self) -> ScrapeResult<Self::Session>;

    /// Release shared browser resources once all pages are done.
    async fn shutdown(&self) {}
}

#[async_trait(?Send)]
impl SessionFactory for HttpClient {
    type Session = StaticSession;

    async fn open(&self) -> ScrapeResult<StaticSession> {
        Ok(self.session())
    }
}

#[cfg(feature = "browser")]
#[async_trait(?Send)]
impl SessionFactory for browser::PlaywrightBrowser {
    type Session = browser::PlaywrightSession;

    async fn open(&self) -> ScrapeResult<browser::PlaywrightSession> {
        self.new_session().await
    }

    async fn shutdown(&self) {
        browser::PlaywrightBrowser::shutdown(self).await
    }
}

/// Result of processing one page.
#[derive(Debug)]
pub struct PageReport {
    pub url: String,
    pub outcome: ScrapeResult<ProductRecord>,
    pub reveal_trail: Vec<RevealState>,
    pub closed_cleanly: bool,
    pub elapsed: Duration,
}

impl PageReport {
    pub fn record(&self) -> Option<&ProductRecord> {
        self.outcome.as_ref().ok()
    }
}

/// Fetch, extract, resolve, reveal and assemble for one product page.
pub struct ProductScraper {
    spider_name: String,
    allowed_domains: Vec<String>,
    navigation_timeout: Duration,
    next_data_selector: String,
    default_color_selector: String,
    reviews_enabled: bool,
    resolver: VariantResolver,
    revealer: ReviewRevealer,
    debug_dump_path: Option<PathBuf>,
}

impl ProductScraper {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            spider_name: config.target.spider_name.clone(),
            allowed_domains: config.target.allowed_domains.clone(),
            navigation_timeout: Duration::from_millis(config.request.navigation_timeout_ms),
            next_data_selector: config.selectors.next_data_script.clone(),
            default_color_selector: config.selectors.default_color.clone(),
            reviews_enabled: config.reviews.enabled,
            resolver: VariantResolver::new(FallbackPolicy::FirstInMapping),
            revealer: ReviewRevealer::new(&config.selectors, &config.reviews),
            debug_dump_path: config.export.debug_dump_path.clone(),
        }
    }

    /// Process one page. The session is consumed and closed on every path.
    pub async fn scrape_page<S: BrowserSession>(&self, session: S, url: &Url) -> PageReport {
        let start_time = Instant::now();
        let context = LogContext::new(&self.spider_name, "scrape_page").with_url(url.as_str());

        let mut scope = PageScope::new(session);
        let result = self.scrape_in_session(scope.session(), url).await;
        let closed_cleanly = scope.close().await;

        let (outcome, mut reveal_trail) = match result {
            Ok((record, reveal)) => (Ok(record), reveal.trail),
            Err(e) => (Err(e), vec![RevealState::NotAttempted]),
        };
        reveal_trail.push(RevealState::PageClosed);

        let context = context.with_duration(start_time.elapsed());
        match &outcome {
            Ok(record) => {
                let context = context
                    .with_status("ok")
                    .with_string_field("color", record.color.clone())
                    .with_number_field("reviews_count", i64::from(record.reviews_count));
                log_info!(context, "Product record extracted");
            }
            Err(e) => {
                let context = context.with_status("failed").with_error_category(e.category());
                log_error!(context, e, "Page yielded no record");
            }
        }

        PageReport {
            url: url.to_string(),
            outcome,
            reveal_trail,
            closed_cleanly,
            elapsed: start_time.elapsed(),
        }
    }

    async fn scrape_in_session<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &Url,
    ) -> ScrapeResult<(ProductRecord, RevealOutcome)> {
        session.goto(url.as_str(), self.navigation_timeout).await?;
        let html = session.content().await?;
        debug!("Rendered page {} ({} bytes)", url, html.len());

        let (next_data, details) = extract_product_details(&html, &self.next_data_selector)?;
        if let Some(path) = &self.debug_dump_path {
            dump_next_data(path, &next_data).await;
        }

        let default_color = self.default_color_text(&html);
        let selection = self
            .resolver
            .resolve(&details.variations, &default_color)
            .ok_or(ExtractionError::NoVariations)?;

        let reveal = if !self.reviews_enabled {
            debug!("Review interaction disabled");
            RevealOutcome::skipped()
        } else if !session.supports_interaction() {
            debug!("Session cannot interact, review fields stay zero");
            RevealOutcome::skipped()
        } else {
            self.revealer.reveal(session).await
        };

        let record = ProductRecord::assemble(&details, &selection, reveal.summary);
        Ok((record, reveal))
    }

    /// Visible selected-color label, empty when absent.
    fn default_color_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        first_text(&document, &self.default_color_selector).unwrap_or_default()
    }

    /// Scrape every URL with a fresh session each. Offsite URLs are skipped.
    pub async fn scrape_all<F: SessionFactory>(
        &self,
        factory: &F,
        urls: &[Url],
    ) -> Vec<PageReport> {
        let tasks = urls.iter().map(|url| async move {
            if !is_allowed_domain(&self.allowed_domains, url) {
                warn!("Filtered offsite request to: {}", url);
                return None;
            }

            match factory.open().await {
                Ok(session) => Some(self.scrape_page(session, url).await),
                Err(e) => {
                    warn!("Could not open a browser page for {}: {}", url, e);
                    Some(PageReport {
                        url: url.to_string(),
                        outcome: Err(e),
                        reveal_trail: vec![RevealState::NotAttempted],
                        closed_cleanly: true,
                        elapsed: Duration::ZERO,
                    })
                }
            }
        });

        // Futures are joined rather than spawned: sessions are not Send.
        let reports: Vec<PageReport> = futures::future::join_all(tasks).await.into_iter().flatten().collect();

        info!(
            "Scraped {} page(s), {} record(s)",
            reports.len(),
            reports.iter().filter(|r| r.record().is_some()).count()
        );
        reports
    }
}

async fn dump_next_data(path: &Path, next_data: &serde_json::Value) {
    let result = serde_json::to_string_pretty(next_data)
        .map_err(|e| ScrapeError::export(e.to_string()));
    let written = match result {
        Ok(text) => tokio::fs::write(path, text).await.map_err(ScrapeError::from),
        Err(e) => Err(e),
    };
    match written {
        Ok(()) => debug!("Dumped __NEXT_DATA__ to {}", path.display()),
        Err(e) => warn!("Failed to dump __NEXT_DATA__ to {}: {}", path.display(), e),
    }
}
