use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::export::{ExportStats, FeedExporter};
use crate::logging::{LogContext, RequestIdGenerator};
use crate::scraper::{ProductScraper, SessionFactory};
use crate::{log_info, log_warn};

/// Totals for one crawl.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub pages_attempted: usize,
    pub records_emitted: usize,
    pub pages_failed: usize,
    pub export: ExportStats,
}

/// Top-level crawl: start URLs in, feed file out.
pub struct HmScraper {
    config: AppConfig,
    scraper: ProductScraper,
}

impl HmScraper {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let scraper = ProductScraper::new(&config);
        Ok(Self { config, scraper })
    }

    /// Start URLs as parsed URLs, in configured order.
    pub fn start_urls(&self) -> Result<Vec<Url>> {
        self.config
            .target
            .start_urls
            .iter()
            .map(|raw| Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid start URL '{}': {}", raw, e)))
            .collect()
    }

    /// Launch the configured backend and run the crawl.
    #[cfg(feature = "browser")]
    pub async fn run(&self) -> Result<RunSummary> {
        let browser = crate::scraper::browser::PlaywrightBrowser::launch(&self.config.request).await?;
        let summary = self.run_with(&browser).await;
        SessionFactory::shutdown(&browser).await;
        summary
    }

    /// Run the crawl over plain HTTP; review fields stay zero.
    #[cfg(not(feature = "browser"))]
    pub async fn run(&self) -> Result<RunSummary> {
        info!("Browser support not compiled in, fetching pages over HTTP only");
        let client = crate::scraper::HttpClient::new(&self.config.request)?;
        self.run_with(&client).await
    }

    /// Run the crawl with any session source. Page failures never abort the run.
    pub async fn run_with<F: SessionFactory>(&self, factory: &F) -> Result<RunSummary> {
        let start_time = Instant::now();
        let run_id = RequestIdGenerator::generate();
        let urls = self.start_urls()?;

        info!(
            "Starting spider '{}' ({}) with {} start URL(s)",
            self.config.target.spider_name,
            run_id,
            urls.len()
        );

        let reports = self.scraper.scrape_all(factory, &urls).await;

        let mut exporter = FeedExporter::new(&self.config.export);
        let mut pages_failed = 0;
        for report in reports.iter() {
            match &report.outcome {
                Ok(record) => exporter.emit(record.clone()),
                Err(_) => pages_failed += 1,
            }
            if !report.closed_cleanly {
                warn!("Page for {} did not close cleanly", report.url);
            }
        }

        let records_emitted = exporter.records().len();
        let export = exporter.finish().await?;

        let context = LogContext::new(&self.config.target.spider_name, "run")
            .with_request_id(&run_id)
            .with_duration(start_time.elapsed())
            .with_number_field("records", records_emitted as i64)
            .with_number_field("failed", pages_failed as i64);
        if pages_failed > 0 {
            let context = context.with_status("partial");
            log_warn!(context, "Spider finished with failed pages");
        } else {
            let context = context.with_status("ok");
            log_info!(context, "Spider finished");
        }

        Ok(RunSummary {
            run_id,
            pages_attempted: reports.len(),
            records_emitted,
            pages_failed,
            export,
        })
    }
}
