use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use hm_scraper::config::AppConfig;
use hm_scraper::logging::init_logging;
use hm_scraper::HmScraper;

/// Scrape H&M product pages into a JSON feed.
///
/// Start URLs, headers, selectors and output are read from
/// `hm_scraper.toml` (or `$HM_SCRAPER_CONFIG`) and `HM_SCRAPER_*` variables.
#[derive(Parser, Debug)]
#[command(name = "hm-scraper", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    let config = AppConfig::load().await?;
    init_logging(&config.logging)?;

    info!("Starting hm-scraper v{}", env!("CARGO_PKG_VERSION"));

    let app = HmScraper::new(config)?;
    match app.run().await {
        Ok(summary) => {
            info!(
                "Wrote {} record(s) to {} ({} page(s) failed)",
                summary.records_emitted,
                summary.export.file_path.display(),
                summary.pages_failed
            );
            Ok(())
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            Err(e)
        }
    }
}
