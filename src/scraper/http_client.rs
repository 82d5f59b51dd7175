use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::browser::BrowserSession;
use super::headers::SpoofedHeaders;
use crate::config::RequestConfig;
use crate::error::{ScrapeError, ScrapeResult};

/// HTTP client wrapper carrying the spoofed header set.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &RequestConfig) -> ScrapeResult<Self> {
        let headers = SpoofedHeaders::from_config(config).header_map();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.navigation_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        info!("HTTP client initialized");
        Ok(Self { client })
    }

    /// Single GET; non-success statuses are errors. No retries.
    pub async fn get_text(&self, url: &Url) -> ScrapeResult<String> {
        let start_time = Instant::now();
        debug!("HTTP GET: {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpRequest {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            "HTTP GET {} returned {} bytes in {}ms",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );
        Ok(body)
    }

    pub fn session(&self) -> StaticSession {
        StaticSession {
            client: self.clone(),
            body: None,
        }
    }
}

/// Session over a plain HTTP response: the served markup, no scripts and no
/// interaction.
pub struct StaticSession {
    client: HttpClient,
    body: Option<String>,
}

#[async_trait(?Send)]
impl BrowserSession for StaticSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> ScrapeResult<()> {
        let url = Url::parse(url).map_err(|e| ScrapeError::network(format!("{}: {}", url, e)))?;
        self.body = Some(self.client.get_text(&url).await?);
        Ok(())
    }

    async fn click(&mut self, selector: &str, _timeout: Duration) -> ScrapeResult<()> {
        Err(ScrapeError::InteractionUnsupported {
            action: format!("click {}", selector),
        })
    }

    async fn wait_for_selector(&mut self, _selector: &str, _timeout: Duration) -> ScrapeResult<bool> {
        Ok(false)
    }

    async fn content(&mut self) -> ScrapeResult<String> {
        self.body
            .clone()
            .ok_or_else(|| ScrapeError::network("no page has been fetched"))
    }

    async fn close(&mut self) -> ScrapeResult<()> {
        self.body = None;
        Ok(())
    }

    fn supports_interaction(&self) -> bool {
        false
    }
}
