use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ScrapeResult;

/// One rendered page driven by a browser.
///
/// A session belongs to exactly one page visit and is released through
/// [`PageScope::close`]. Futures are not `Send`: sessions are driven on the
/// task that created them.
#[async_trait(?Send)]
pub trait BrowserSession {
    /// Navigate and wait for the network to become idle.
    async fn goto(&mut self, url: &str, timeout: Duration) -> ScrapeResult<()>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str, timeout: Duration) -> ScrapeResult<()>;

    /// `Ok(true)` once an element matching `selector` exists, `Ok(false)` on timeout.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> ScrapeResult<bool>;

    /// Current rendered markup.
    async fn content(&mut self) -> ScrapeResult<String>;

    /// Release the page and any per-page browser state.
    async fn close(&mut self) -> ScrapeResult<()>;

    /// Sessions without a live DOM cannot click or wait.
    fn supports_interaction(&self) -> bool {
        true
    }
}

/// Owns a session for the duration of one page visit.
///
/// `close` must be awaited on every exit path; dropping an open scope is
/// reported as a leak.
pub struct PageScope<S: BrowserSession> {
    session: S,
    closed: bool,
}

impl<S: BrowserSession> PageScope<S> {
    pub fn new(session: S) -> Self {
        Self { session, closed: false }
    }

    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    /// Close the page. Close failures are logged, never propagated.
    pub async fn close(mut self) -> bool {
        self.closed = true;
        match self.session.close().await {
            Ok(()) => {
                debug!("Browser page closed");
                true
            }
            Err(e) => {
                warn!("Failed to close browser page: {}", e);
                false
            }
        }
    }
}

impl<S: BrowserSession> Drop for PageScope<S> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser page dropped without being closed");
        }
    }
}

#[cfg(feature = "browser")]
pub use playwright_backend::{PlaywrightBrowser, PlaywrightSession};

#[cfg(feature = "browser")]
mod playwright_backend {
    use async_trait::async_trait;
    use playwright::api::{Browser, BrowserContext, DocumentLoadState, Page};
    use playwright::Playwright;
    use std::time::Duration;
    use tracing::{debug, info, warn};

    use super::BrowserSession;
    use crate::config::RequestConfig;
    use crate::error::{ScrapeError, ScrapeResult};
    use crate::scraper::headers::SpoofedHeaders;

    fn browser_error(err: impl std::fmt::Display) -> ScrapeError {
        ScrapeError::browser(err.to_string())
    }

    fn millis(timeout: Duration) -> f64 {
        timeout.as_millis() as f64
    }

    /// Browser-based client using Playwright
    pub struct PlaywrightBrowser {
        _playwright: Playwright,
        browser: Browser,
        headers: SpoofedHeaders,
    }

    impl PlaywrightBrowser {
        /// Launch headless Chromium.
        pub async fn launch(config: &RequestConfig) -> ScrapeResult<Self> {
            debug!("Initializing browser client");

            let playwright = Playwright::initialize().await.map_err(browser_error)?;
            playwright.prepare().map_err(browser_error)?;

            let browser = playwright
                .chromium()
                .launcher()
                .headless(config.headless)
                .launch()
                .await
                .map_err(browser_error)?;

            info!("Chromium launched (headless: {})", config.headless);

            Ok(Self {
                _playwright: playwright,
                browser,
                headers: SpoofedHeaders::from_config(config),
            })
        }

        /// Fresh context and page carrying the spoofed headers.
        pub async fn new_session(&self) -> ScrapeResult<PlaywrightSession> {
            let context = self
                .browser
                .context_builder()
                .user_agent(self.headers.user_agent())
                .extra_http_headers(self.headers.extra_headers())
                .build()
                .await
                .map_err(browser_error)?;

            let page = context.new_page().await.map_err(browser_error)?;

            Ok(PlaywrightSession {
                context,
                page,
                closed: false,
            })
        }

        pub async fn shutdown(&self) {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
        }
    }

    pub struct PlaywrightSession {
        context: BrowserContext,
        page: Page,
        closed: bool,
    }

    #[async_trait(?Send)]
    impl BrowserSession for PlaywrightSession {
        async fn goto(&mut self, url: &str, timeout: Duration) -> ScrapeResult<()> {
            debug!("Browser navigating to: {}", url);
            self.page
                .goto_builder(url)
                .wait_until(DocumentLoadState::NetworkIdle)
                .timeout(millis(timeout))
                .goto()
                .await
                .map_err(browser_error)?;
            Ok(())
        }

        async fn click(&mut self, selector: &str, timeout: Duration) -> ScrapeResult<()> {
            self.page
                .click_builder(selector)
                .timeout(millis(timeout))
                .click()
                .await
                .map_err(browser_error)
        }

        async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> ScrapeResult<bool> {
            match self
                .page
                .wait_for_selector_builder(selector)
                .timeout(millis(timeout))
                .wait_for_selector()
                .await
            {
                Ok(handle) => Ok(handle.is_some()),
                Err(e) => {
                    debug!("Waiting for '{}' ended without a match: {}", selector, e);
                    Ok(false)
                }
            }
        }

        async fn content(&mut self) -> ScrapeResult<String> {
            self.page.content().await.map_err(browser_error)
        }

        async fn close(&mut self) -> ScrapeResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;

            let page_result = self.page.close(None).await.map_err(browser_error);
            let context_result = self.context.close().await.map_err(browser_error);
            page_result.and(context_result)
        }
    }
}
