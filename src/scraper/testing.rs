//! In-memory browser session for pipeline tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::browser::BrowserSession;
use super::SessionFactory;
use crate::error::{ScrapeError, ScrapeResult};

pub const REVIEWS_HTML: &str = r#"
<html><body>
  <div data-testid="reviews-drawer">
    <button data-testid="reviews-tab">Коментари [60]</button>
    <span data-testid="average-rating">4.5</span>
  </div>
</body></html>
"#;

/// Product page with the given `productArticleDetails` and visible color.
pub fn product_page(details: Value, visible_color: &str) -> String {
    let next_data = json!({
        "props": {"pageProps": {"productPageProps": {"aemData": {"productArticleDetails": details}}}}
    });
    format!(
        r#"<html><head><script id="__NEXT_DATA__" type="application/json">{}</script></head>
<body>
  <section data-testid="color-selector"><p>{}</p></section>
  <div data-testid="reviews-summary"><button>Reviews</button></div>
</body></html>"#,
        next_data, visible_color
    )
}

#[derive(Default)]
struct MockState {
    initial_html: String,
    revealed_html: Option<String>,
    reveals: bool,
    goto_fails: bool,
    click_fails: bool,
    content_fails_after_click: bool,
    interactive: bool,
    clicked: bool,
    calls: Vec<String>,
    waits: Vec<Duration>,
    close_count: usize,
}

/// Clones share state, so a test can keep a handle after moving the session.
#[derive(Clone)]
pub struct MockSession {
    state: Rc<RefCell<MockState>>,
}

impl MockSession {
    pub fn new(initial_html: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                initial_html: initial_html.to_string(),
                reveals: true,
                interactive: true,
                ..MockState::default()
            })),
        }
    }

    pub fn revealing(self, html: &str) -> Self {
        self.state.borrow_mut().revealed_html = Some(html.to_string());
        self
    }

    pub fn never_revealing(self) -> Self {
        self.state.borrow_mut().reveals = false;
        self
    }

    pub fn failing_goto(self) -> Self {
        self.state.borrow_mut().goto_fails = true;
        self
    }

    pub fn failing_click(self) -> Self {
        self.state.borrow_mut().click_fails = true;
        self
    }

    pub fn failing_content_after_click(self) -> Self {
        self.state.borrow_mut().content_fails_after_click = true;
        self
    }

    pub fn static_only(self) -> Self {
        self.state.borrow_mut().interactive = false;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn waited_for(&self) -> Vec<Duration> {
        self.state.borrow().waits.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.borrow().close_count
    }
}

#[async_trait(?Send)]
impl BrowserSession for MockSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> ScrapeResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("goto {}", url));
        if state.goto_fails {
            return Err(ScrapeError::Timeout { url: url.to_string() });
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str, _timeout: Duration) -> ScrapeResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("click {}", selector));
        if state.click_fails {
            return Err(ScrapeError::browser("element not found"));
        }
        state.clicked = true;
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> ScrapeResult<bool> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("wait {}", selector));
        state.waits.push(timeout);
        Ok(state.reveals)
    }

    async fn content(&mut self) -> ScrapeResult<String> {
        let mut state = self.state.borrow_mut();
        state.calls.push("content".to_string());
        if state.clicked {
            if state.content_fails_after_click {
                return Err(ScrapeError::browser("page crashed"));
            }
            if let Some(html) = &state.revealed_html {
                return Ok(html.clone());
            }
        }
        Ok(state.initial_html.clone())
    }

    async fn close(&mut self) -> ScrapeResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push("close".to_string());
        state.close_count += 1;
        Ok(())
    }

    fn supports_interaction(&self) -> bool {
        self.state.borrow().interactive
    }
}

/// Hands out one revealing `MockSession` per page and keeps a handle to each.
pub struct MockFactory {
    html: String,
    opened: RefCell<Vec<MockSession>>,
}

impl MockFactory {
    pub fn new(html: String) -> Self {
        Self {
            html,
            opened: RefCell::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<MockSession> {
        self.opened.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SessionFactory for MockFactory {
    type Session = MockSession;

    async fn open(&self) -> ScrapeResult<MockSession> {
        let session = MockSession::new(&self.html).revealing(REVIEWS_HTML);
        self.opened.borrow_mut().push(session.clone());
        Ok(session)
    }
}
