//! Page fetching collaborators.
//!
//! Three capture capabilities back the monitor loop:
//! - Static: plain HTTP fetch of the page HTML
//! - Rendered: headless-browser render for JS-built DOMs
//! - Screenshot: full-page capture at the target's viewport
//!
//! The `Fetcher` trait is the seam the monitor depends on; `WebFetcher`
//! is the production implementation composing the HTTP client and the
//! shared headless browser.

pub mod browser;
pub mod http;

use crate::types::{Target, WatchError};

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// User agent presented on every fetch, matching a current desktop Chrome
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Capture capabilities the monitor depends on.
///
/// Errors from any of these are non-fatal to the caller: the monitor logs
/// and skips to its next cycle.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw HTML of a page over plain HTTP
    async fn fetch_static_text(&self, target: &Target) -> Result<String, WatchError>;

    /// Render the page in a headless browser and return the resulting DOM
    /// as HTML, waiting for the target's content marker when configured
    async fn fetch_rendered_text(&self, target: &Target) -> Result<String, WatchError>;

    /// Capture a screenshot of the page at the target's viewport
    async fn capture_screenshot(&self, target: &Target) -> Result<Vec<u8>, WatchError>;
}

/// Production fetcher: HTTP client plus an optional shared headless browser.
///
/// The browser is launched only when some configured target needs it;
/// rendered and screenshot captures fail cleanly when it is absent.
pub struct WebFetcher {
    http: HttpFetcher,
    browser: Option<BrowserFetcher>,
}

impl WebFetcher {
    pub fn new(timeout: std::time::Duration, with_browser: bool) -> anyhow::Result<Self> {
        let http = HttpFetcher::new(timeout)?;
        let browser = if with_browser {
            Some(BrowserFetcher::launch(timeout)?)
        } else {
            None
        };
        Ok(Self { http, browser })
    }

    fn browser(&self) -> Result<&BrowserFetcher, WatchError> {
        self.browser
            .as_ref()
            .ok_or_else(|| WatchError::Browser("headless browser not launched".to_string()))
    }
}

#[async_trait::async_trait]
impl Fetcher for WebFetcher {
    async fn fetch_static_text(&self, target: &Target) -> Result<String, WatchError> {
        self.http.fetch_text(&target.url).await
    }

    async fn fetch_rendered_text(&self, target: &Target) -> Result<String, WatchError> {
        self.browser()?.rendered_html(target).await
    }

    async fn capture_screenshot(&self, target: &Target) -> Result<Vec<u8>, WatchError> {
        self.browser()?.capture_screenshot(target).await
    }
}
