//! Headless Chromium captures.
//!
//! One browser process is shared by all targets; every capture opens its
//! own tab and closes it on every path. The chromium client is blocking,
//! so captures run on the blocking thread pool to keep monitor tasks
//! independently schedulable.

use std::time::Duration;

use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use crate::types::{Target, WatchError};

use super::BROWSER_USER_AGENT;

/// Shared headless browser used for rendered text and screenshots
#[derive(Clone)]
pub struct BrowserFetcher {
    browser: Browser,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Launch the headless browser. Fatal at startup when chromium is
    /// missing; captures afterwards fail per-cycle, never the process.
    pub fn launch(timeout: Duration) -> anyhow::Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            // The browser can sit idle for whole poll intervals between
            // captures; never let the client reap it.
            .idle_browser_timeout(Duration::MAX)
            .build()
            .map_err(|e| anyhow::anyhow!("browser launch options: {e}"))?;
        let browser = Browser::new(options)?;
        debug!("headless browser launched");
        Ok(Self { browser, timeout })
    }

    /// Render the page and return the resulting DOM as HTML, waiting for
    /// the target's content marker when one is configured.
    pub async fn rendered_html(&self, target: &Target) -> Result<String, WatchError> {
        let browser = self.browser.clone();
        let timeout = self.timeout;
        let url = target.url.clone();
        let wait_selector = target.wait_selector.clone();

        run_blocking(move || {
            let tab = open_tab(&browser, timeout, &url)?;
            let html = rendered_dom(&tab, wait_selector.as_deref());
            let _ = tab.close(true);
            html
        })
        .await
    }

    /// Capture a PNG screenshot clipped to the target's viewport
    pub async fn capture_screenshot(&self, target: &Target) -> Result<Vec<u8>, WatchError> {
        let browser = self.browser.clone();
        let timeout = self.timeout;
        let url = target.url.clone();
        let viewport = target.viewport;

        run_blocking(move || {
            let tab = open_tab(&browser, timeout, &url)?;
            let clip = Page::Viewport {
                x: 0.0,
                y: 0.0,
                width: f64::from(viewport.width),
                height: f64::from(viewport.height),
                scale: 1.0,
            };
            let png = tab
                .capture_screenshot(
                    Page::CaptureScreenshotFormatOption::Png,
                    None,
                    Some(clip),
                    true,
                )
                .map_err(browser_error);
            let _ = tab.close(true);
            png
        })
        .await
    }
}

fn rendered_dom(tab: &Tab, wait_selector: Option<&str>) -> Result<String, WatchError> {
    if let Some(selector) = wait_selector {
        tab.wait_for_element(selector).map_err(browser_error)?;
    }
    tab.get_content().map_err(browser_error)
}

fn open_tab(
    browser: &Browser,
    timeout: Duration,
    url: &str,
) -> Result<std::sync::Arc<Tab>, WatchError> {
    let tab = browser.new_tab().map_err(browser_error)?;
    tab.set_default_timeout(timeout);
    tab.set_user_agent(BROWSER_USER_AGENT, None, None)
        .map_err(browser_error)?;
    if let Err(e) = tab
        .navigate_to(url)
        .and_then(|t| t.wait_until_navigated())
    {
        let _ = tab.close(true);
        return Err(browser_error(e));
    }
    Ok(tab)
}

async fn run_blocking<T, F>(op: F) -> Result<T, WatchError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WatchError> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| WatchError::Browser(format!("capture task failed: {e}")))?
}

fn browser_error(e: anyhow::Error) -> WatchError {
    WatchError::Browser(e.to_string())
}
