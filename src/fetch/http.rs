//! Plain HTTP page fetching.

use std::time::Duration;

use crate::types::WatchError;

use super::BROWSER_USER_AGENT;

/// Reqwest-backed fetcher for static pages
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// GET the page and return its body text. Non-2xx statuses are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String, WatchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::BadStatus {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|e| WatchError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}
