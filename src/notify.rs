//! Change notifications over the Telegram Bot API.
//!
//! Text messages go through `sendMessage`, file attachments through
//! `sendDocument` as multipart uploads. Non-2xx responses are surfaced as
//! errors carrying the response body for diagnostics; delivery failures
//! never roll back monitor state.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::types::WatchError;

const TOKEN_ENV: &str = "TELEGRAM_TOKEN";
const CHAT_ID_ENV: &str = "TELEGRAM_CHATID";
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound notification channel the monitor depends on
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, message: &str) -> Result<(), WatchError>;

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), WatchError>;
}

/// Telegram bot client bound to one chat
pub struct TelegramNotifier {
    client: reqwest::Client,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            chat_id: chat_id.to_string(),
            base_url: format!("https://api.telegram.org/bot{token}"),
        })
    }

    /// Build the notifier from `TELEGRAM_TOKEN` / `TELEGRAM_CHATID`.
    /// Missing credentials are fatal at startup, before any monitor runs.
    pub fn from_env() -> Result<Self, WatchError> {
        let token =
            std::env::var(TOKEN_ENV).map_err(|_| WatchError::MissingCredential(TOKEN_ENV))?;
        let chat_id =
            std::env::var(CHAT_ID_ENV).map_err(|_| WatchError::MissingCredential(CHAT_ID_ENV))?;
        Self::new(&token, &chat_id).map_err(WatchError::Send)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, message: &str) -> Result<(), WatchError> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .form(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", message),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await
            .map_err(WatchError::Send)?;

        check_status(response).await?;
        debug!("message delivered to Telegram");
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), WatchError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let mut form = Form::new().text("chat_id", self.chat_id.clone());
        if !caption.is_empty() {
            form = form.text("caption", caption.to_string());
        }
        form = form.part("document", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/sendDocument", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(WatchError::Send)?;

        check_status(response).await?;
        debug!(path = %path.display(), "document delivered to Telegram");
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), WatchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(WatchError::Api { status, body })
}
