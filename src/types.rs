//! Core types used throughout the watcher.
//!
//! This module defines the monitored-target model and the crate-wide
//! error type.

use serde::{Deserialize, Serialize};

/// How a target's content is captured and compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Plain HTTP fetch, text fingerprint only
    Static,
    /// Headless-browser render before extracting text (JS-built DOM)
    Rendered,
    /// Text fingerprint plus screenshot diffing on confirmed changes
    Visual,
}

impl TargetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Static => "static",
            TargetMode::Rendered => "rendered",
            TargetMode::Visual => "visual",
        }
    }
}

/// Capture viewport for screenshot targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 2000,
        }
    }
}

/// One monitored endpoint. Immutable after configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Stable identity, also the fetch location
    pub url: String,
    /// Artifact directory name for visual targets, display name otherwise
    pub name: String,
    /// Capture and comparison mode
    pub mode: TargetMode,
    /// Screenshot viewport (visual targets)
    #[serde(default)]
    pub viewport: Viewport,
    /// CSS selector the rendered fetch waits for before extracting
    #[serde(default)]
    pub wait_selector: Option<String>,
}

/// Result of one comparison step in the monitor cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No previously stored hash for this target; seed only, no notification
    FirstObservation,
    /// Fingerprint matches the last stored hash
    Unchanged,
    /// Fingerprint differs from the last stored hash
    ChangeConfirmed,
}

/// Errors that can occur during a monitor cycle
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hash store parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Telegram API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("notification send failed: {0}")]
    Send(#[source] reqwest::Error),

    #[error("required credential {0} is not set")]
    MissingCredential(&'static str),
}
