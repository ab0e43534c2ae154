//! sitewatch - Web page change monitor
//!
//! Watches a small set of remote pages and reports when their content or
//! rendered appearance changes meaningfully, notifying an operator over
//! Telegram. Three capture modes are supported:
//!
//! - **Static**: plain HTTP fetch, text fingerprint comparison
//! - **Rendered**: headless-browser render for JS-built DOMs, then the
//!   same fingerprint comparison
//! - **Visual**: fingerprint comparison plus full-page screenshot diffing
//!   with a rolling baseline/prev/diff artifact set
//!
//! # Architecture
//!
//! One polling task runs per target, all independent, sharing only the
//! hash store. Confirmed changes append to a durable change log and fan
//! out as notifications; visual changes additionally rotate the baseline
//! image set and deliver an annotated diff.

pub mod baseline;
pub mod change_log;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod fingerprint;
pub mod hash_store;
pub mod monitor;
pub mod notify;
pub mod retry;
pub mod types;
pub mod visual_diff;

// Re-export commonly used types
pub use baseline::BaselineStore;
pub use change_log::ChangeLog;
pub use config::Config;
pub use extract::extract_visible_text;
pub use fetch::{BrowserFetcher, Fetcher, HttpFetcher, WebFetcher};
pub use fingerprint::{fingerprint, Fingerprint};
pub use hash_store::HashStore;
pub use monitor::TargetMonitor;
pub use notify::{Notifier, TelegramNotifier};
pub use retry::RetryPolicy;
pub use types::{CycleOutcome, Target, TargetMode, Viewport, WatchError};
pub use visual_diff::{annotate, decode_image, diff_blocks, encode_png, Region};
