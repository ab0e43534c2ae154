//! Per-target polling state machine.
//!
//! One monitor instance runs per configured target, cycling
//! Idle → Capturing → Comparing → (NoChange | ChangeConfirmed) → Idle on a
//! fixed delay until process shutdown. Fetch errors are logged and the
//! cycle skipped; nothing a cycle does can stop the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::baseline::BaselineStore;
use crate::change_log::ChangeLog;
use crate::config::{Config, DiffConfig};
use crate::extract::extract_visible_text;
use crate::fetch::Fetcher;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::hash_store::HashStore;
use crate::notify::Notifier;
use crate::retry::RetryPolicy;
use crate::types::{CycleOutcome, Target, TargetMode, WatchError};
use crate::visual_diff::{annotate, decode_image, diff_blocks, encode_png, STROKE_RED};

/// Polling loop for one monitored target
pub struct TargetMonitor {
    target: Target,
    interval: Duration,
    diff: DiffConfig,
    retry: RetryPolicy,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    hash_store: Arc<HashStore>,
    baselines: BaselineStore,
    change_log: ChangeLog,
    /// Last fingerprint hash seen this run, seeded from the hash store
    last_hash: Option<String>,
}

impl TargetMonitor {
    pub fn new(
        target: Target,
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        hash_store: Arc<HashStore>,
    ) -> Self {
        let last_hash = hash_store.get(&target.url);
        Self {
            interval: config.timing.poll_interval(),
            diff: config.diff.clone(),
            retry: RetryPolicy::new(config.timing.retry_attempts, config.timing.retry_delay()),
            baselines: BaselineStore::new(&config.storage.artifact_dir),
            change_log: ChangeLog::new(&config.storage.change_log_path),
            target,
            fetcher,
            notifier,
            hash_store,
            last_hash,
        }
    }

    /// Poll until the process-wide shutdown flag clears. Each target's
    /// loop is independent; there is no cross-target ordering.
    pub async fn run(mut self, running: Arc<AtomicBool>) {
        info!(
            url = %self.target.url,
            mode = self.target.mode.as_str(),
            interval_secs = self.interval.as_secs(),
            "monitor started"
        );

        while running.load(Ordering::SeqCst) {
            match self.run_cycle().await {
                Ok(CycleOutcome::FirstObservation) => {
                    info!(url = %self.target.url, "first observation, hash seeded")
                }
                Ok(CycleOutcome::Unchanged) => {
                    debug!(url = %self.target.url, "no change")
                }
                Ok(CycleOutcome::ChangeConfirmed) => {}
                Err(e) => warn!(url = %self.target.url, "cycle skipped: {e}"),
            }
            tokio::time::sleep(self.interval).await;
        }

        info!(url = %self.target.url, "monitor stopped");
    }

    /// One full capture-and-compare cycle.
    ///
    /// Errors mean the cycle was skipped; the stored hash is untouched and
    /// the next cycle retries from the same state.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, WatchError> {
        let raw_html = match self.target.mode {
            TargetMode::Rendered => self.fetcher.fetch_rendered_text(&self.target).await?,
            TargetMode::Static | TargetMode::Visual => {
                self.fetcher.fetch_static_text(&self.target).await?
            }
        };
        let fp = fingerprint(&extract_visible_text(&raw_html));

        let outcome = match self.last_hash.as_deref() {
            None => CycleOutcome::FirstObservation,
            Some(prev) if prev == fp.hash => CycleOutcome::Unchanged,
            Some(_) => CycleOutcome::ChangeConfirmed,
        };

        if outcome == CycleOutcome::ChangeConfirmed {
            self.handle_confirmed_change(&fp).await;
        }

        // The in-memory hash and the shared store converge after every
        // successful poll, confirmed or not.
        self.last_hash = Some(fp.hash.clone());
        self.hash_store.set(&self.target.url, &fp.hash);

        Ok(outcome)
    }

    async fn handle_confirmed_change(&self, fp: &Fingerprint) {
        info!(url = %self.target.url, "change confirmed");

        if let Err(e) = self.change_log.append(&self.target.url, &fp.normalized) {
            warn!(url = %self.target.url, "change log append failed: {e}");
        }

        let message = format!("{} has been updated", self.target.url);
        if let Err(e) = self.notifier.send_text(&message).await {
            warn!(url = %self.target.url, "notification failed: {e}");
        }

        if self.target.mode == TargetMode::Visual {
            let result = self
                .retry
                .run("visual diff pipeline", || self.visual_pipeline())
                .await;
            if let Err(e) = result {
                warn!(url = %self.target.url, "visual diff pipeline gave up: {e}");
            }
        }
    }

    /// One attempt of the screenshot → diff → commit → notify pipeline
    async fn visual_pipeline(&self) -> Result<(), WatchError> {
        let capture = self.fetcher.capture_screenshot(&self.target).await?;

        if self.baselines.ensure_baseline(&self.target.name, &capture)? {
            info!(url = %self.target.url, "baseline established, diff skipped");
            return Ok(());
        }

        let baseline_bytes = self.baselines.read_baseline(&self.target.name)?;
        let baseline = decode_image(&baseline_bytes)?;
        let current = decode_image(&capture)?;

        let regions = diff_blocks(&baseline, &current, self.diff.block_size, self.diff.threshold);
        if regions.is_empty() {
            info!(
                url = %self.target.url,
                threshold = self.diff.threshold,
                block_size = self.diff.block_size,
                "no significant visual change"
            );
            return Ok(());
        }

        let annotated = annotate(
            &current,
            &regions,
            self.diff.expand_px,
            STROKE_RED,
            self.diff.stroke_width,
        );
        let annotated_bytes = encode_png(&annotated)?;
        self.baselines.commit_change(
            &self.target.name,
            &baseline_bytes,
            &capture,
            &annotated_bytes,
        )?;
        info!(
            url = %self.target.url,
            regions = regions.len(),
            "visual change committed"
        );

        let caption = format!("detected {} changed region(s)", regions.len());
        self.notifier
            .send_file(&self.baselines.diff_path(&self.target.name), &caption)
            .await
    }
}
