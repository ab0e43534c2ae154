//! sitewatch - Main entry point
//!
//! Starts one monitor task per configured target and runs until
//! SIGINT/SIGTERM, then flushes the hash store exactly once and exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitewatch::{Config, Fetcher, HashStore, TargetMode, TargetMonitor, TelegramNotifier, WebFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting sitewatch");

    // Load configuration
    let config = Config::load();

    if !config.general.enabled {
        info!("Watcher is disabled in configuration, exiting");
        return Ok(());
    }

    if config.targets.is_empty() {
        anyhow::bail!(
            "no targets configured; add [[targets]] entries to sitewatch.toml or {:?}",
            Config::default_config_path()
        );
    }

    // Credentials are the one startup check allowed to abort the process
    let notifier = Arc::new(TelegramNotifier::from_env().context("Telegram credentials")?);

    let hash_store = Arc::new(
        HashStore::load(&config.storage.hash_store_path).context("loading hash store")?,
    );

    // The browser only launches when some target renders or screenshots
    let needs_browser = config
        .targets
        .iter()
        .any(|t| t.mode != TargetMode::Static);
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        WebFetcher::new(config.timing.fetch_timeout(), needs_browser)
            .context("building fetcher")?,
    );

    // Shutdown signal (SIGINT/SIGTERM): stop accepting new cycles, then
    // save the hash store once
    let running = Arc::new(AtomicBool::new(true));
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        let _ = shutdown_tx.try_send(());
    })
    .context("installing signal handler")?;

    // One independent monitor task per target
    for target in config.targets.clone() {
        let monitor = TargetMonitor::new(
            target,
            &config,
            fetcher.clone(),
            notifier.clone(),
            hash_store.clone(),
        );
        tokio::spawn(monitor.run(running.clone()));
    }

    info!(
        targets = config.targets.len(),
        interval_secs = config.timing.poll_interval_seconds,
        "all monitors started"
    );

    shutdown_rx.recv().await;

    info!("shutdown signal received, saving hash store");
    hash_store.save().context("saving hash store")?;
    info!("shutdown complete");

    Ok(())
}
