// src/app.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::commands::{self, CommandHandler};
use crate::application::monitor::PriceMonitor;
use crate::config::Config;
use crate::domain::registry::ProductRegistry;
use crate::infrastructure::fetcher::ZalandoFetcher;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::telegram::TelegramApi;

/// How long an in-flight fetch may run after the shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Wire everything together and run until shutdown: the scheduler loop and
/// the command loop share the store, each on its own task
pub async fn run(config: Config) -> Result<()> {
    info!("🤖 Starting Zalando price monitor bot...");

    let store = Arc::new(JsonFileStore::open(&config.data_file).context("open product store")?);
    let debug_dump = config
        .debug_mode
        .then(|| config.data_file.with_file_name("debug_response.html"));
    let fetcher = Arc::new(ZalandoFetcher::new(debug_dump).context("build fetch client")?);
    let api = Arc::new(TelegramApi::new(&config.telegram_token).context("build telegram client")?);

    let registry = Arc::new(ProductRegistry::new(
        store.clone(),
        config.max_products_per_owner,
    ));
    let handler = CommandHandler::new(registry, config.check_interval);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let monitor = PriceMonitor::new(
        config.monitor_config(),
        store,
        fetcher,
        api.clone(),
        shutdown_rx.clone(),
    );
    let mut monitor_handle = tokio::spawn(monitor.run());

    tokio::select! {
        result = &mut monitor_handle => {
            // the monitor only errors on a fatal store failure; restart-on-crash
            // is the recovery mechanism
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(anyhow::Error::new(err).context("price monitor failed")),
                Err(join_err) => Err(anyhow::anyhow!("price monitor task panicked: {join_err}")),
            };
        }
        _ = commands::run_command_loop(api, handler, shutdown_rx) => {}
    }

    // command loop exited on shutdown; let the in-flight cycle wind down
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut monitor_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(err))) => warn!(error = %err, "monitor reported an error during shutdown"),
        Ok(Err(join_err)) => warn!(error = %join_err, "monitor task panicked during shutdown"),
        Err(_) => {
            warn!("monitor did not stop within the grace period, aborting it");
            monitor_handle.abort();
        }
    }

    info!("👋 shutdown complete");
    Ok(())
}
