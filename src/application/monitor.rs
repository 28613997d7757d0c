//! Anti-blocking scheduler - decides when each check cycle runs

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::messages;
use crate::domain::diff::DiffEngine;
use crate::domain::product::TrackedProduct;
use crate::domain::store::ProductStore;
use crate::infrastructure::fetcher::ProductFetcher;
use crate::infrastructure::telegram::Notifier;
use crate::shared::errors::AppError;

/// Scheduler timing parameters; see `Config` for the environment defaults
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wait before the very first cycle, absorbs restart storms
    pub initial_delay: Duration,
    /// Sleep between two full cycles
    pub check_interval: Duration,
    /// Jitter bounds for the per-product wait inside a cycle
    pub random_delay_min: Duration,
    pub random_delay_max: Duration,
    /// Consecutive failures at which the owner gets a one-time notice
    pub failure_notice_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            check_interval: Duration::from_secs(3600),
            random_delay_min: Duration::from_secs(10),
            random_delay_max: Duration::from_secs(20),
            failure_notice_threshold: 3,
        }
    }
}

/// Source of the per-product jitter delay; a seam so tests can feed a
/// fixed sequence instead of real randomness
pub trait Jitter: Send {
    fn next_delay(&mut self, min: Duration, max: Duration) -> Duration;
}

/// Uniform random jitter within the configured bounds
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn next_delay(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Counters for the periodic cycle summary log line
#[derive(Debug, Clone, Default)]
pub struct MonitorStats {
    pub cycles_completed: u64,
    pub products_checked: u64,
    pub fetch_failures: u64,
    pub events_emitted: u64,
}

/// The long-lived background loop: initial delay, then per cycle a jittered
/// sequential fetch of every tracked product, diffed and folded into the
/// store, followed by the inter-cycle sleep.
///
/// Fetches are deliberately sequential; spreading them out is the whole
/// anti-blocking strategy. A fetch failure is contained at the per-product
/// boundary, a store failure aborts the loop.
pub struct PriceMonitor {
    config: MonitorConfig,
    store: Arc<dyn ProductStore>,
    fetcher: Arc<dyn ProductFetcher>,
    notifier: Arc<dyn Notifier>,
    jitter: Box<dyn Jitter>,
    diff: DiffEngine,
    stats: MonitorStats,
    shutdown: watch::Receiver<bool>,
}

impl PriceMonitor {
    pub fn new(
        config: MonitorConfig,
        store: Arc<dyn ProductStore>,
        fetcher: Arc<dyn ProductFetcher>,
        notifier: Arc<dyn Notifier>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            notifier,
            jitter: Box::new(RandomJitter),
            diff: DiffEngine::new(),
            stats: MonitorStats::default(),
            shutdown,
        }
    }

    pub fn with_jitter(mut self, jitter: Box<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Run until the shutdown signal fires. Idle → InitialDelay →
    /// (PerProductJitterWait → Fetch → Diff)* → IntervalSleep → loop.
    pub async fn run(mut self) -> Result<(), AppError> {
        info!(
            initial_delay_secs = self.config.initial_delay.as_secs(),
            check_interval_secs = self.config.check_interval.as_secs(),
            "🚀 price monitor starting"
        );

        if !self.sleep_or_shutdown(self.config.initial_delay).await {
            info!("🛑 price monitor stopped before first cycle");
            return Ok(());
        }

        loop {
            if !self.run_cycle().await? {
                break;
            }

            self.stats.cycles_completed += 1;
            info!(
                cycle = self.stats.cycles_completed,
                checked = self.stats.products_checked,
                failures = self.stats.fetch_failures,
                events = self.stats.events_emitted,
                "✅ check cycle complete"
            );

            if !self.sleep_or_shutdown(self.config.check_interval).await {
                break;
            }
        }

        info!("🛑 price monitor stopped");
        Ok(())
    }

    /// One pass over all tracked products in insertion order.
    /// Returns false when interrupted by shutdown.
    async fn run_cycle(&mut self) -> Result<bool, AppError> {
        let products = self.store.list_all().await?;
        debug!(products = products.len(), "starting check cycle");

        for product in products {
            let delay = self
                .jitter
                .next_delay(self.config.random_delay_min, self.config.random_delay_max);
            if !self.sleep_or_shutdown(delay).await {
                return Ok(false);
            }
            self.check_product(product).await?;
        }

        Ok(true)
    }

    async fn check_product(&mut self, mut product: TrackedProduct) -> Result<(), AppError> {
        self.stats.products_checked += 1;
        debug!(url = %product.url, "checking price");

        match self.fetcher.fetch(&product.url).await {
            Ok(snapshot) => {
                let events = self.diff.apply(&mut product, &snapshot);
                if !self.store.update_if_present(&product).await? {
                    debug!(url = %product.url, "removed during fetch, discarding update");
                    return Ok(());
                }
                for event in &events {
                    info!(url = %product.url, kind = ?event.kind, "🔔 change detected");
                    self.notifier
                        .notify(product.owner_id, &messages::change_alert(event))
                        .await;
                }
                self.stats.events_emitted += events.len() as u64;
            }
            Err(err) => {
                self.stats.fetch_failures += 1;
                let failures = self.diff.record_failure(&mut product);
                warn!(url = %product.url, failures, error = %err, "fetch failed, will retry next cycle");
                if !self.store.update_if_present(&product).await? {
                    return Ok(());
                }
                if failures == self.config.failure_notice_threshold {
                    self.notifier
                        .notify(
                            product.owner_id,
                            &messages::failure_notice(&product, failures),
                        )
                        .await;
                }
            }
        }

        Ok(())
    }

    /// False means the shutdown signal fired during the wait
    async fn sleep_or_shutdown(&mut self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.shutdown.changed() => {
                info!("shutdown signal received");
                false
            }
        }
    }
}
