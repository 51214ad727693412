//! Expiry sweeper for periodic cleanup of cached claims
//!
//! Lookups already refuse expired claims on their own. The sweeper exists to
//! bound memory taken by entries that are never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use ts_shared::config::TokenCacheConfig;

use crate::cache::{CacheEntry, CacheKey, TokenCache};

const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Pause between two scans
    pub interval: Duration,
    /// Whether to run the background task at all
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600), // 10 minutes
            enabled: true,
        }
    }
}

impl From<&TokenCacheConfig> for SweeperConfig {
    fn from(config: &TokenCacheConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.sweep_interval_seconds),
            enabled: config.sweeper_enabled,
        }
    }
}

/// Result of a single scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of claims entries inspected
    pub scanned: usize,
    /// Number of claims entries removed
    pub evicted: usize,
}

/// Background sweeper removing expired claims from a [`TokenCache`]
pub struct ExpirySweeper {
    cache: Arc<TokenCache>,
    config: SweeperConfig,
}

impl ExpirySweeper {
    pub fn new(cache: Arc<TokenCache>, config: SweeperConfig) -> Self {
        Self { cache, config }
    }

    /// Run a single scan
    ///
    /// Every claims entry whose expiry is at or before the scan start is
    /// removed. Signed-token entries carry no cache expiry and are skipped.
    /// An entry refreshed while the scan runs is left in place.
    pub fn run_sweep(&self) -> SweepReport {
        let scan_start = Instant::now();
        let mut report = SweepReport::default();

        self.cache.for_each(|key, entry| {
            if let (CacheKey::Token(raw), CacheEntry::Claims(claims)) = (key, entry) {
                report.scanned += 1;
                if claims.is_expired_at(scan_start)
                    && self.cache.remove_expired_claims(raw, scan_start)
                {
                    report.evicted += 1;
                }
            }
        });

        if report.evicted > 0 {
            info!(
                "Token cache sweep evicted {} of {} cached claims",
                report.evicted, report.scanned
            );
        } else {
            debug!("Token cache sweep found nothing to evict ({} scanned)", report.scanned);
        }

        report
    }

    /// Start the sweeper as a background task
    ///
    /// The first scan runs one interval after start. The interval is clamped
    /// to between one second and one day. The task exits when
    /// [`SweeperHandle::shutdown`] is called or the handle is dropped.
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if !self.config.enabled {
            warn!("Token cache sweeper is disabled");
            return SweeperHandle {
                shutdown_tx,
                task: None,
            };
        }

        let period = self.config.interval.clamp(MIN_INTERVAL, MAX_INTERVAL);

        let task = tokio::spawn(async move {
            info!(
                "Token cache sweeper started - will run every {} seconds",
                period.as_secs()
            );

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_sweep();
                    }
                    changed = shutdown_rx.changed() => {
                        // a dropped sender counts as shutdown too
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Token cache sweeper stopped");
        });

        SweeperHandle {
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Handle to a running sweeper task
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Whether the background task is still alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the sweeper to stop and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Token cache sweeper task failed: {}", e);
            }
        }
    }
}
