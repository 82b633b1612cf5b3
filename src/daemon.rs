/// Scheduler for the warning service.
///
/// This module drives the pipeline:
/// 1. Fetches the feed once at startup; failure aborts startup
/// 2. Re-fetches on a fixed interval measured from the loop start
/// 3. Installs each successful snapshot in the cache
/// 4. Hands the new snapshot to the notification dispatcher
///
/// A failed fetch is logged and the previous snapshot keeps being served.
/// Each tick runs on its own worker thread; if the previous tick is still
/// running when the next one is due, the new tick is skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::cache::WarningCache;
use crate::error::FeedError;
use crate::ingest::smhi::WarningFetcher;
use crate::notify::{NotificationDispatcher, ProcessReport};
use crate::shutdown::Shutdown;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// How often to poll the feed (default: 15 minutes, the feed's own
    /// update cadence)
    pub poll_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

pub struct Daemon {
    config: DaemonConfig,
    fetcher: Arc<WarningFetcher>,
    cache: Arc<WarningCache>,
    dispatcher: Arc<NotificationDispatcher>,
}

/// Clears the in-flight flag when a tick worker finishes, even by panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Daemon {
    pub fn new(
        config: DaemonConfig,
        fetcher: WarningFetcher,
        cache: Arc<WarningCache>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            cache,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn cache(&self) -> &Arc<WarningCache> {
        &self.cache
    }

    /// Initial synchronous fetch. The caller treats an error as fatal.
    pub fn initialize(&self) -> Result<ProcessReport, FeedError> {
        info!(url = %self.fetcher.url(), "performing initial warning fetch");
        tick(&self.fetcher, &self.cache, &self.dispatcher)
    }

    /// One fetch → replace → process cycle on the calling thread.
    pub fn tick(&self) -> Result<ProcessReport, FeedError> {
        tick(&self.fetcher, &self.cache, &self.dispatcher)
    }

    /// Ticks until `shutdown` fires, then waits for the in-flight tick.
    pub fn run(&self, shutdown: &Shutdown) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "starting scheduler loop"
        );

        let start = Instant::now();
        let in_flight = Arc::new(AtomicBool::new(false));
        let mut worker: Option<JoinHandle<()>> = None;
        let mut ticks: u32 = 0;

        loop {
            ticks = ticks.saturating_add(1);
            let due = start + self.config.poll_interval.saturating_mul(ticks);
            if shutdown.wait_timeout(due.saturating_duration_since(Instant::now())) {
                break;
            }

            if in_flight.load(Ordering::Acquire) {
                warn!(tick = ticks, "previous fetch still running, skipping tick");
                continue;
            }
            if let Some(handle) = worker.take() {
                join_worker(handle);
            }

            in_flight.store(true, Ordering::Release);
            let guard = InFlight(Arc::clone(&in_flight));
            let fetcher = Arc::clone(&self.fetcher);
            let cache = Arc::clone(&self.cache);
            let dispatcher = Arc::clone(&self.dispatcher);

            let spawned = thread::Builder::new()
                .name("wxwarn-tick".to_string())
                .spawn(move || {
                    let _guard = guard;
                    if let Err(e) = tick(&fetcher, &cache, &dispatcher) {
                        warn!(error = %e, "warning fetch failed, keeping previous snapshot");
                    }
                });

            match spawned {
                Ok(handle) => worker = Some(handle),
                // The closure (and its guard) is dropped, clearing the flag.
                Err(e) => error!(error = %e, "failed to spawn tick worker"),
            }
        }

        if let Some(handle) = worker.take() {
            join_worker(handle);
        }
        info!("scheduler stopped");
    }
}

fn tick(
    fetcher: &WarningFetcher,
    cache: &WarningCache,
    dispatcher: &NotificationDispatcher,
) -> Result<ProcessReport, FeedError> {
    let snapshot = fetcher.fetch_once()?;
    cache.replace(snapshot);
    let current = cache.read();
    Ok(dispatcher.process(&current))
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("tick worker panicked");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
