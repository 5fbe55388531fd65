//! Snapshot cache and background refresh.
//!
//! One [`SnapshotCache`] is shared (via `Arc`) between the console, any
//! on-demand readers and the refresh thread. Refreshes are serialized by a
//! single lock that also remembers the last-used source; readers only touch
//! the swap cell and never wait on the network.

use crate::aggregate::aggregate;
use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::loader::RowFetcher;
use crate::types::{Row, Snapshot};
use parking_lot::{Mutex, RwLock};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
struct Cached {
    snapshot: Arc<Snapshot>,
    rows: Arc<Vec<Row>>,
    updated_at: Instant,
}

pub struct SnapshotCache {
    fetcher: Box<dyn RowFetcher>,
    max_cache_age: Duration,
    current: RwLock<Option<Cached>>,
    /// Held for the whole check-fetch-swap sequence; stores the source the
    /// next background refresh will use.
    refresh_lock: Mutex<String>,
}

impl SnapshotCache {
    pub fn new<F>(fetcher: F, default_source: impl Into<String>, max_cache_age: Duration) -> Self
    where
        F: RowFetcher + 'static,
    {
        Self {
            fetcher: Box::new(fetcher),
            max_cache_age,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(default_source.into()),
        }
    }

    pub fn from_config<F>(config: &DashboardConfig, fetcher: F) -> Self
    where
        F: RowFetcher + 'static,
    {
        Self::new(fetcher, config.default_source.clone(), config.max_cache_age)
    }

    /// Current snapshot without any refresh.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().as_ref().map(|c| Arc::clone(&c.snapshot))
    }

    /// Sheet rows the current snapshot was computed from.
    pub fn current_rows(&self) -> Option<Arc<Vec<Row>>> {
        self.current.read().as_ref().map(|c| Arc::clone(&c.rows))
    }

    /// Current snapshot, making one synchronous refresh attempt when nothing
    /// has been computed yet. Returns `None` if that attempt fails.
    pub fn get_snapshot(&self) -> Option<Arc<Snapshot>> {
        if let Some(snapshot) = self.current() {
            return Some(snapshot);
        }
        let source = self.refresh_lock.lock();
        // Another caller may have filled the cell while we waited.
        if let Some(snapshot) = self.current() {
            return Some(snapshot);
        }
        match self.fetch_and_swap(&source) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(source = %source.as_str(), error = %err, "initial snapshot fetch failed");
                None
            }
        }
    }

    /// Snapshot no older than the staleness window when a refresh succeeds.
    ///
    /// If the refresh fails the stale snapshot (if any) is returned. Callers
    /// queued behind an in-flight refresh reuse its result instead of
    /// fetching again.
    pub fn get_fresh(&self) -> Option<Arc<Snapshot>> {
        let source = self.refresh_lock.lock();
        if self.status() == CacheStatus::Fresh {
            return self.current();
        }
        match self.fetch_and_swap(&source) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(source = %source.as_str(), error = %err, "refresh of stale snapshot failed");
                self.current()
            }
        }
    }

    /// Fetch `source`, aggregate it and install the result.
    ///
    /// On success `source` becomes the source of later background refreshes.
    /// On failure the cache is left exactly as it was.
    pub fn refresh(&self, source: &str) -> Result<Arc<Snapshot>, FetchError> {
        let mut last_source = self.refresh_lock.lock();
        let snapshot = self.fetch_and_swap(source)?;
        *last_source = source.to_string();
        Ok(snapshot)
    }

    /// Refresh using the last source that succeeded (or the configured
    /// default).
    pub fn refresh_current(&self) -> Result<Arc<Snapshot>, FetchError> {
        let source = self.refresh_lock.lock();
        self.fetch_and_swap(&source)
    }

    pub fn source(&self) -> String {
        self.refresh_lock.lock().clone()
    }

    /// Age of the installed snapshot; `Duration::MAX` when there is none.
    pub fn snapshot_age(&self) -> Duration {
        self.current
            .read()
            .as_ref()
            .map_or(Duration::MAX, |c| c.updated_at.elapsed())
    }

    pub fn status(&self) -> CacheStatus {
        match self.current.read().as_ref() {
            None => CacheStatus::Empty,
            Some(c) if c.updated_at.elapsed() < self.max_cache_age => CacheStatus::Fresh,
            Some(_) => CacheStatus::Stale,
        }
    }

    // Callers must hold `refresh_lock`.
    fn fetch_and_swap(&self, source: &str) -> Result<Arc<Snapshot>, FetchError> {
        let started = Instant::now();
        let rows = self.fetcher.fetch_rows(source)?;
        let snapshot = Arc::new(aggregate(&rows, Some(source)));
        let row_count = rows.len();
        *self.current.write() = Some(Cached {
            snapshot: Arc::clone(&snapshot),
            rows: Arc::new(rows),
            updated_at: Instant::now(),
        });
        tracing::info!(
            source = %source,
            rows = row_count,
            live = snapshot.live_campaigns,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "snapshot refreshed"
        );
        Ok(snapshot)
    }
}

/// Periodic refresh of the cache's last-used source on a dedicated thread.
pub struct RefreshLoop {
    cache: Arc<SnapshotCache>,
    interval: Duration,
    stop: Arc<AtomicBool>,
}

pub struct RefreshLoopHandle {
    join: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl RefreshLoop {
    pub fn new(cache: Arc<SnapshotCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(self) -> std::io::Result<RefreshLoopHandle> {
        let stop = Arc::clone(&self.stop);
        let join = thread::Builder::new()
            .name("snapshot-refresh".into())
            .spawn(move || self.run())?;
        Ok(RefreshLoopHandle {
            join: Some(join),
            stop,
        })
    }

    fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "refresh loop started");
        loop {
            // Sleep in small increments so a stop request is noticed quickly.
            let mut remaining = self.interval;
            let tick = Duration::from_millis(50);
            while remaining > Duration::ZERO {
                if self.stop.load(Ordering::Relaxed) {
                    return;
                }
                let sleep = remaining.min(tick);
                thread::sleep(sleep);
                remaining = remaining.saturating_sub(sleep);
            }
            if self.stop.load(Ordering::Relaxed) {
                return;
            }

            let cache = &self.cache;
            match panic::catch_unwind(AssertUnwindSafe(|| cache.refresh_current())) {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "background refresh failed; keeping previous snapshot");
                }
                Err(_) => {
                    tracing::error!("background refresh panicked; keeping previous snapshot");
                }
            }
        }
    }
}

impl RefreshLoopHandle {
    /// Signal the loop to stop and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
