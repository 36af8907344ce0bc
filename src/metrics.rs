use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for mount enumeration and volume queries
#[derive(Clone)]
pub struct Metrics {
    pub enumerations: Arc<AtomicUsize>,
    pub mounts_listed: Arc<AtomicU64>,
    pub lines_skipped: Arc<AtomicU64>,
    pub volume_failures: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            enumerations: Arc::new(AtomicUsize::new(0)),
            mounts_listed: Arc::new(AtomicU64::new(0)),
            lines_skipped: Arc::new(AtomicU64::new(0)),
            volume_failures: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_enumerations(&self) {
        self.enumerations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_mounts(&self, count: u64) {
        self.mounts_listed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_skipped(&self, count: u64) {
        self.lines_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_volume_failures(&self, count: u64) {
        self.volume_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enumerations: self.enumerations.load(Ordering::Relaxed),
            mounts_listed: self.mounts_listed.load(Ordering::Relaxed),
            lines_skipped: self.lines_skipped.load(Ordering::Relaxed),
            volume_failures: self.volume_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub enumerations: usize,
    pub mounts_listed: u64,
    pub lines_skipped: u64,
    pub volume_failures: u64,
    pub uptime_seconds: u64,
}
