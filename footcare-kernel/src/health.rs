use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::ports::{MetricsStore, StoreInfo};

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub memory_usage_mb: f32,
    pub store: StoreInfo,
    pub samples_persisted: u64,
    pub persistence_failures: u64,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    samples_persisted: Arc<AtomicU64>,
    persistence_failures: Arc<AtomicU64>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            samples_persisted: Arc::new(AtomicU64::new(0)),
            persistence_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_persisted(&self) {
        self.samples_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_health(&self, store: &dyn MetricsStore) -> KernelHealth {
        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            memory_usage_mb: get_memory_usage_mb(),
            store: store.info(),
            samples_persisted: self.samples_persisted.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn get_memory_usage_mb() -> f32 {
    #[cfg(target_os = "linux")]
    {
        let pid = std::process::id();
        if let Ok(status) = std::fs::read_to_string(format!("/proc/{}/status", pid)) {
            for line in status.lines() {
                if let Some(rest) = line.strip_prefix("VmRSS:") {
                    if let Some(Ok(kb)) = rest.split_whitespace().next().map(str::parse::<u64>) {
                        return (kb as f32) / 1024.0; // KB -> MB
                    }
                }
            }
        }
    }

    // approximatif hors Linux
    12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryStore;

    #[test]
    fn test_counters_are_shared_between_clones() {
        let tracker = HealthTracker::new();
        let clone = tracker.clone();
        clone.record_persisted();
        clone.record_persisted();
        tracker.record_failure();

        let health = tracker.get_health(&MemoryStore::new());
        assert_eq!(health.samples_persisted, 2);
        assert_eq!(health.persistence_failures, 1);
        assert_eq!(health.store.kind, "memory");
        assert!(health.memory_usage_mb > 0.0);
    }
}
