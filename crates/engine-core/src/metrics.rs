use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Lines,
    Rows,
    Batches,
    Failures,
}

/// Per-job counters. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<[AtomicU64; 4]>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub rows_accepted: u64,
    pub batches_flushed: u64,
    pub failure_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, counter: Counter, count: u64) {
        self.counters[counter as usize].fetch_add(count, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter as usize].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.get(Counter::Lines),
            rows_accepted: self.get(Counter::Rows),
            batches_flushed: self.get(Counter::Batches),
            failure_count: self.get(Counter::Failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let metrics = Metrics::new();
        metrics.clone().add(Counter::Rows, 3);
        metrics.add(Counter::Batches, 1);
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                rows_accepted: 3,
                batches_flushed: 1,
                ..Default::default()
            }
        );
    }
}
