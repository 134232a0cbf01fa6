//! Live counters for a running producer.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Thread-safe counters updated by the producer loop.
///
/// Obtain one from [`Producer::stats`](crate::Producer::stats) or
/// [`ProducerHandle::stats`](crate::ProducerHandle::stats) and read it
/// from any thread while the producer runs.
#[derive(Debug, Default)]
pub struct ProducerStats {
    sent: AtomicU64,
    bytes: AtomicU64,
    failures: AtomicU64,
    categories: RwLock<BTreeMap<&'static str, Arc<AtomicU64>>>,
}

impl ProducerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acknowledged record.
    pub fn record_sent(&self, category: &'static str, bytes: usize) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.category_counter(category).fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed sink call (including ones that are retried).
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Copy the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let by_category = self
            .categories
            .read()
            .iter()
            .map(|(name, count)| (name.to_string(), count.load(Ordering::Relaxed)))
            .collect();

        StatsSnapshot {
            sent: self.sent(),
            bytes: self.bytes.load(Ordering::Relaxed),
            failures: self.failures(),
            by_category,
        }
    }

    fn category_counter(&self, category: &'static str) -> Arc<AtomicU64> {
        // Fast path: check if it exists
        {
            let categories = self.categories.read();
            if let Some(counter) = categories.get(category) {
                return counter.clone();
            }
        }

        let mut categories = self.categories.write();
        categories.entry(category).or_default().clone()
    }
}

/// Point-in-time copy of [`ProducerStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Records acknowledged by the sink.
    pub sent: u64,
    /// Payload bytes acknowledged by the sink.
    pub bytes: u64,
    /// Failed sink calls.
    pub failures: u64,
    /// Acknowledged records per category.
    pub by_category: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    /// Fraction of sent records in `category`, or 0 if nothing was sent.
    pub fn frequency(&self, category: &str) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        self.by_category.get(category).copied().unwrap_or(0) as f64 / self.sent as f64
    }
}
