use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::{CoreMetricsRecorder, MemoMetricsRecorder};

/// Counters shared by [`MemoizingCache`](crate::memo::MemoizingCache) and
/// its concurrent wrapper.
#[derive(Debug, Default)]
pub struct MemoMetrics {
    pub get_hits: AtomicU64,
    pub get_misses: AtomicU64,
    pub delegate_calls: AtomicU64,
    pub delegate_failures: AtomicU64,
    pub unknown_transforms: AtomicU64,
    pub inserts: AtomicU64,
    pub prune_calls: AtomicU64,
    pub pruned_entries: AtomicU64,
    pub clears: AtomicU64,
}

impl MemoMetrics {
    pub fn new() -> MemoMetrics {
        Self::default()
    }

    /// Copies the counters into a snapshot; gauges are left for the caller.
    pub fn snapshot_counters(&self) -> MemoMetricsSnapshot {
        let hits = self.get_hits.load(Ordering::Relaxed);
        let misses = self.get_misses.load(Ordering::Relaxed);
        MemoMetricsSnapshot {
            get_calls: hits + misses,
            get_hits: hits,
            get_misses: misses,
            delegate_calls: self.delegate_calls.load(Ordering::Relaxed),
            delegate_failures: self.delegate_failures.load(Ordering::Relaxed),
            unknown_transforms: self.unknown_transforms.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            prune_calls: self.prune_calls.load(Ordering::Relaxed),
            pruned_entries: self.pruned_entries.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            ..Default::default()
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.get_hits,
            &self.get_misses,
            &self.delegate_calls,
            &self.delegate_failures,
            &self.unknown_transforms,
            &self.inserts,
            &self.prune_calls,
            &self.pruned_entries,
            &self.clears,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[inline]
fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl CoreMetricsRecorder for MemoMetrics {
    fn record_get_hit(&self) {
        bump(&self.get_hits);
    }

    fn record_get_miss(&self) {
        bump(&self.get_misses);
    }

    fn record_insert(&self) {
        bump(&self.inserts);
    }

    fn record_clear(&self) {
        bump(&self.clears);
    }
}

impl MemoMetricsRecorder for MemoMetrics {
    fn record_delegate_call(&self) {
        bump(&self.delegate_calls);
    }

    fn record_delegate_failure(&self) {
        bump(&self.delegate_failures);
    }

    fn record_unknown_transform(&self) {
        bump(&self.unknown_transforms);
    }

    fn record_prune_call(&self) {
        bump(&self.prune_calls);
    }

    fn record_pruned_entries(&self, count: usize) {
        self.pruned_entries
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}
