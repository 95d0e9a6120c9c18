/// Point-in-time copy of a memoizing cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub delegate_calls: u64,
    pub delegate_failures: u64,
    pub unknown_transforms: u64,

    pub inserts: u64,
    pub prune_calls: u64, // prune checks that fired, including zero-entry prunes
    pub pruned_entries: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_count: usize,
    pub entry_count: usize,
    pub capacity: usize,
}

impl MemoMetricsSnapshot {
    /// Fraction of `get` calls answered from the cache, or `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
