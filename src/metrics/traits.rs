//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting*, and *export* into small traits so
//! the memoizing caches only ever bump counters, and monitoring concerns stay
//! outside the hot path.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │
//!   │  get_hit/get_miss/insert    │
//!   │  clear                      │
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │     MemoMetricsRecorder     │
//!   │  delegate_call/failure      │
//!   │  unknown_transform          │
//!   │  prune_call/pruned_entries  │
//!   └─────────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Recorders take `&self`: counters are atomics so the shared-safe cache can
//! record from any thread without widening its critical sections.

/// Common counters for any memoizing cache.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&self);
    fn record_get_miss(&self);
    fn record_insert(&self);
    fn record_clear(&self);
}

/// Counters specific to delegate calls and batch pruning.
pub trait MemoMetricsRecorder: CoreMetricsRecorder {
    fn record_delegate_call(&self);
    fn record_delegate_failure(&self);
    fn record_unknown_transform(&self);
    fn record_prune_call(&self);
    fn record_pruned_entries(&self, count: usize);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
