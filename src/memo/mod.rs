//! Memoizing caches over a [`TransformProvider`].
//!
//! ## Architecture
//!
//! ```text
//!   get(name, key)
//!        │
//!        ▼
//!   ┌──────────────────────┐   hit    ┌────────────────────┐
//!   │ caches[name].get(key)│ ───────▶ │ return clone       │
//!   └──────────┬───────────┘          └────────────────────┘
//!              │ miss
//!              ▼
//!   ┌──────────────────────┐
//!   │ prune check (policy) │  drops oldest floor(capacity * ratio)
//!   └──────────┬───────────┘
//!              ▼
//!   ┌──────────────────────┐   Err    ┌────────────────────┐
//!   │ delegate.transform() │ ───────▶ │ propagate, no write│
//!   └──────────┬───────────┘          └────────────────────┘
//!              │ Ok
//!              ▼
//!   ┌──────────────────────┐
//!   │ insert as newest     │
//!   └──────────────────────┘
//! ```
//!
//! Two access modes share this sequence:
//!
//! | Type                         | `get` receiver | Synchronization                        |
//! |------------------------------|----------------|----------------------------------------|
//! | [`MemoizingCache`]           | `&mut self`    | None; callers serialize access         |
//! | [`ConcurrentMemoizingCache`] | `&self`        | `RwLock` name map + `Mutex` per name   |
//!
//! The prune check runs before the delegate is called. A delegate failure
//! therefore leaves any prune that already happened in place.

mod exclusive;
pub use exclusive::MemoizingCache;

#[cfg(feature = "concurrency")]
mod concurrent;
#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentMemoizingCache;

use std::borrow::Borrow;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::PruneTable;
use crate::error::TransformError;
use crate::traits::TransformProvider;

#[cfg(feature = "metrics")]
pub(crate) use crate::metrics::MemoMetrics as Recorder;
#[cfg(feature = "metrics")]
use crate::metrics::{CoreMetricsRecorder, MemoMetricsRecorder};

#[cfg(not(feature = "metrics"))]
pub(crate) use noop::Recorder;

#[cfg(not(feature = "metrics"))]
mod noop {
    /// Stand-in for the metrics recorder when the `metrics` feature is off.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder;

    impl Recorder {
        #[inline(always)]
        pub(crate) fn record_get_hit(&self) {}
        #[inline(always)]
        pub(crate) fn record_get_miss(&self) {}
        #[inline(always)]
        pub(crate) fn record_insert(&self) {}
        #[inline(always)]
        pub(crate) fn record_clear(&self) {}
        #[inline(always)]
        pub(crate) fn record_delegate_call(&self) {}
        #[inline(always)]
        pub(crate) fn record_delegate_failure(&self) {}
        #[inline(always)]
        pub(crate) fn record_unknown_transform(&self) {}
        #[inline(always)]
        pub(crate) fn record_prune_call(&self) {}
        #[inline(always)]
        pub(crate) fn record_pruned_entries(&self, _count: usize) {}
    }
}

/// Returns the memoized value for `key`, or prunes, computes, and memoizes it.
pub(crate) fn lookup_or_compute<K, V, Q, P>(
    table: &mut PruneTable<K, V>,
    name: &str,
    key: &Q,
    delegate: &P,
    recorder: &Recorder,
) -> Result<V, TransformError<P::Error>>
where
    K: Clone + Eq + Hash + Borrow<Q>,
    V: Clone,
    Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
    P: TransformProvider<K, V> + ?Sized,
{
    if let Some(value) = table.get(key) {
        recorder.record_get_hit();
        return Ok(value.clone());
    }
    recorder.record_get_miss();

    if table.needs_prune() {
        let removed = table.prune();
        recorder.record_prune_call();
        recorder.record_pruned_entries(removed);
        if removed == 0 {
            trace!(
                cache = name,
                len = table.len(),
                capacity = table.capacity(),
                "prune fired but batch size is zero"
            );
        } else {
            debug!(
                cache = name,
                removed,
                len = table.len(),
                capacity = table.capacity(),
                "pruned memo cache"
            );
        }
    }

    let owned = key.to_owned();
    recorder.record_delegate_call();
    let value = match delegate.transform(name, &owned) {
        Ok(value) => value,
        Err(err) => {
            if err.is_unknown() {
                recorder.record_unknown_transform();
                debug!(cache = name, "no transform registered under this name");
            } else {
                recorder.record_delegate_failure();
                debug!(cache = name, "delegate failed; result not memoized");
            }
            return Err(err);
        },
    };

    table.insert(owned, value.clone());
    recorder.record_insert();
    Ok(value)
}
