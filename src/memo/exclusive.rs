use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Recorder, lookup_or_compute};
use crate::builder::{DEFAULT_CAPACITY, MemoConfig};
use crate::ds::PruneTable;
use crate::error::{ConfigError, InvariantError, TransformError};
use crate::policy::prune::PrunePolicy;
use crate::traits::TransformProvider;

#[cfg(feature = "metrics")]
use crate::metrics::{
    CoreMetricsRecorder, MemoMetricsSnapshot, MetricsReset, MetricsSnapshotProvider,
};

/// Bounded memoizing cache in exclusive-access mode.
///
/// Holds one [`PruneTable`] per cache name and a shared reference to the
/// delegate computing values on a miss. `get` takes `&mut self`; wrap the
/// cache in a lock, or use
/// [`ConcurrentMemoizingCache`](crate::memo::ConcurrentMemoizingCache), to
/// share it between threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use memokit::inflector::Inflector;
/// use memokit::memo::MemoizingCache;
///
/// let mut cache = MemoizingCache::new(Arc::new(Inflector), 500);
///
/// assert_eq!(cache.get("camel", "foo_bar").unwrap(), "FooBar");
/// assert_eq!(cache.get("snake", "FooBar").unwrap(), "foo_bar");
/// assert!(cache.contains("camel", "foo_bar"));
///
/// // Unknown names are errors, never empty defaults.
/// assert!(cache.get("kebab", "foo_bar").is_err());
/// ```
pub struct MemoizingCache<K, V, P: ?Sized> {
    caches: FxHashMap<String, PruneTable<K, V>>,
    delegate: Arc<P>,
    capacity: usize,
    policy: PrunePolicy,
    recorder: Recorder,
}

impl<K, V, P> MemoizingCache<K, V, P>
where
    K: Clone + Eq + Hash,
    V: Clone,
    P: TransformProvider<K, V> + ?Sized,
{
    /// Creates a cache holding at most `capacity` entries per name, pruned
    /// with the default [`PrunePolicy`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(delegate: Arc<P>, capacity: usize) -> Self {
        match Self::try_new(delegate, capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache with the default capacity (500 entries per name).
    pub fn with_default_capacity(delegate: Arc<P>) -> Self {
        Self::new(delegate, DEFAULT_CAPACITY)
    }

    /// Creates a cache, returning an error if `capacity` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero capacity.
    pub fn try_new(delegate: Arc<P>, capacity: usize) -> Result<Self, ConfigError> {
        Self::from_config(delegate, &MemoConfig::with_capacity(capacity))
    }

    /// Creates a cache from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn from_config(delegate: Arc<P>, config: &MemoConfig) -> Result<Self, ConfigError> {
        let policy = config.validate()?;
        Ok(Self {
            caches: FxHashMap::default(),
            delegate,
            capacity: config.capacity,
            policy,
            recorder: Recorder::default(),
        })
    }

    /// Eagerly creates empty sub-caches for `names`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use memokit::inflector::Inflector;
    /// use memokit::memo::MemoizingCache;
    ///
    /// let cache = MemoizingCache::new(Arc::new(Inflector), 10).with_caches(["snake", "camel"]);
    /// let mut names: Vec<&str> = cache.cache_names().collect();
    /// names.sort();
    /// assert_eq!(names, ["camel", "snake"]);
    /// ```
    pub fn with_caches<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let (capacity, policy) = (self.capacity, self.policy);
            self.caches
                .entry(name.into())
                .or_insert_with(|| PruneTable::with_policy(capacity, policy));
        }
        self
    }

    /// Returns the value of transform `name` for `key`, memoizing it on a miss.
    ///
    /// On a hit the delegate is not called. On a miss the sub-cache is
    /// pruned if full, then the delegate computes the value, which is stored
    /// as the newest entry.
    ///
    /// # Errors
    ///
    /// - [`TransformError::UnknownTransform`] if the delegate has no
    ///   transform called `name`.
    /// - [`TransformError::Failed`] if the delegate rejects `key`.
    ///
    /// Nothing is memoized in either case.
    pub fn get<Q>(&mut self, name: &str, key: &Q) -> Result<V, TransformError<P::Error>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
    {
        let created = !self.caches.contains_key(name);
        if created {
            self.caches.insert(
                name.to_string(),
                PruneTable::with_policy(self.capacity, self.policy),
            );
        }

        let result = match self.caches.get_mut(name) {
            Some(table) => lookup_or_compute(table, name, key, &*self.delegate, &self.recorder),
            None => Err(TransformError::UnknownTransform(name.to_string())),
        };

        if created && matches!(result, Err(TransformError::UnknownTransform(_))) {
            self.caches.remove(name);
        }
        result
    }

    /// Returns the memoized value without calling the delegate.
    pub fn peek<Q>(&self, name: &str, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.caches.get(name)?.get(key)
    }

    /// Returns `true` if `key` is memoized under `name`.
    pub fn contains<Q>(&self, name: &str, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.peek(name, key).is_some()
    }

    /// Number of entries memoized under `name`; zero for unseen names.
    pub fn len(&self, name: &str) -> usize {
        self.caches.get(name).map_or(0, PruneTable::len)
    }

    /// Number of entries across every sub-cache.
    pub fn total_len(&self) -> usize {
        self.caches.values().map(PruneTable::len).sum()
    }

    /// Returns `true` if no sub-cache holds an entry.
    pub fn is_empty(&self) -> bool {
        self.caches.values().all(PruneTable::is_empty)
    }

    /// Per-name capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prune policy applied to every sub-cache.
    #[inline]
    pub fn policy(&self) -> PrunePolicy {
        self.policy
    }

    /// Names of the sub-caches created so far, in no particular order.
    pub fn cache_names(&self) -> impl Iterator<Item = &str> {
        self.caches.keys().map(String::as_str)
    }

    /// The sub-cache for `name`, if it exists.
    pub fn table(&self, name: &str) -> Option<&PruneTable<K, V>> {
        self.caches.get(name)
    }

    /// The shared delegate.
    #[inline]
    pub fn delegate(&self) -> &Arc<P> {
        &self.delegate
    }

    /// Empties every sub-cache, keeping the sub-caches themselves.
    pub fn clear(&mut self) {
        for table in self.caches.values_mut() {
            table.clear();
        }
        self.recorder.record_clear();
    }

    /// Empties one sub-cache. Returns `false` if `name` has no sub-cache.
    pub fn clear_cache(&mut self, name: &str) -> bool {
        match self.caches.get_mut(name) {
            Some(table) => {
                table.clear();
                self.recorder.record_clear();
                true
            },
            None => false,
        }
    }

    /// Validates every sub-cache.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found, prefixed with the cache name.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (name, table) in &self.caches {
            table
                .check_invariants()
                .map_err(|e| InvariantError::new(format!("{}: {}", name, e.message())))?;
        }
        Ok(())
    }

    /// Returns a snapshot of the counters plus current size gauges.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        MemoMetricsSnapshot {
            cache_count: self.caches.len(),
            entry_count: self.total_len(),
            capacity: self.capacity,
            ..self.recorder.snapshot_counters()
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> MetricsSnapshotProvider<MemoMetricsSnapshot> for MemoizingCache<K, V, P>
where
    K: Clone + Eq + Hash,
    V: Clone,
    P: TransformProvider<K, V> + ?Sized,
{
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P: ?Sized> MetricsReset for MemoizingCache<K, V, P> {
    fn reset_metrics(&self) {
        self.recorder.reset();
    }
}

impl<K, V, P: ?Sized> std::fmt::Debug for MemoizingCache<K, V, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizingCache")
            .field("caches", &self.caches.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fmt;

    use super::*;
    use crate::builder::MemoizingCacheBuilder;
    use crate::policy::prune::PruneTrigger;

    /// Counts delegate calls per name; rejects keys containing a space.
    #[derive(Default)]
    struct Counting {
        calls: Cell<usize>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct HasSpace;

    impl fmt::Display for HasSpace {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("key contains a space")
        }
    }

    impl TransformProvider<String, String> for Counting {
        type Error = HasSpace;

        fn transform(&self, name: &str, key: &String) -> Result<String, TransformError<HasSpace>> {
            self.calls.set(self.calls.get() + 1);
            if key.contains(' ') {
                return Err(TransformError::Failed(HasSpace));
            }
            match name {
                "upper" => Ok(key.to_uppercase()),
                "rev" => Ok(key.chars().rev().collect()),
                other => Err(TransformError::UnknownTransform(other.to_string())),
            }
        }
    }

    fn cache(capacity: usize) -> (Arc<Counting>, MemoizingCache<String, String, Counting>) {
        let delegate = Arc::new(Counting::default());
        let cache = MemoizingCache::new(Arc::clone(&delegate), capacity);
        (delegate, cache)
    }

    mod basic_operations {
        use super::*;

        #[test]
        fn test_miss_then_hit() {
            let (delegate, mut cache) = cache(10);
            assert_eq!(cache.get("upper", "abc").unwrap(), "ABC");
            assert_eq!(delegate.calls.get(), 1);

            assert_eq!(cache.get("upper", "abc").unwrap(), "ABC");
            assert_eq!(delegate.calls.get(), 1);
            assert_eq!(cache.len("upper"), 1);
        }

        #[test]
        fn test_peek_does_not_compute() {
            let (delegate, mut cache) = cache(10);
            assert_eq!(cache.peek("upper", "abc"), None);
            cache.get("upper", "abc").unwrap();
            assert_eq!(cache.peek("upper", "abc"), Some(&"ABC".to_string()));
            assert_eq!(delegate.calls.get(), 1);
        }

        #[test]
        fn test_names_are_independent() {
            let (_, mut cache) = cache(10);
            assert_eq!(cache.get("upper", "abc").unwrap(), "ABC");
            assert_eq!(cache.get("rev", "abc").unwrap(), "cba");
            assert!(cache.contains("upper", "abc"));
            assert!(cache.contains("rev", "abc"));
            assert_eq!(cache.total_len(), 2);
        }

        #[test]
        fn test_clear_and_clear_cache() {
            let (_, mut cache) = cache(10);
            cache.get("upper", "a").unwrap();
            cache.get("rev", "a").unwrap();

            assert!(cache.clear_cache("upper"));
            assert!(!cache.contains("upper", "a"));
            assert!(cache.contains("rev", "a"));
            assert!(!cache.clear_cache("missing"));

            cache.clear();
            assert!(cache.is_empty());
        }

        #[test]
        fn test_debug_is_compact() {
            let (_, cache) = cache(10);
            let dbg = format!("{:?}", cache);
            assert!(dbg.contains("MemoizingCache"));
            assert!(dbg.contains("capacity: 10"));
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn test_delegate_failure_not_memoized() {
            let (delegate, mut cache) = cache(10);
            let err = cache.get("upper", "a b").unwrap_err();
            assert_eq!(err, TransformError::Failed(HasSpace));
            assert!(!cache.contains("upper", "a b"));

            let _ = cache.get("upper", "a b");
            assert_eq!(delegate.calls.get(), 2);
        }

        #[test]
        fn test_unknown_name_is_error_and_leaves_no_table() {
            let (_, mut cache) = cache(10);
            let err = cache.get("title", "abc").unwrap_err();
            assert_eq!(err, TransformError::UnknownTransform("title".into()));
            assert!(cache.table("title").is_none());
            assert_eq!(cache.cache_names().count(), 0);
        }

        #[test]
        fn test_eager_table_survives_unknown_name() {
            let (_, cache) = cache(10);
            let mut cache = cache.with_caches(["title"]);
            assert!(cache.get("title", "abc").is_err());
            assert!(cache.table("title").is_some());
        }

        #[test]
        fn test_prune_before_failed_call_stays_applied() {
            let (_, mut cache) = cache(5);
            for key in ["a", "b", "c", "d", "e"] {
                cache.get("upper", key).unwrap();
            }
            assert!(cache.get("upper", "x y").is_err());
            assert_eq!(cache.len("upper"), 4);
            assert!(!cache.contains("upper", "a"));
        }

        #[test]
        fn test_zero_capacity_rejected() {
            let delegate = Arc::new(Counting::default());
            let err = MemoizingCache::<String, String, _>::try_new(delegate, 0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn test_new_panics_on_zero_capacity() {
            let _ = MemoizingCache::<String, String, _>::new(Arc::new(Counting::default()), 0);
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn test_capacity_ten_drops_two_oldest() {
            let (_, mut cache) = cache(10);
            for i in 0..10 {
                cache.get("upper", &format!("k{i}")).unwrap();
            }
            assert_eq!(cache.len("upper"), 10);

            cache.get("upper", "k10").unwrap();
            assert_eq!(cache.len("upper"), 9);
            assert!(!cache.contains("upper", "k0"));
            assert!(!cache.contains("upper", "k1"));
            assert!(cache.contains("upper", "k2"));
            assert!(cache.contains("upper", "k10"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_prune_only_touches_named_cache() {
            let (_, mut cache) = cache(5);
            for key in ["a", "b", "c", "d", "e"] {
                cache.get("upper", key).unwrap();
                cache.get("rev", key).unwrap();
            }
            cache.get("upper", "f").unwrap();
            assert!(!cache.contains("upper", "a"));
            assert!(cache.contains("rev", "a"));
            assert_eq!(cache.len("rev"), 5);
        }

        #[test]
        fn test_sub_threshold_capacity_grows() {
            let (_, mut cache) = cache(4);
            for i in 0..8 {
                cache.get("upper", &format!("k{i}")).unwrap();
            }
            assert_eq!(cache.len("upper"), 8);
        }

        #[test]
        fn test_strict_trigger_holds_bound() {
            let delegate = Arc::new(Counting::default());
            let mut cache: MemoizingCache<String, String, _> = MemoizingCacheBuilder::new(4)
                .trigger(PruneTrigger::AtOrAboveCapacity)
                .build(delegate);
            for i in 0..8 {
                cache.get("upper", &format!("k{i}")).unwrap();
                assert!(cache.len("upper") <= 4);
            }
            assert!(cache.contains("upper", "k7"));
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_snapshot_counts_hits_misses_and_prunes() {
            let (_, mut cache) = cache(5);
            for key in ["a", "b", "c", "d", "e", "a", "f"] {
                cache.get("upper", key).unwrap();
            }
            let _ = cache.get("upper", "x y");
            let _ = cache.get("nope", "a");

            let snap = cache.snapshot();
            assert_eq!(snap.get_calls, 9);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 8);
            assert_eq!(snap.delegate_calls, 8);
            assert_eq!(snap.delegate_failures, 1);
            assert_eq!(snap.unknown_transforms, 1);
            assert_eq!(snap.inserts, 6);
            // "f" and the failing "x y" both arrive at a full table.
            assert_eq!(snap.prune_calls, 2);
            assert_eq!(snap.pruned_entries, 2);
            assert_eq!(snap.cache_count, 1);
            assert_eq!(snap.entry_count, 4);
            assert_eq!(snap.capacity, 5);

            cache.reset_metrics();
            assert_eq!(cache.snapshot().get_calls, 0);
        }
    }
}
