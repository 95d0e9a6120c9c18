use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Recorder, lookup_or_compute};
use crate::builder::{DEFAULT_CAPACITY, MemoConfig};
use crate::ds::PruneTable;
use crate::error::{ConfigError, InvariantError, TransformError};
use crate::policy::prune::PrunePolicy;
use crate::traits::{ConcurrentCache, TransformProvider};

#[cfg(feature = "metrics")]
use crate::metrics::{
    CoreMetricsRecorder, MemoMetricsSnapshot, MetricsReset, MetricsSnapshotProvider,
};

type SharedTable<K, V> = Arc<Mutex<PruneTable<K, V>>>;

/// Sub-caches by name, plus the names created eagerly through `with_caches`.
struct Tables<K, V> {
    by_name: FxHashMap<String, SharedTable<K, V>>,
    pinned: FxHashSet<String>,
}

struct Shared<K, V, P: ?Sized> {
    caches: RwLock<Tables<K, V>>,
    delegate: Arc<P>,
    capacity: usize,
    policy: PrunePolicy,
    recorder: Recorder,
}

/// Thread-safe memoizing cache (shared-safe mode).
///
/// The name → sub-cache map sits behind a `RwLock`; each sub-cache has its
/// own `Mutex`. A `get` holds its sub-cache's mutex for the whole
/// check-miss-prune-compute-insert sequence, so:
///
/// - every `get` is atomic with respect to other calls on the same name;
/// - concurrent misses on the same key call the delegate exactly once;
/// - calls on different names never wait for each other's delegate.
///
/// A slow delegate blocks other callers of the same name for its duration.
/// Timeouts, if needed, belong inside the delegate.
///
/// Cloning is cheap and yields a handle to the same caches.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use memokit::inflector::Inflector;
/// use memokit::memo::ConcurrentMemoizingCache;
///
/// let cache = ConcurrentMemoizingCache::new(Arc::new(Inflector), 100);
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let cache = cache.clone();
///         thread::spawn(move || cache.get("camel", "user_agent").unwrap())
///     })
///     .collect();
/// for h in handles {
///     assert_eq!(h.join().unwrap(), "UserAgent");
/// }
/// assert_eq!(cache.len("camel"), 1);
/// ```
pub struct ConcurrentMemoizingCache<K, V, P: ?Sized> {
    inner: Arc<Shared<K, V, P>>,
}

impl<K, V, P: ?Sized> Clone for ConcurrentMemoizingCache<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, P> ConcurrentMemoizingCache<K, V, P>
where
    K: Clone + Eq + Hash,
    V: Clone,
    P: TransformProvider<K, V> + ?Sized,
{
    /// Creates a cache holding at most `capacity` entries per name.
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
            inner: Arc::new(Shared {
                caches: RwLock::new(Tables {
                    by_name: FxHashMap::default(),
                    pinned: FxHashSet::default(),
                }),
                delegate,
                capacity: config.capacity,
                policy,
                recorder: Recorder::default(),
            }),
        })
    }

    /// Eagerly creates empty sub-caches for `names`.
    pub fn with_caches<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut caches = self.inner.caches.write();
            for name in names {
                let name = name.into();
                caches.pinned.insert(name.clone());
                caches
                    .by_name
                    .entry(name)
                    .or_insert_with(|| self.new_table());
            }
        }
        self
    }

    fn new_table(&self) -> SharedTable<K, V> {
        Arc::new(Mutex::new(PruneTable::with_policy(
            self.inner.capacity,
            self.inner.policy,
        )))
    }

    /// Returns the sub-cache for `name`, creating it if needed.
    fn table_for(&self, name: &str) -> SharedTable<K, V> {
        if let Some(table) = self.inner.caches.read().by_name.get(name) {
            return Arc::clone(table);
        }
        let mut caches = self.inner.caches.write();
        if let Some(table) = caches.by_name.get(name) {
            return Arc::clone(table);
        }
        let table = self.new_table();
        caches.by_name.insert(name.to_string(), Arc::clone(&table));
        table
    }

    /// Drops the lazily created, still empty sub-cache for a name the
    /// delegate does not know.
    fn discard_unknown(&self, name: &str, table: &SharedTable<K, V>) {
        let mut caches = self.inner.caches.write();
        if caches.pinned.contains(name) {
            return;
        }
        // Never wait on a table while holding the name map: a busy table
        // belongs to a `get` that runs this check again once it finishes.
        let unused = caches.by_name.get(name).is_some_and(|current| {
            Arc::ptr_eq(current, table) && current.try_lock().is_some_and(|t| t.is_empty())
        });
        if unused {
            caches.by_name.remove(name);
        }
    }

    /// Returns the value of transform `name` for `key`, memoizing it on a miss.
    ///
    /// Same contract as [`MemoizingCache::get`](crate::memo::MemoizingCache::get),
    /// atomic per cache name.
    ///
    /// # Errors
    ///
    /// - [`TransformError::UnknownTransform`] if the delegate has no
    ///   transform called `name`.
    /// - [`TransformError::Failed`] if the delegate rejects `key`.
    pub fn get<Q>(&self, name: &str, key: &Q) -> Result<V, TransformError<P::Error>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ToOwned<Owned = K> + ?Sized,
    {
        let table = self.table_for(name);
        let result = {
            let mut guard = table.lock();
            lookup_or_compute(
                &mut guard,
                name,
                key,
                &*self.inner.delegate,
                &self.inner.recorder,
            )
        };

        if matches!(result, Err(TransformError::UnknownTransform(_))) {
            self.discard_unknown(name, &table);
        }
        result
    }

    /// Returns a clone of the memoized value without calling the delegate.
    pub fn peek<Q>(&self, name: &str, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let table = self.inner.caches.read().by_name.get(name).cloned()?;
        let guard = table.lock();
        guard.get(key).cloned()
    }

    /// Returns `true` if `key` is memoized under `name`.
    pub fn contains<Q>(&self, name: &str, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let table = match self.inner.caches.read().by_name.get(name) {
            Some(table) => Arc::clone(table),
            None => return false,
        };
        let guard = table.lock();
        guard.contains(key)
    }

    /// Number of entries memoized under `name`; zero for unseen names.
    pub fn len(&self, name: &str) -> usize {
        let table = match self.inner.caches.read().by_name.get(name) {
            Some(table) => Arc::clone(table),
            None => return 0,
        };
        table.lock().len()
    }

    /// Number of entries across every sub-cache.
    pub fn total_len(&self) -> usize {
        self.tables().iter().map(|t| t.lock().len()).sum()
    }

    /// Returns `true` if no sub-cache holds an entry.
    pub fn is_empty(&self) -> bool {
        self.tables().iter().all(|t| t.lock().is_empty())
    }

    fn tables(&self) -> Vec<SharedTable<K, V>> {
        self.inner.caches.read().by_name.values().cloned().collect()
    }

    /// Per-name capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Prune policy applied to every sub-cache.
    #[inline]
    pub fn policy(&self) -> PrunePolicy {
        self.inner.policy
    }

    /// Names of the sub-caches created so far, in no particular order.
    pub fn cache_names(&self) -> Vec<String> {
        self.inner.caches.read().by_name.keys().cloned().collect()
    }

    /// The shared delegate.
    #[inline]
    pub fn delegate(&self) -> &Arc<P> {
        &self.inner.delegate
    }

    /// Empties every sub-cache.
    pub fn clear(&self) {
        for table in self.tables() {
            table.lock().clear();
        }
        self.inner.recorder.record_clear();
    }

    /// Empties one sub-cache. Returns `false` if `name` has no sub-cache.
    pub fn clear_cache(&self, name: &str) -> bool {
        let table = match self.inner.caches.read().by_name.get(name) {
            Some(table) => Arc::clone(table),
            None => return false,
        };
        table.lock().clear();
        self.inner.recorder.record_clear();
        true
    }

    /// Validates every sub-cache.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found, prefixed with the cache name.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let caches = self.inner.caches.read();
        for (name, table) in caches.by_name.iter() {
            table
                .lock()
                .check_invariants()
                .map_err(|e| InvariantError::new(format!("{}: {}", name, e.message())))?;
        }
        Ok(())
    }

    /// Returns a snapshot of the counters plus current size gauges.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        let tables = self.tables();
        MemoMetricsSnapshot {
            cache_count: tables.len(),
            entry_count: tables.iter().map(|t| t.lock().len()).sum(),
            capacity: self.inner.capacity,
            ..self.inner.recorder.snapshot_counters()
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> MetricsSnapshotProvider<MemoMetricsSnapshot> for ConcurrentMemoizingCache<K, V, P>
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
impl<K, V, P: ?Sized> MetricsReset for ConcurrentMemoizingCache<K, V, P> {
    fn reset_metrics(&self) {
        self.inner.recorder.reset();
    }
}

impl<K, V, P> ConcurrentCache for ConcurrentMemoizingCache<K, V, P>
where
    K: Send + Sync,
    V: Send + Sync,
    P: Send + Sync + ?Sized,
{
}

impl<K, V, P: ?Sized> std::fmt::Debug for ConcurrentMemoizingCache<K, V, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentMemoizingCache")
            .field("capacity", &self.inner.capacity)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}
