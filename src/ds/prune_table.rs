//! Insertion-ordered memo table with batch pruning.
//!
//! A `PruneTable` is the storage behind one named sub-cache. Entries are
//! written once and never updated in place; the only removal paths are the
//! batch prune (oldest entries first) and a full `clear`.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ PruneTable<K, V>                                             │
//!   │                                                              │
//!   │   map:   FxHashMap<K, V>      key -> memoized value          │
//!   │   order: VecDeque<K>          insertion order                │
//!   │                                                              │
//!   │          front (oldest)                      back (newest)   │
//!   │   order: [ k1 ]─[ k2 ]─[ k3 ]─ ... ─[ k9 ]─[ k10 ]           │
//!   │           └──── prune drops from here                        │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because entries are never removed individually, `order` and `map` always
//! hold the same key set; there are no stale queue entries to skip.
//!
//! ## Example
//!
//! ```
//! use memokit::ds::PruneTable;
//!
//! let mut table: PruneTable<String, String> = PruneTable::new(5);
//! for i in 0..5 {
//!     table.insert(format!("k{i}"), format!("v{i}"));
//! }
//! assert_eq!(table.prune(), 1);
//! assert!(!table.contains("k0"));
//! assert_eq!(table.get("k1"), Some(&"v1".to_string()));
//! ```

use std::borrow::Borrow;
use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, InvariantError};
use crate::policy::prune::PrunePolicy;

/// Bounded, insertion-ordered table of memoized values.
pub struct PruneTable<K, V> {
    map: FxHashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
    policy: PrunePolicy,
}

impl<K, V> PruneTable<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty table using the default [`PrunePolicy`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, PrunePolicy::default())
    }

    /// Creates an empty table with an explicit prune policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_with_policy`](Self::try_with_policy).
    pub fn with_policy(capacity: usize, policy: PrunePolicy) -> Self {
        match Self::try_with_policy(capacity, policy) {
            Ok(table) => table,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates an empty table with an explicit prune policy, returning an
    /// error if `capacity` is zero.
    ///
    /// Storage is allocated lazily; a large capacity costs nothing until
    /// entries arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero capacity.
    pub fn try_with_policy(capacity: usize, policy: PrunePolicy) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("table capacity must be greater than zero"));
        }
        Ok(Self {
            map: FxHashMap::default(),
            order: VecDeque::new(),
            capacity,
            policy,
        })
    }

    /// Returns the memoized value for `key`.
    ///
    /// Lookups never reorder entries: eviction follows insertion order only.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.get(key)
    }

    /// Returns `true` if `key` is memoized.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Stores `value` under `key` as the newest entry.
    ///
    /// Returns `false` and discards `value` if `key` is already present;
    /// memoized values are never replaced. Does not prune: callers run
    /// [`prune`](Self::prune) first.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        true
    }

    /// Returns `true` if the prune check fires at the current length.
    #[inline]
    pub fn needs_prune(&self) -> bool {
        self.policy.should_prune(self.map.len(), self.capacity)
    }

    /// Runs the prune check and drops the oldest entries if it fires.
    ///
    /// Returns the number of entries removed, which may be zero even when the
    /// check fires (see [`PrunePolicy::prune_count`]).
    pub fn prune(&mut self) -> usize {
        if !self.needs_prune() {
            return 0;
        }
        let count = self.policy.prune_count(self.map.len(), self.capacity);
        self.drop_oldest(count)
    }

    /// Drops up to `count` of the oldest entries; returns how many were dropped.
    pub fn drop_oldest(&mut self, count: usize) -> usize {
        let count = count.min(self.order.len());
        for key in self.order.drain(..count) {
            self.map.remove(&key);
        }
        count
    }

    /// Returns the oldest entry without removing it.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        let key = self.order.front()?;
        self.map.get(key).map(|v| (key, v))
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |k| self.map.get(k).map(|v| (k, v)))
    }

    /// Number of memoized entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is memoized.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entry count at which the prune check fires.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The prune policy this table applies.
    #[inline]
    pub fn policy(&self) -> PrunePolicy {
        self.policy
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    /// Validates that the order queue and the map describe the same key set.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first mismatch found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.order.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "order length {} does not match map length {}",
                self.order.len(),
                self.map.len()
            )));
        }
        for (pos, key) in self.order.iter().enumerate() {
            if !self.map.contains_key(key) {
                return Err(InvariantError::new(format!(
                    "order position {} refers to a key missing from the map",
                    pos
                )));
            }
        }
        Ok(())
    }
}

impl<K, V> std::fmt::Debug for PruneTable<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PruneTable")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
