//! Construction-time configuration for memoizing caches.
//!
//! A single tunable, the per-name capacity, covers most uses. The prune
//! ratio and trigger are exposed for callers who need a hard size bound.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use memokit::builder::MemoizingCacheBuilder;
//! use memokit::inflector::Inflector;
//! use memokit::policy::prune::PruneTrigger;
//!
//! let mut cache = MemoizingCacheBuilder::new(100)
//!     .prune_ratio(0.25)
//!     .trigger(PruneTrigger::AtOrAboveCapacity)
//!     .build(Arc::new(Inflector));
//!
//! assert_eq!(cache.get("snake", "ContentType").unwrap(), "content_type");
//! assert_eq!(cache.capacity(), 100);
//! ```

use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use crate::memo::ConcurrentMemoizingCache;
use crate::error::ConfigError;
use crate::memo::MemoizingCache;
use crate::policy::prune::{DEFAULT_PRUNE_RATIO, PrunePolicy, PruneTrigger};
use crate::traits::TransformProvider;

/// Default number of entries held per cache name.
pub const DEFAULT_CAPACITY: usize = 500;

/// Plain configuration values for a memoizing cache.
///
/// With the `serde` feature enabled this deserializes from configuration
/// files; missing fields take their defaults.
///
/// ```
/// use memokit::builder::MemoConfig;
///
/// let config = MemoConfig::default();
/// assert_eq!(config.capacity, 500);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoConfig {
    /// Entries held per cache name before pruning triggers. Must be > 0.
    pub capacity: usize,
    /// Fraction of capacity dropped per prune, in `[0.0, 1.0]`.
    pub prune_ratio: f64,
    /// Condition under which a prune fires.
    pub trigger: PruneTrigger,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            prune_ratio: DEFAULT_PRUNE_RATIO,
            trigger: PruneTrigger::AtCapacity,
        }
    }
}

impl MemoConfig {
    /// Default configuration with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Checks every field and returns the resulting prune policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is zero or the ratio is out of
    /// range.
    pub fn validate(&self) -> Result<PrunePolicy, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        PrunePolicy::try_new(self.prune_ratio, self.trigger)
    }
}

/// Builder for [`MemoizingCache`] and [`ConcurrentMemoizingCache`].
#[derive(Debug, Clone)]
pub struct MemoizingCacheBuilder {
    config: MemoConfig,
}

impl Default for MemoizingCacheBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoizingCacheBuilder {
    /// Creates a builder with the given per-name capacity and default pruning.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: MemoConfig::with_capacity(capacity),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: MemoConfig) -> Self {
        Self { config }
    }

    /// Sets the fraction of capacity dropped per prune.
    pub fn prune_ratio(mut self, ratio: f64) -> Self {
        self.config.prune_ratio = ratio;
        self
    }

    /// Sets the prune trigger.
    pub fn trigger(mut self, trigger: PruneTrigger) -> Self {
        self.config.trigger = trigger;
        self
    }

    /// Validates and returns the configuration without building a cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid.
    pub fn try_config(self) -> Result<MemoConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Builds an exclusive-access cache around `delegate`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build`](Self::try_build).
    pub fn build<K, V, P>(self, delegate: Arc<P>) -> MemoizingCache<K, V, P>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        P: TransformProvider<K, V> + ?Sized,
    {
        match self.try_build(delegate) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds an exclusive-access cache, returning an error on invalid
    /// parameters instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity or prune ratio is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use memokit::builder::MemoizingCacheBuilder;
    /// use memokit::inflector::Inflector;
    ///
    /// let bad = MemoizingCacheBuilder::new(10)
    ///     .prune_ratio(-1.0)
    ///     .try_build::<String, String, _>(Arc::new(Inflector));
    /// assert!(bad.is_err());
    /// ```
    pub fn try_build<K, V, P>(
        self,
        delegate: Arc<P>,
    ) -> Result<MemoizingCache<K, V, P>, ConfigError>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        P: TransformProvider<K, V> + ?Sized,
    {
        MemoizingCache::from_config(delegate, &self.config)
    }

    /// Builds a shared-safe cache around `delegate`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build_concurrent`](Self::try_build_concurrent).
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<K, V, P>(self, delegate: Arc<P>) -> ConcurrentMemoizingCache<K, V, P>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        P: TransformProvider<K, V> + ?Sized,
    {
        match self.try_build_concurrent(delegate) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a shared-safe cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity or prune ratio is invalid.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<K, V, P>(
        self,
        delegate: Arc<P>,
    ) -> Result<ConcurrentMemoizingCache<K, V, P>, ConfigError>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        P: TransformProvider<K, V> + ?Sized,
    {
        ConcurrentMemoizingCache::from_config(delegate, &self.config)
    }
}
