//! Batch prune policy.
//!
//! Decides *when* a full sub-cache is pruned and *how many* of its oldest
//! entries are dropped. Pruning runs on every miss, before the new entry is
//! inserted.
//!
//! ## Triggers
//!
//! ```text
//!   AtCapacity (default)                 AtOrAboveCapacity
//!   ─────────────────────                ─────────────────────
//!   fires:  len == capacity              fires:  len >= capacity
//!   drops:  floor(capacity * ratio)      drops:  max(1, floor(capacity * ratio))
//!                                                + (len - capacity)
//!
//!   capacity = 10, ratio = 0.2           capacity = 4, ratio = 0.2
//!   [k1 k2 k3 .. k10] + k11              [k1 k2 k3 k4] + k5
//!    └──┘ dropped                          └┘ dropped
//!   => [k3 .. k10 k11]  (len 9)          => [k2 k3 k4 k5]  (len 4)
//! ```
//!
//! `AtCapacity` drops nothing for `capacity * ratio < 1` (with the default
//! ratio, any capacity below 5), so such tables grow past their capacity, and
//! once a table is above capacity the equality trigger never fires again.
//! `AtOrAboveCapacity` always drops at least one entry and absorbs any
//! overshoot, so `len <= capacity` holds after every insert.

use crate::error::ConfigError;

/// Default fraction of capacity dropped by one prune.
pub const DEFAULT_PRUNE_RATIO: f64 = 0.2;

/// Condition under which a prune fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PruneTrigger {
    /// Prune only when the entry count equals capacity exactly.
    #[default]
    AtCapacity,
    /// Prune whenever the entry count has reached or passed capacity.
    AtOrAboveCapacity,
}

/// When and how much to prune.
///
/// # Example
///
/// ```
/// use memokit::policy::prune::{PrunePolicy, PruneTrigger};
///
/// let policy = PrunePolicy::default();
/// assert!(policy.should_prune(10, 10));
/// assert!(!policy.should_prune(11, 10));
/// assert_eq!(policy.prune_count(10, 10), 2);
///
/// let strict = PrunePolicy::new(0.2, PruneTrigger::AtOrAboveCapacity);
/// assert_eq!(strict.prune_count(4, 4), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPrunePolicy"))]
pub struct PrunePolicy {
    ratio: f64,
    trigger: PruneTrigger,
}

/// Unvalidated wire form; deserialized policies go through `try_new`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPrunePolicy {
    ratio: f64,
    #[serde(default)]
    trigger: PruneTrigger,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPrunePolicy> for PrunePolicy {
    type Error = ConfigError;

    fn try_from(raw: RawPrunePolicy) -> Result<Self, Self::Error> {
        Self::try_new(raw.ratio, raw.trigger)
    }
}

impl Default for PrunePolicy {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_PRUNE_RATIO,
            trigger: PruneTrigger::AtCapacity,
        }
    }
}

impl PrunePolicy {
    /// Creates a policy.
    ///
    /// # Panics
    ///
    /// Panics if `ratio` is invalid. See [`try_new`](Self::try_new).
    pub fn new(ratio: f64, trigger: PruneTrigger) -> Self {
        match Self::try_new(ratio, trigger) {
            Ok(policy) => policy,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a policy, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `ratio` is not a finite value in `[0.0, 1.0]`.
    pub fn try_new(ratio: f64, trigger: PruneTrigger) -> Result<Self, ConfigError> {
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::new(format!(
                "prune_ratio must be in [0.0, 1.0], got {}",
                ratio
            )));
        }
        Ok(Self { ratio, trigger })
    }

    /// Fraction of capacity dropped by one prune.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Condition under which a prune fires.
    #[inline]
    pub fn trigger(&self) -> PruneTrigger {
        self.trigger
    }

    /// Returns `true` if a table holding `len` entries must be pruned before
    /// the next insert.
    #[inline]
    pub fn should_prune(&self, len: usize, capacity: usize) -> bool {
        match self.trigger {
            PruneTrigger::AtCapacity => len == capacity,
            PruneTrigger::AtOrAboveCapacity => len >= capacity,
        }
    }

    /// Number of oldest entries one prune drops from a table of `len` entries.
    ///
    /// Never exceeds `len`. May be zero under [`PruneTrigger::AtCapacity`].
    pub fn prune_count(&self, len: usize, capacity: usize) -> usize {
        let batch = (capacity as f64 * self.ratio).floor() as usize;
        let count = match self.trigger {
            PruneTrigger::AtCapacity => batch,
            PruneTrigger::AtOrAboveCapacity => batch.max(1) + len.saturating_sub(capacity),
        };
        count.min(len)
    }
}
