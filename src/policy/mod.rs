//! Eviction policies.
//!
//! Memo tables never reorder on access, so the only policy decision is when
//! to drop a batch of the oldest entries and how large that batch is.

pub mod prune;

pub use prune::{DEFAULT_PRUNE_RATIO, PrunePolicy, PruneTrigger};
