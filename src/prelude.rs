pub use crate::builder::{DEFAULT_CAPACITY, MemoConfig, MemoizingCacheBuilder};
pub use crate::ds::PruneTable;
pub use crate::error::{ConfigError, InvariantError, TransformError};
pub use crate::inflector::{Inflect, Inflector, MemoizingInflector, PreComputedInflector};
#[cfg(feature = "concurrency")]
pub use crate::memo::ConcurrentMemoizingCache;
pub use crate::memo::MemoizingCache;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::MemoMetricsSnapshot;
pub use crate::policy::prune::{PrunePolicy, PruneTrigger};
pub use crate::registry::{Registry, TransformRegistry};
pub use crate::traits::{ConcurrentCache, Transform, TransformProvider};
