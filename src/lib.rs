//! memokit: bounded memoization for pure, named transforms.
//!
//! A [`MemoizingCache`](memo::MemoizingCache) sits in front of a
//! [`TransformProvider`](traits::TransformProvider) and remembers its results
//! per transform name. Each name gets its own insertion-ordered table; when a
//! table fills up, the oldest fifth is dropped in one batch before the next
//! miss is computed.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use memokit::prelude::*;
//!
//! let mut cache = MemoizingCache::new(Arc::new(Inflector), 500);
//! assert_eq!(cache.get("camel", "content_type").unwrap(), "ContentType");
//! assert_eq!(cache.len("camel"), 1);
//! ```
//!
//! See `DESIGN.md` for how the pieces fit together.

pub mod builder;
pub mod ds;
pub mod error;
pub mod inflector;
pub mod memo;
pub mod policy;
pub mod registry;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
