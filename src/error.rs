//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`TransformError`]: Returned by [`MemoizingCache::get`](crate::memo::MemoizingCache::get)
//!   when the named transform does not exist or the delegate fails.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity, out-of-range prune ratio).
//! - [`InvariantError`]: Returned when internal table invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use memokit::builder::MemoizingCacheBuilder;
//! use memokit::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let ok: Result<_, ConfigError> = MemoizingCacheBuilder::new(100).try_config();
//! assert!(ok.is_ok());
//!
//! // Invalid ratio is caught without panicking
//! let bad = MemoizingCacheBuilder::new(100).prune_ratio(2.0).try_config();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// TransformError
// ---------------------------------------------------------------------------

/// Error returned when a named transform cannot produce a value.
///
/// Neither variant is ever memoized: a failed lookup leaves the cache exactly
/// as the pre-insert prune step left it.
///
/// # Example
///
/// ```
/// use memokit::error::TransformError;
///
/// let err: TransformError<std::num::ParseIntError> =
///     TransformError::UnknownTransform("kebab".to_string());
/// assert_eq!(err.to_string(), "no such transform: kebab");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError<E> {
    /// No delegate behavior is registered under the requested name.
    UnknownTransform(String),
    /// The delegate rejected the input.
    Failed(E),
}

impl<E> TransformError<E> {
    /// Returns `true` for [`TransformError::UnknownTransform`].
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownTransform(_))
    }

    /// Returns the delegate error, if this is a delegate failure.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::UnknownTransform(_) => None,
        }
    }

    /// Maps the delegate error type, leaving unknown-name errors untouched.
    pub fn map_failure<F, E2>(self, f: F) -> TransformError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Failed(e) => TransformError::Failed(f(e)),
            Self::UnknownTransform(name) => TransformError::UnknownTransform(name),
        }
    }
}

impl<E: fmt::Display> fmt::Display for TransformError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTransform(name) => write!(f, "no such transform: {}", name),
            Self::Failed(e) => write!(f, "transform failed: {}", e),
        }
    }
}

impl<E> std::error::Error for TransformError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            Self::UnknownTransform(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal table invariants are violated.
///
/// Produced by debug-only `check_invariants` methods
/// (e.g. [`PruneTable::check_invariants`](crate::ds::PruneTable::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`MemoizingCacheBuilder::try_build`](crate::builder::MemoizingCacheBuilder::try_build)
/// and [`PrunePolicy::try_new`](crate::policy::prune::PrunePolicy::try_new).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use memokit::builder::MemoizingCacheBuilder;
///
/// let err = MemoizingCacheBuilder::new(0).try_config().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- TransformError ---------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Malformed;

    impl fmt::Display for Malformed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("malformed word")
        }
    }

    impl std::error::Error for Malformed {}

    #[test]
    fn transform_display_unknown() {
        let err: TransformError<Malformed> = TransformError::UnknownTransform("title".into());
        assert_eq!(err.to_string(), "no such transform: title");
        assert!(err.is_unknown());
    }

    #[test]
    fn transform_display_failed() {
        let err = TransformError::Failed(Malformed);
        assert_eq!(err.to_string(), "transform failed: malformed word");
        assert!(!err.is_unknown());
    }

    #[test]
    fn transform_source_points_at_delegate_error() {
        use std::error::Error;

        let failed = TransformError::Failed(Malformed);
        assert!(failed.source().is_some());

        let unknown: TransformError<Malformed> = TransformError::UnknownTransform("x".into());
        assert!(unknown.source().is_none());
    }

    #[test]
    fn transform_into_failure_and_map() {
        let err = TransformError::Failed(7u32);
        assert_eq!(err.clone().into_failure(), Some(7));
        assert_eq!(err.map_failure(|n| n * 2), TransformError::Failed(14));

        let unknown: TransformError<u32> = TransformError::UnknownTransform("y".into());
        assert_eq!(unknown.clone().into_failure(), None);
        assert_eq!(
            unknown.map_failure(|n| n + 1),
            TransformError::UnknownTransform("y".into())
        );
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("order length mismatch");
        assert_eq!(err.to_string(), "order length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("bad ratio");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad ratio"));
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
