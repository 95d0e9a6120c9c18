//! # Transform Traits
//!
//! The memoizing cache never computes anything itself. It calls through a
//! narrow capability, keyed by cache name, and stores what comes back.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────┐
//!   │ MemoizingCache<K, V, P>            │
//!   │   get(name, key) ──miss──────────┐ │
//!   └──────────────────────────────────┼─┘
//!                                      ▼
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ TransformProvider<K, V>                                    │
//!   │   transform(name, key) → Result<V, TransformError<E>>      │
//!   └──────────────┬───────────────────────────────┬─────────────┘
//!                  │                               │
//!                  ▼                               ▼
//!   ┌────────────────────────────┐   ┌───────────────────────────────────┐
//!   │ Inflector / PreComputed…   │   │ Registry<dyn Transform<K, V, …>>  │
//!   │  "snake" | "camel"         │   │  name → Transform<K, V>           │
//!   └────────────────────────────┘   │    transform(key) → Result<V, E>  │
//!                                    └───────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait               | Required operation                        | Purpose                      |
//! |---------------------|-------------------------------------------|------------------------------|
//! | `Transform`         | `transform(&K) → Result<V, E>`            | One pure, fallible function  |
//! | `TransformProvider` | `transform(&str, &K) → Result<V, …>`      | Named family of transforms   |
//! | `ConcurrentCache`   | -                                         | Marker for thread-safe caches |
//!
//! Both transform traits assume determinism: the same input always yields
//! the same output. Memoization is only an optimization under that
//! assumption.

use crate::error::TransformError;

/// A single pure, fallible computation from `K` to `V`.
///
/// Implemented for every `Fn(&K) -> Result<V, E>`.
///
/// # Example
///
/// ```
/// use memokit::traits::Transform;
///
/// let shout = |s: &String| -> Result<String, std::convert::Infallible> {
///     Ok(s.to_uppercase())
/// };
/// assert_eq!(shout.transform(&"hi".to_string()), Ok("HI".to_string()));
/// ```
pub trait Transform<K, V> {
    /// Error produced when the input is outside the transform's domain.
    type Error;

    /// Computes the value for `key`.
    fn transform(&self, key: &K) -> Result<V, Self::Error>;
}

impl<K, V, E, F> Transform<K, V> for F
where
    F: Fn(&K) -> Result<V, E>,
{
    type Error = E;

    #[inline]
    fn transform(&self, key: &K) -> Result<V, E> {
        self(key)
    }
}

/// A family of transforms addressed by name.
///
/// This is the delegate a [`MemoizingCache`](crate::memo::MemoizingCache)
/// wraps. A provider must answer
/// [`TransformError::UnknownTransform`] for names it does not implement
/// rather than inventing a default value.
///
/// # Example
///
/// ```
/// use memokit::error::TransformError;
/// use memokit::traits::TransformProvider;
///
/// struct Case;
///
/// impl TransformProvider<String, String> for Case {
///     type Error = std::convert::Infallible;
///
///     fn transform(
///         &self,
///         name: &str,
///         key: &String,
///     ) -> Result<String, TransformError<Self::Error>> {
///         match name {
///             "upper" => Ok(key.to_uppercase()),
///             "lower" => Ok(key.to_lowercase()),
///             other => Err(TransformError::UnknownTransform(other.to_string())),
///         }
///     }
/// }
///
/// assert_eq!(Case.transform("upper", &"ab".to_string()), Ok("AB".to_string()));
/// assert!(Case.transform("title", &"ab".to_string()).is_err());
/// ```
pub trait TransformProvider<K, V> {
    /// Error produced by the underlying transforms.
    type Error;

    /// Computes the value for `key` using the transform called `name`.
    fn transform(&self, name: &str, key: &K) -> Result<V, TransformError<Self::Error>>;
}

/// Marker trait for caches that are safe to share across threads.
///
/// # Example
///
/// ```
/// use memokit::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache>(_cache: &C) {}
/// ```
pub trait ConcurrentCache: Send + Sync {}
