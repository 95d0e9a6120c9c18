//! Word inflection: `snake_case` and `CamelCase` conversion.
//!
//! Inflection is the canonical memoization target. Identifiers are converted
//! over and over while mapping wire names to model names, the conversion is
//! pure, and the working set of distinct words is small.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │ MemoizingInflector<P>        │  Mutex<MemoizingCache>, caches "snake"/"camel"
//!   └──────────────┬───────────────┘
//!                  │ miss
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │ PreComputedInflector<I>      │  fixed lookup tables, optional mirroring
//!   └──────────────┬───────────────┘
//!                  │ not in table
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │ Inflector                    │  the actual algorithms
//!   └──────────────────────────────┘
//! ```
//!
//! Every layer implements [`Inflect`]. The two lower layers also implement
//! [`TransformProvider`] under the names [`SNAKE`] and [`CAMEL`], so either
//! can sit behind any memoizing cache.
//!
//! ## Conversion rules
//!
//! | Input          | `snake`         | `camel`        |
//! |----------------|-----------------|----------------|
//! | `FooBar`       | `foo_bar`       | `FooBar`       |
//! | `foo_bar`      | `foo_bar`       | `FooBar`       |
//! | `foo-bar`      | `foo-bar`       | `FooBar`       |
//! | `ABC`          | `a_bc`          | `ABC`          |
//! | `userAgent`    | `user_agent`    | `UserAgent`    |
//!
//! `snake` inserts `_` before an uppercase letter that follows any other
//! character, pairing characters left to right, then lowercases ASCII.
//! `camel` treats `_` and `-` as word separators, uppercases the first letter
//! of each word and removes the spaces.

use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::builder::DEFAULT_CAPACITY;
use crate::error::{ConfigError, TransformError};
use crate::memo::MemoizingCache;
use crate::traits::TransformProvider;

/// Cache and transform name for `snake_case` conversion.
pub const SNAKE: &str = "snake";
/// Cache and transform name for `CamelCase` conversion.
pub const CAMEL: &str = "camel";

/// Converts words between `snake_case` and upper `CamelCase`.
pub trait Inflect {
    /// Converts `word` to `snake_case`.
    fn snake(&self, word: &str) -> String;

    /// Converts `word` to upper `CamelCase`.
    fn camel(&self, word: &str) -> String;
}

fn dispatch<I: Inflect + ?Sized>(
    inflector: &I,
    name: &str,
    word: &str,
) -> Result<String, TransformError<Infallible>> {
    match name {
        SNAKE => Ok(inflector.snake(word)),
        CAMEL => Ok(inflector.camel(word)),
        other => Err(TransformError::UnknownTransform(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Inflector
// ---------------------------------------------------------------------------

/// The base inflection algorithms.
///
/// # Example
///
/// ```
/// use memokit::inflector::{Inflect, Inflector};
///
/// assert_eq!(Inflector.snake("ContentType"), "content_type");
/// assert_eq!(Inflector.camel("user_agent"), "UserAgent");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inflector;

impl Inflect for Inflector {
    fn snake(&self, word: &str) -> String {
        if !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }

        let chars: Vec<char> = word.chars().collect();
        let mut out = String::with_capacity(word.len() + word.len() / 2);
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match chars.get(i + 1) {
                Some(&next) if c != '\n' && next.is_ascii_uppercase() => {
                    out.push(c);
                    out.push('_');
                    out.push(next);
                    i += 2;
                },
                _ => {
                    out.push(c);
                    i += 1;
                },
            }
        }
        out.make_ascii_lowercase();
        out
    }

    fn camel(&self, word: &str) -> String {
        let mut out = String::with_capacity(word.len());
        let mut word_start = true;
        for c in word.chars() {
            let c = if c == '_' || c == '-' { ' ' } else { c };
            if matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c') {
                word_start = true;
                if c != ' ' {
                    out.push(c);
                }
                continue;
            }
            out.push(if word_start { c.to_ascii_uppercase() } else { c });
            word_start = false;
        }
        out
    }
}

impl TransformProvider<String, String> for Inflector {
    type Error = Infallible;

    fn transform(&self, name: &str, key: &String) -> Result<String, TransformError<Infallible>> {
        dispatch(self, name, key)
    }
}

// ---------------------------------------------------------------------------
// PreComputedInflector
// ---------------------------------------------------------------------------

/// Answers from fixed lookup tables, falling back to another inflector.
///
/// The `snake` table maps a word to its `snake_case` form; the `camel` table
/// maps a word to its `CamelCase` form. [`mirrored`](Self::mirrored) seeds
/// each table with the reverse of the other, so one list of pairs serves
/// both directions. Explicit entries always win over mirrored ones.
///
/// # Example
///
/// ```
/// use memokit::inflector::{Inflect, Inflector, PreComputedInflector};
///
/// let inflector = PreComputedInflector::new(Inflector)
///     .with_snake([("ETag", "etag")])
///     .mirrored();
///
/// assert_eq!(inflector.snake("ETag"), "etag");
/// assert_eq!(inflector.camel("etag"), "ETag");
/// assert_eq!(inflector.snake("ContentMd5"), "content_md5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PreComputedInflector<I = Inflector> {
    snake: FxHashMap<String, String>,
    camel: FxHashMap<String, String>,
    fallback: I,
}

impl<I: Inflect> PreComputedInflector<I> {
    /// Creates an inflector with empty tables.
    pub fn new(fallback: I) -> Self {
        Self {
            snake: FxHashMap::default(),
            camel: FxHashMap::default(),
            fallback,
        }
    }

    /// Adds `word -> snake_form` entries.
    pub fn with_snake<T, A, B>(mut self, entries: T) -> Self
    where
        T: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.snake
            .extend(entries.into_iter().map(|(a, b)| (a.into(), b.into())));
        self
    }

    /// Adds `word -> CamelForm` entries.
    pub fn with_camel<T, A, B>(mut self, entries: T) -> Self
    where
        T: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.camel
            .extend(entries.into_iter().map(|(a, b)| (a.into(), b.into())));
        self
    }

    /// Seeds each table with the reverse of the other.
    ///
    /// The camel table is completed first from the reversed snake table; the
    /// snake table is then completed from the reversed result.
    pub fn mirrored(mut self) -> Self {
        for (word, snake) in &self.snake {
            self.camel
                .entry(snake.clone())
                .or_insert_with(|| word.clone());
        }
        for (word, camel) in &self.camel {
            self.snake
                .entry(camel.clone())
                .or_insert_with(|| word.clone());
        }
        self
    }

    /// Number of `(snake, camel)` table entries.
    pub fn table_sizes(&self) -> (usize, usize) {
        (self.snake.len(), self.camel.len())
    }

    /// The inflector consulted for words missing from the tables.
    pub fn fallback(&self) -> &I {
        &self.fallback
    }
}

impl<I: Inflect> Inflect for PreComputedInflector<I> {
    fn snake(&self, word: &str) -> String {
        match self.snake.get(word) {
            Some(hit) => hit.clone(),
            None => self.fallback.snake(word),
        }
    }

    fn camel(&self, word: &str) -> String {
        match self.camel.get(word) {
            Some(hit) => hit.clone(),
            None => self.fallback.camel(word),
        }
    }
}

impl<I: Inflect> TransformProvider<String, String> for PreComputedInflector<I> {
    type Error = Infallible;

    fn transform(&self, name: &str, key: &String) -> Result<String, TransformError<Infallible>> {
        dispatch(self, name, key)
    }
}

// ---------------------------------------------------------------------------
// MemoizingInflector
// ---------------------------------------------------------------------------

/// An [`Inflect`] decorator that memoizes results per conversion.
///
/// Holds a [`MemoizingCache`] with the sub-caches [`SNAKE`] and [`CAMEL`],
/// each bounded by the configured capacity (500 by default). The cache sits
/// behind a mutex so the inflector can be shared by reference.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use memokit::inflector::{Inflect, Inflector, MemoizingInflector};
///
/// let inflector = MemoizingInflector::new(Arc::new(Inflector));
/// assert_eq!(inflector.snake("UserAgent"), "user_agent");
/// assert_eq!(inflector.snake("UserAgent"), "user_agent");
/// assert_eq!(inflector.len("snake"), 1);
/// ```
pub struct MemoizingInflector<P = Inflector> {
    cache: Mutex<MemoizingCache<String, String, P>>,
    inner: Arc<P>,
}

impl<P> MemoizingInflector<P>
where
    P: Inflect + TransformProvider<String, String, Error = Infallible>,
{
    /// Decorates `inner` with the default capacity per conversion.
    pub fn new(inner: Arc<P>) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// Decorates `inner`, holding at most `capacity` words per conversion.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See
    /// [`try_with_capacity`](Self::try_with_capacity).
    pub fn with_capacity(inner: Arc<P>, capacity: usize) -> Self {
        match Self::try_with_capacity(inner, capacity) {
            Ok(inflector) => inflector,
            Err(e) => panic!("{}", e),
        }
    }

    /// Decorates `inner`, returning an error if `capacity` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero capacity.
    pub fn try_with_capacity(inner: Arc<P>, capacity: usize) -> Result<Self, ConfigError> {
        let cache = MemoizingCache::try_new(Arc::clone(&inner), capacity)?;
        Ok(Self::from_cache(cache))
    }

    /// Wraps a preconfigured cache, for example one built with a custom
    /// prune policy.
    pub fn from_cache(cache: MemoizingCache<String, String, P>) -> Self {
        let inner = Arc::clone(cache.delegate());
        Self {
            cache: Mutex::new(cache.with_caches([SNAKE, CAMEL])),
            inner,
        }
    }

    /// The decorated inflector.
    pub fn inner(&self) -> &Arc<P> {
        &self.inner
    }

    /// Number of words memoized for `conversion` ([`SNAKE`] or [`CAMEL`]).
    pub fn len(&self, conversion: &str) -> usize {
        self.cache.lock().len(conversion)
    }

    /// Returns `true` if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Per-conversion capacity.
    pub fn capacity(&self) -> usize {
        self.cache.lock().capacity()
    }

    /// Drops every memoized word.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut MemoizingCache<String, String, P>) -> R) -> R {
        f(&mut self.cache.lock())
    }

    fn inflect(&self, conversion: &str, word: &str, direct: impl FnOnce(&P) -> String) -> String {
        let memoized = self.cache.lock().get(conversion, word);
        match memoized {
            Ok(value) => value,
            // Only reachable when `P` routes a built-in name elsewhere.
            Err(_) => direct(&self.inner),
        }
    }
}

impl<P> Inflect for MemoizingInflector<P>
where
    P: Inflect + TransformProvider<String, String, Error = Infallible>,
{
    fn snake(&self, word: &str) -> String {
        self.inflect(SNAKE, word, |inner| inner.snake(word))
    }

    fn camel(&self, word: &str) -> String {
        self.inflect(CAMEL, word, |inner| inner.camel(word))
    }
}

impl<P> std::fmt::Debug for MemoizingInflector<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizingInflector")
            .field("cache", &*self.cache.lock())
            .finish()
    }
}
