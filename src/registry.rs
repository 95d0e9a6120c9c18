//! Keyed-factory registry with lazy instantiation.
//!
//! A `Registry<T>` maps names to either a ready instance or a factory that
//! builds the instance on first lookup. It is an ordinary value: callers
//! construct one and pass it where it is needed, so tests never share hidden
//! process-wide state.
//!
//! ```text
//!   register_factory("url", ...)        get("url")            get("url")
//!   ┌──────────┬───────────────┐      ┌──────────────┐      ┌──────────────┐
//!   │ "url"    │ factory, ∅    │ ───▶ │ factory()    │ ───▶ │ same Arc<T>  │
//!   └──────────┴───────────────┘      │ cache Arc<T> │      └──────────────┘
//!                                     └──────────────┘
//!   register("url", instance)  replaces the factory outright.
//! ```
//!
//! A registry of [`Transform`]s is itself a [`TransformProvider`], so it can
//! sit directly behind a [`MemoizingCache`](crate::memo::MemoizingCache).

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use crate::error::TransformError;
use crate::traits::{Transform, TransformProvider};

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

struct Slot<T: ?Sized> {
    instance: OnceLock<Arc<T>>,
    factory: Option<Factory<T>>,
}

impl<T: ?Sized> Slot<T> {
    fn resolve(&self) -> Option<Arc<T>> {
        if let Some(instance) = self.instance.get() {
            return Some(Arc::clone(instance));
        }
        let factory = self.factory.as_ref()?;
        Some(Arc::clone(self.instance.get_or_init(|| factory())))
    }
}

/// Named, lazily instantiated shared objects.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use memokit::registry::Registry;
///
/// let mut registry: Registry<String> = Registry::new();
/// registry.register_factory("greeting", || Arc::new("hello".to_string()));
///
/// assert!(!registry.is_instantiated("greeting"));
/// assert_eq!(registry.get("greeting").as_deref(), Some(&"hello".to_string()));
/// assert!(registry.is_instantiated("greeting"));
/// assert!(registry.get("missing").is_none());
/// ```
pub struct Registry<T: ?Sized> {
    slots: FxHashMap<String, Slot<T>>,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            slots: FxHashMap::default(),
        }
    }
}

impl<T: ?Sized> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready instance under `name`, replacing any factory or
    /// instance already registered there.
    pub fn register(&mut self, name: impl Into<String>, instance: Arc<T>) {
        let slot = Slot {
            instance: OnceLock::from(instance),
            factory: None,
        };
        self.slots.insert(name.into(), slot);
    }

    /// Registers a factory run on the first [`get`](Self::get) of `name`.
    ///
    /// Replaces whatever was registered under `name`, including an instance
    /// that was already created.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let slot = Slot {
            instance: OnceLock::new(),
            factory: Some(Box::new(factory)),
        };
        self.slots.insert(name.into(), slot);
    }

    /// Registers `factory` only when `available` is true.
    ///
    /// Used to select an implementation from runtime capability checks, for
    /// example preferring an accelerated variant when it is present. Returns
    /// whether the factory was registered.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use memokit::registry::Registry;
    ///
    /// let mut registry: Registry<&'static str> = Registry::new();
    /// registry.register_factory("template", || Arc::new("portable"));
    /// registry.register_factory_if("template", false, || Arc::new("accelerated"));
    /// assert_eq!(registry.get("template").as_deref(), Some(&"portable"));
    /// ```
    pub fn register_factory_if<F>(
        &mut self,
        name: impl Into<String>,
        available: bool,
        factory: F,
    ) -> bool
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        if available {
            self.register_factory(name, factory);
        }
        available
    }

    /// Returns the instance registered under `name`, creating it on first use.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.slots.get(name)?.resolve()
    }

    /// Returns `true` if anything is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Returns `true` if `name` has a live instance (not just a factory).
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.instance.get().is_some())
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Removes the registration for `name`. Returns `true` if one existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.slots.remove(name).is_some()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

/// A registry of named transforms sharing one error type.
pub type TransformRegistry<K, V, E> = Registry<dyn Transform<K, V, Error = E> + Send + Sync>;

impl<K, V, E> Registry<dyn Transform<K, V, Error = E> + Send + Sync> {
    /// Registers a transform instance under `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// use memokit::memo::MemoizingCache;
    /// use memokit::registry::TransformRegistry;
    ///
    /// let mut transforms: TransformRegistry<String, usize, Infallible> = TransformRegistry::new();
    /// transforms.register_transform("len", |s: &String| -> Result<usize, Infallible> {
    ///     Ok(s.len())
    /// });
    ///
    /// let mut cache = MemoizingCache::new(Arc::new(transforms), 100);
    /// assert_eq!(cache.get("len", "four").unwrap(), 4);
    /// assert!(cache.get("width", "four").unwrap_err().is_unknown());
    /// ```
    pub fn register_transform<T>(&mut self, name: impl Into<String>, transform: T)
    where
        T: Transform<K, V, Error = E> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(transform));
    }
}

impl<K, V, E> TransformProvider<K, V> for Registry<dyn Transform<K, V, Error = E> + Send + Sync> {
    type Error = E;

    fn transform(&self, name: &str, key: &K) -> Result<V, TransformError<E>> {
        let transform = self
            .get(name)
            .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;
        transform.transform(key).map_err(TransformError::Failed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    mod lazy_instantiation {
        use super::*;

        #[test]
        fn test_factory_runs_once() {
            let built = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&built);
            let mut registry: Registry<Vec<u8>> = Registry::new();
            registry.register_factory("buf", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(vec![1, 2, 3])
            });

            assert_eq!(built.load(Ordering::SeqCst), 0);
            let a = registry.get("buf").unwrap();
            let b = registry.get("buf").unwrap();
            assert!(Arc::ptr_eq(&a, &b));
            assert_eq!(built.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn test_unknown_name_is_none() {
            let registry: Registry<u32> = Registry::new();
            assert!(registry.get("nope").is_none());
            assert!(!registry.contains("nope"));
            assert!(!registry.is_instantiated("nope"));
        }
    }

    mod registration {
        use super::*;

        #[test]
        fn test_instance_overrides_factory() {
            let mut registry: Registry<u32> = Registry::new();
            registry.register_factory("n", || Arc::new(1));
            registry.register("n", Arc::new(2));
            assert_eq!(registry.get("n").as_deref(), Some(&2));
            assert!(registry.is_instantiated("n"));
        }

        #[test]
        fn test_factory_replaces_created_instance() {
            let mut registry: Registry<u32> = Registry::new();
            registry.register("n", Arc::new(2));
            registry.register_factory("n", || Arc::new(3));
            assert!(!registry.is_instantiated("n"));
            assert_eq!(registry.get("n").as_deref(), Some(&3));
        }

        #[test]
        fn test_conditional_factory() {
            let mut registry: Registry<&'static str> = Registry::new();
            registry.register_factory("uri_template", || Arc::new("portable"));
            assert!(registry.register_factory_if("uri_template", true, || Arc::new("native")));
            assert_eq!(registry.get("uri_template").as_deref(), Some(&"native"));
        }

        #[test]
        fn test_names_and_unregister() {
            let mut registry: Registry<u32> = Registry::new();
            registry.register("a", Arc::new(1));
            registry.register_factory("b", || Arc::new(2));
            let mut names: Vec<&str> = registry.names().collect();
            names.sort_unstable();
            assert_eq!(names, ["a", "b"]);
            assert_eq!(registry.len(), 2);

            assert!(registry.unregister("a"));
            assert!(!registry.unregister("a"));
            assert_eq!(registry.len(), 1);
            assert_eq!(format!("{:?}", registry), r#"Registry { names: ["b"] }"#);
        }

        #[test]
        fn test_unsized_values() {
            let mut registry: Registry<str> = Registry::new();
            registry.register("s", Arc::from("text"));
            assert_eq!(registry.get("s").as_deref(), Some("text"));
        }
    }

    mod transform_provider {
        use super::*;

        #[derive(Debug, PartialEq)]
        struct Empty;

        fn registry() -> TransformRegistry<String, String, Empty> {
            let mut transforms = TransformRegistry::new();
            transforms.register_transform("first", |s: &String| -> Result<String, Empty> {
                s.chars().next().map(String::from).ok_or(Empty)
            });
            transforms
        }

        #[test]
        fn test_dispatches_by_name() {
            let transforms = registry();
            assert_eq!(
                transforms.transform("first", &"abc".to_string()),
                Ok("a".to_string())
            );
        }

        #[test]
        fn test_maps_errors() {
            let transforms = registry();
            assert_eq!(
                transforms.transform("first", &String::new()),
                Err(TransformError::Failed(Empty))
            );
            assert_eq!(
                transforms.transform("last", &"abc".to_string()),
                Err(TransformError::UnknownTransform("last".to_string()))
            );
        }
    }
}
