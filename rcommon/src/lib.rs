//! Shared primitives for the relay workspace crates.
//!
//! ```rust
//! use rcommon::{Registry, dedupe_preserving_order, truncate};
//!
//! let mut registry = Registry::new();
//! registry.insert("primary", 1_u32);
//!
//! let order = dedupe_preserving_order(vec!["custom", "gemini", "custom"]);
//! assert_eq!(order, vec!["custom", "gemini"]);
//! assert_eq!(truncate("abcdef", 3), "abc...");
//! assert_eq!(registry.get("primary"), Some(&1));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use rcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod text {
    //! Ordering and truncation helpers shared by provider lists and error bodies.
    //!
    //! ```rust
    //! use rcommon::dedupe_preserving_order;
    //!
    //! let ids = dedupe_preserving_order(vec![3, 1, 3, 2, 1]);
    //! assert_eq!(ids, vec![3, 1, 2]);
    //! ```

    use std::collections::HashSet;
    use std::hash::Hash;

    /// Removes repeated items, keeping the first occurrence of each.
    pub fn dedupe_preserving_order<T, I>(items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        T: Eq + Hash + Clone,
    {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect()
    }

    /// Cuts `input` to at most `max` bytes on a char boundary, marking the cut with `...`.
    pub fn truncate(input: &str, max: usize) -> String {
        if input.len() <= max {
            return input.to_string();
        }

        let mut end = max;
        while !input.is_char_boundary(end) {
            end -= 1;
        }

        let mut output = input[..end].to_string();
        output.push_str("...");
        output
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use rcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use future::BoxFuture;
pub use registry::Registry;
pub use text::{dedupe_preserving_order, truncate};

#[cfg(test)]
mod tests {
    use super::{Registry, dedupe_preserving_order, truncate};

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let items = dedupe_preserving_order(vec!["b", "a", "b", "c", "a"]);
        assert_eq!(items, vec!["b", "a", "c"]);

        let empty: Vec<String> = dedupe_preserving_order(Vec::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h...");
        assert_eq!(truncate("abcdef", 4), "abcd...");
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
