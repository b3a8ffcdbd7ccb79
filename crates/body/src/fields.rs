//! Multi-valued maps used for form fields and uploaded files.
//!
//! A name seen once maps to a single value. A second value for the same name promotes the
//! entry to a list, and every later value is appended to it:
//!
//! ```
//! use micro_body::fields::{Multi, MultiMap};
//!
//! let mut fields = MultiMap::new();
//! fields.insert("tag", "a".to_string());
//! assert_eq!(fields.get("tag"), Some(&Multi::Single("a".to_string())));
//!
//! fields.insert("tag", "b".to_string());
//! assert_eq!(fields.get("tag"), Some(&Multi::Multiple(vec!["a".to_string(), "b".to_string()])));
//! ```

use serde::Serialize;
use std::collections::hash_map::{self, Entry};
use std::collections::HashMap;

/// One value, or every value in arrival order once a name has been seen twice.
///
/// Serializes untagged: a scalar for `Single`, an array for `Multiple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Multi<T> {
    Single(T),
    Multiple(Vec<T>),
}

impl<T> Multi<T> {
    /// Adds a value, promoting a single value to a two element list.
    pub fn push(&mut self, value: T) {
        match self {
            Multi::Multiple(values) => values.push(value),
            Multi::Single(_) => {
                if let Multi::Single(old) = std::mem::replace(self, Multi::Multiple(Vec::new())) {
                    *self = Multi::Multiple(vec![old, value]);
                }
            }
        }
    }

    #[inline]
    pub fn is_multiple(&self) -> bool {
        matches!(self, Multi::Multiple(_))
    }

    /// Number of values held.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Multi::Single(_) => 1,
            Multi::Multiple(values) => values.len(),
        }
    }

    /// Always false: an entry is created with its first value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first value received for this name.
    pub fn first(&self) -> Option<&T> {
        match self {
            Multi::Single(value) => Some(value),
            Multi::Multiple(values) => values.first(),
        }
    }

    /// The most recent value received for this name.
    pub fn last(&self) -> Option<&T> {
        match self {
            Multi::Single(value) => Some(value),
            Multi::Multiple(values) => values.last(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Multi::Single(value) => std::slice::from_ref(value).iter(),
            Multi::Multiple(values) => values.iter(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Multi::Single(value) => vec![value],
            Multi::Multiple(values) => values,
        }
    }
}

impl<'a, T> IntoIterator for &'a Multi<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A name to [`Multi`] map with single-to-list promotion on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MultiMap<T> {
    inner: HashMap<String, Multi<T>>,
}

impl<T> Default for MultiMap<T> {
    fn default() -> Self {
        Self { inner: HashMap::new() }
    }
}

impl<T> MultiMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `name`.
    ///
    /// Absent names become [`Multi::Single`], a second value turns the entry into
    /// [`Multi::Multiple`], and lists only ever grow.
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        match self.inner.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(Multi::Single(value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Multi<T>> {
        self.inner.get(name)
    }

    /// Shortcut for the first value under `name`.
    pub fn first(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(Multi::first)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Multi<T>> {
        self.inner.remove(name)
    }

    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Multi<T>> {
        self.inner.iter()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for MultiMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = MultiMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<T> IntoIterator for MultiMap<T> {
    type Item = (String, Multi<T>);
    type IntoIter = hash_map::IntoIter<String, Multi<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MultiMap<T> {
    type Item = (&'a String, &'a Multi<T>);
    type IntoIter = hash_map::Iter<'a, String, Multi<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
