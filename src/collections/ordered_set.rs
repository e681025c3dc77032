//! Insertion-ordered membership set.
//!
//! Backs approver sets, approval sets and per-call-type open-proposal sets.
//! Iteration follows insertion order and removal keeps the relative order of
//! the remaining elements, so bulk operations that walk "the first element
//! until empty" are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// Enumerable set with deterministic, insertion-ordered iteration.
///
/// Serialized as a plain sequence; the membership index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    from = "Vec<T>",
    into = "Vec<T>",
    bound(
        serialize = "T: Serialize + Clone",
        deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
    )
)]
pub struct OrderedSet<T: Eq + Hash + Clone> {
    items: Vec<T>,
    index: HashSet<T>,
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Add an element. Returns `true` if it was not already present.
    pub fn add(&mut self, item: T) -> bool {
        if !self.index.insert(item.clone()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an element. Returns `true` if it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        if !self.index.remove(item) {
            return false;
        }
        if let Some(pos) = self.items.iter().position(|x| x == item) {
            self.items.remove(pos);
        }
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index` in iteration order.
    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// First element in iteration order.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Snapshot of all elements in iteration order.
    pub fn elements(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq + Hash + Clone> Eq for OrderedSet<T> {}

impl<T: Eq + Hash + Clone> From<Vec<T>> for OrderedSet<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Eq + Hash + Clone> From<OrderedSet<T>> for Vec<T> {
    fn from(set: OrderedSet<T>) -> Self {
        set.items
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.add(item);
        }
        set
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
