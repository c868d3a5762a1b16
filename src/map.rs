//! Persistent HAMT handle.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::hash::{DefaultEq, KeyEq};
use crate::iter::Iter;
use crate::node::{Entry, TreeDump, TreePart};
use crate::ops::get::get_recursive;
use crate::ops::insert::insert_recursive;
use crate::ops::remove::{RemoveOutcome, remove_recursive};
use crate::validate::{self, StructureError};

/// Immutable, persistent hash map built as a hash array mapped trie.
///
/// Every write returns a new handle and leaves `self` untouched; the two
/// share all subtrees off the modified path. Cloning a handle is O(1).
///
/// Hashes are supplied by the caller and truncated to 30 bits. Keys that
/// share a hash are told apart with the `Q` strategy (by default the key's
/// [`PartialEq`]).
pub struct Hamt<K, V, Q = DefaultEq> {
    root: Option<TreePart<K, V>>,
    len: usize,
    strategy: PhantomData<fn() -> Q>,
}

// ---------------------------------------------------------------------------
// Construction & accessors: no trait bounds
// ---------------------------------------------------------------------------

impl<K, V> Hamt<K, V> {
    /// Creates an empty map that compares keys with [`PartialEq`].
    #[must_use]
    pub const fn new() -> Self {
        Self::empty()
    }
}

impl<K, V, Q> Hamt<K, V, Q> {
    /// Creates an empty map using the equality strategy `Q`.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_root(None, 0)
    }

    const fn from_root(root: Option<TreePart<K, V>>, len: usize) -> Self {
        Self {
            root,
            len,
            strategy: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the root node, if any.
    #[must_use]
    pub const fn root(&self) -> Option<&TreePart<K, V>> {
        self.root.as_ref()
    }

    /// Returns `true` if both handles share the same root.
    ///
    /// Pointer-equal handles are always equal; unequal pointers say nothing.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_ref(), self.len)
    }

    /// Returns an indented rendering of the node structure.
    #[must_use]
    pub fn dump(&self) -> TreeDump<'_, K, V> {
        TreeDump {
            root: self.root.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Read operations: Q: KeyEq<K>
// ---------------------------------------------------------------------------

impl<K, V, Q: KeyEq<K>> Hamt<K, V, Q> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn lookup(&self, key: &K, hash: u32) -> Option<&V> {
        self.get_entry(key, hash).map(Entry::value)
    }

    /// Returns the stored key and value matching `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K, hash: u32) -> Option<(&K, &V)> {
        self.get_entry(key, hash).map(|e| (e.key(), e.value()))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K, hash: u32) -> bool {
        self.get_entry(key, hash).is_some()
    }

    fn get_entry(&self, key: &K, hash: u32) -> Option<&Entry<K, V>> {
        let root = self.root.as_ref()?;
        get_recursive::<K, V, Q>(root, hash & crate::node::HASH_MASK, key, 0)
    }

    /// Returns a new map with `key` bound to `value`.
    ///
    /// Replaces the value if `key` is already present.
    #[must_use]
    pub fn with_entry(&self, key: K, hash: u32, value: V) -> Self {
        let entry = Arc::new(Entry::new(key, hash, value));
        let outcome = insert_recursive::<K, V, Q>(self.root.as_ref(), entry, 0);
        let len = if outcome.inserted { self.len + 1 } else { self.len };
        Self::from_root(Some(outcome.node), len)
    }

    /// Returns a new map without `key`.
    ///
    /// If `key` is absent the result shares `self`'s root.
    #[must_use]
    pub fn without(&self, key: &K, hash: u32) -> Self {
        let Some(root) = self.root.as_ref() else {
            return self.clone();
        };
        match remove_recursive::<K, V, Q>(root, hash & crate::node::HASH_MASK, key, 0) {
            RemoveOutcome::NotFound => self.clone(),
            RemoveOutcome::Removed { node } => Self::from_root(node, self.len - 1),
        }
    }

    /// Verifies every structural invariant of the trie.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), StructureError> {
        validate::check::<K, V, Q>(self.root.as_ref(), self.len)
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, Q> Clone for Hamt<K, V, Q> {
    fn clone(&self) -> Self {
        Self::from_root(self.root.clone(), self.len)
    }
}

impl<K, V, Q> Default for Hamt<K, V, Q> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V, Q> fmt::Debug for Hamt<K, V, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hamt")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

/// Two maps are equal when they hold the same keys with equal values,
/// whatever their shape.
impl<K, V: PartialEq, Q: KeyEq<K>> PartialEq for Hamt<K, V, Q> {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.len != other.len {
            return false;
        }
        let mut cursor = self.iter();
        while let Some(e) = cursor.next_entry() {
            if other.lookup(e.key(), e.hash()) != Some(e.value()) {
                return false;
            }
        }
        true
    }
}

impl<K, V: Eq, Q: KeyEq<K>> Eq for Hamt<K, V, Q> {}

impl<K, V, Q: KeyEq<K>> FromIterator<(K, u32, V)> for Hamt<K, V, Q> {
    fn from_iter<I: IntoIterator<Item = (K, u32, V)>>(iter: I) -> Self {
        let mut map = Self::empty();
        map.extend(iter);
        map
    }
}

impl<K, V, Q: KeyEq<K>> Extend<(K, u32, V)> for Hamt<K, V, Q> {
    fn extend<I: IntoIterator<Item = (K, u32, V)>>(&mut self, iter: I) {
        for (k, hash, v) in iter {
            *self = self.with_entry(k, hash, v);
        }
    }
}

impl<'a, K, V, Q> IntoIterator for &'a Hamt<K, V, Q> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
