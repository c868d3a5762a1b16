//! Key hashing and equality strategies.
//!
//! The trie never hashes keys on its own: every operation takes a
//! caller-computed hash, of which only the low 30 bits are used. Key
//! equality is injected through the [`KeyEq`] strategy parameter of
//! [`Hamt`](crate::Hamt).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::node::HASH_MASK;

/// Equality predicate used to match keys that share a hash.
///
/// Implementations must be consistent with the hashes callers pass in:
/// keys that compare equal must be given equal hashes.
pub trait KeyEq<K: ?Sized> {
    /// Returns `true` if `a` and `b` denote the same key.
    fn key_eq(a: &K, b: &K) -> bool;
}

/// Default strategy: the key type's own [`PartialEq`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEq;

impl<K: PartialEq + ?Sized> KeyEq<K> for DefaultEq {
    #[inline]
    fn key_eq(a: &K, b: &K) -> bool {
        a == b
    }
}

/// Computes a 30-bit hash of a value using the standard hasher.
///
/// Convenience for callers without their own hash; the standard hasher is
/// deterministic, so equal keys always map to the same hash.
#[must_use]
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u32 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    fold(hasher.finish())
}

/// Folds a 64-bit hash into the 30 bits the trie consumes.
///
/// Both halves contribute, so hashers that leave the low word weak still
/// spread across the trie.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn fold(hash: u64) -> u32 {
    ((hash ^ (hash >> 32)) as u32) & HASH_MASK
}
