//! Persistent hash map based on a HAMT.
//!
//! A Hash Array Mapped Trie indexes entries by successive 5-bit slices of a
//! 30-bit key hash. Every write copies only the path from the root to the
//! modified leaf and shares everything else, so each version of the map is
//! an independent, immutable snapshot that costs O(1) to copy.
//!
//! The intended consumer keeps one [`Hamt`] as the "current bindings" of a
//! logical task, derives a new handle on every set or delete, and switches
//! handles when entering or leaving a task scope.
//!
//! # Key properties
//!
//! - **Persistence**: [`Hamt::with_entry`] and [`Hamt::without`] return new
//!   handles; the receiver is never modified
//! - **Structural sharing**: handles share subtrees through `Arc`; dropping
//!   one never affects another
//! - **Injected hashing**: callers supply hashes, equality is a strategy
//!   type parameter ([`KeyEq`])
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Node shapes
//!
//! | Variant | Role |
//! |---|---|
//! | `Entry` | single key/value leaf |
//! | `CollisionNode` | leaf bucket of keys sharing one full hash |
//! | `BitmapNode` | sparse internal node, at most 15 children |
//! | `ArrayNode` | dense internal node, 32 slots, at least 16 live |
//!
//! # Example
//!
//! ```
//! use hamt_snapshot::{Hamt, hash::hash_one};
//!
//! let empty: Hamt<&str, i32> = Hamt::new();
//! let one = empty.with_entry("a", hash_one("a"), 1);
//! let two = one.with_entry("b", hash_one("b"), 2);
//!
//! assert_eq!(one.lookup(&"b", hash_one("b")), None);
//! assert_eq!(two.lookup(&"b", hash_one("b")), Some(&2));
//! assert_eq!(two.without(&"a", hash_one("a")).len(), 1);
//! ```
//!
//! # References
//!
//! - Bagwell, 2001, "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod hash;
pub mod iter;
pub mod node;
pub mod validate;

mod map;
mod ops;

#[cfg(test)]
mod tests;

pub use hash::{DefaultEq, KeyEq};
pub use iter::Iter;
pub use map::Hamt;
pub use validate::StructureError;
