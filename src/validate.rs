//! Structural invariant checking.
//!
//! [`Hamt::check_invariants`](crate::Hamt::check_invariants) walks every
//! node of a handle and reports the first broken invariant. The engine never
//! produces a trie that fails these checks; they exist for tests and for
//! consumers that build on top of the node types.

use std::error::Error;
use std::fmt;

use crate::hash::KeyEq;
use crate::node::{self, TreePart};

/// A violated structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A bitmap node's population count differs from its child count.
    BitmapMismatch {
        /// Shift of the offending node.
        shift: u32,
        /// Its bitmap.
        bitmap: u32,
        /// Its child count.
        children: usize,
    },
    /// A bitmap node has no children or more than the sparse limit.
    BitmapSize {
        /// Shift of the offending node.
        shift: u32,
        /// Its child count.
        children: usize,
    },
    /// A bitmap node holds a single leaf that should have been hoisted.
    LoneLeaf {
        /// Shift of the offending node.
        shift: u32,
    },
    /// An array node has fewer live slots than the dense minimum.
    ArrayUnderfull {
        /// Shift of the offending node.
        shift: u32,
        /// Its live slot count.
        live: usize,
    },
    /// An array node's cached live count is wrong.
    ArrayLiveCount {
        /// Shift of the offending node.
        shift: u32,
        /// The cached count.
        recorded: usize,
        /// The actual count.
        counted: usize,
    },
    /// A collision node holds fewer than two entries.
    CollisionSize {
        /// The node's hash.
        hash: u32,
        /// Its entry count.
        entries: usize,
    },
    /// A collision node holds an entry with a different hash.
    CollisionHash {
        /// The node's hash.
        expected: u32,
        /// The entry's hash.
        found: u32,
    },
    /// A collision node holds two equal keys.
    CollisionDuplicate {
        /// The node's hash.
        hash: u32,
    },
    /// A leaf sits at a slot its hash does not select.
    Misplaced {
        /// The leaf's hash.
        hash: u32,
        /// Depth, in bits, of the leaf.
        shift: u32,
    },
    /// An internal node sits deeper than the hash width allows.
    TooDeep {
        /// Shift of the offending node.
        shift: u32,
    },
    /// The handle's recorded length differs from the number of entries.
    Length {
        /// Length stored in the handle.
        recorded: usize,
        /// Entries actually reachable.
        counted: usize,
    },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitmapMismatch {
                shift,
                bitmap,
                children,
            } => write!(
                f,
                "bitmap node at shift {shift}: bitmap {bitmap:#034b} has {} bits but {children} children",
                bitmap.count_ones()
            ),
            Self::BitmapSize { shift, children } => {
                write!(f, "bitmap node at shift {shift} has {children} children")
            }
            Self::LoneLeaf { shift } => {
                write!(f, "bitmap node at shift {shift} wraps a single leaf")
            }
            Self::ArrayUnderfull { shift, live } => {
                write!(f, "array node at shift {shift} has only {live} live slots")
            }
            Self::ArrayLiveCount {
                shift,
                recorded,
                counted,
            } => write!(
                f,
                "array node at shift {shift} records {recorded} live slots but has {counted}"
            ),
            Self::CollisionSize { hash, entries } => {
                write!(f, "collision node {hash:#010x} has {entries} entries")
            }
            Self::CollisionHash { expected, found } => write!(
                f,
                "collision node {expected:#010x} holds an entry hashed {found:#010x}"
            ),
            Self::CollisionDuplicate { hash } => {
                write!(f, "collision node {hash:#010x} holds duplicate keys")
            }
            Self::Misplaced { hash, shift } => {
                write!(f, "leaf {hash:#010x} at shift {shift} is not on its hash path")
            }
            Self::TooDeep { shift } => write!(f, "internal node at shift {shift}"),
            Self::Length { recorded, counted } => {
                write!(f, "handle records {recorded} entries but holds {counted}")
            }
        }
    }
}

impl Error for StructureError {}

/// Checks every invariant of the trie rooted at `root` and that it holds
/// exactly `len` entries.
pub fn check<K, V, Q>(root: Option<&TreePart<K, V>>, len: usize) -> Result<(), StructureError>
where
    Q: KeyEq<K>,
{
    let counted = match root {
        None => 0,
        Some(part) => check_part::<K, V, Q>(part, 0, 0)?,
    };
    if counted == len {
        Ok(())
    } else {
        Err(StructureError::Length {
            recorded: len,
            counted,
        })
    }
}

/// Checks the subtree at `part`, reached by the low `shift` bits `prefix`.
///
/// Returns the number of entries in the subtree.
fn check_part<K, V, Q>(part: &TreePart<K, V>, shift: u32, prefix: u32) -> Result<usize, StructureError>
where
    Q: KeyEq<K>,
{
    let on_path = |hash: u32| hash & ((1 << shift) - 1) == prefix;

    match part {
        TreePart::Entry(e) => {
            if on_path(e.hash()) {
                Ok(1)
            } else {
                Err(StructureError::Misplaced {
                    hash: e.hash(),
                    shift,
                })
            }
        }
        TreePart::Collision(c) => {
            if c.entries.len() < 2 {
                return Err(StructureError::CollisionSize {
                    hash: c.hash,
                    entries: c.entries.len(),
                });
            }
            if let Some(e) = c.entries.iter().find(|e| e.hash() != c.hash) {
                return Err(StructureError::CollisionHash {
                    expected: c.hash,
                    found: e.hash(),
                });
            }
            for (i, a) in c.entries.iter().enumerate() {
                if c.entries[i + 1..].iter().any(|b| Q::key_eq(a.key(), b.key())) {
                    return Err(StructureError::CollisionDuplicate { hash: c.hash });
                }
            }
            if !on_path(c.hash) {
                return Err(StructureError::Misplaced {
                    hash: c.hash,
                    shift,
                });
            }
            Ok(c.entries.len())
        }
        TreePart::Bitmap(b) => {
            if shift > node::MAX_SHIFT {
                return Err(StructureError::TooDeep { shift });
            }
            if b.bitmap.count_ones() as usize != b.children.len() {
                return Err(StructureError::BitmapMismatch {
                    shift,
                    bitmap: b.bitmap,
                    children: b.children.len(),
                });
            }
            if !(1..=node::BITMAP_MAX_CHILDREN).contains(&b.children.len()) {
                return Err(StructureError::BitmapSize {
                    shift,
                    children: b.children.len(),
                });
            }
            if b.children.len() == 1 && b.children[0].is_leaf() {
                return Err(StructureError::LoneLeaf { shift });
            }
            let frags = (0_u32..32).filter(|i| b.bitmap & (1 << i) != 0);
            let mut total = 0;
            for (frag, child) in frags.zip(&b.children) {
                total += check_part::<K, V, Q>(
                    child,
                    shift + node::BITS_PER_LEVEL,
                    prefix | (frag << shift),
                )?;
            }
            Ok(total)
        }
        TreePart::Array(a) => {
            if shift > node::MAX_SHIFT {
                return Err(StructureError::TooDeep { shift });
            }
            let counted = a.children.iter().filter(|c| c.is_some()).count();
            if counted != a.live {
                return Err(StructureError::ArrayLiveCount {
                    shift,
                    recorded: a.live,
                    counted,
                });
            }
            if counted < node::ARRAY_MIN_CHILDREN {
                return Err(StructureError::ArrayUnderfull {
                    shift,
                    live: counted,
                });
            }
            let mut total = 0;
            for (frag, slot) in (0_u32..).zip(a.children.iter()) {
                if let Some(child) = slot {
                    total += check_part::<K, V, Q>(
                        child,
                        shift + node::BITS_PER_LEVEL,
                        prefix | (frag << shift),
                    )?;
                }
            }
            Ok(total)
        }
    }
}
