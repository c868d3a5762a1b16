//! HAMT node variants and bitmap helpers.

use std::fmt;
use std::sync::Arc;

/// Bits per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Number of significant hash bits. Six levels of five bits each.
pub const HASH_BITS: u32 = 30;

/// Mask applied to every caller-supplied hash.
pub const HASH_MASK: u32 = (1 << HASH_BITS) - 1;

/// Largest shift at which an internal node can sit (depth 6).
pub const MAX_SHIFT: u32 = HASH_BITS - BITS_PER_LEVEL;

/// Longest root-to-leaf chain of internal nodes, counting a terminal
/// collision node.
pub const MAX_DEPTH: usize = (HASH_BITS / BITS_PER_LEVEL) as usize + 1;

/// Slot count of an [`ArrayNode`].
pub const ARRAY_WIDTH: usize = 32;

/// A [`BitmapNode`] that would grow past this many children is promoted to
/// an [`ArrayNode`].
pub const BITMAP_MAX_CHILDREN: usize = 15;

/// An [`ArrayNode`] whose live slot count would drop below this is demoted
/// to a [`BitmapNode`].
pub const ARRAY_MIN_CHILDREN: usize = 16;

/// Leaf storing a key-value pair with its 30-bit hash.
pub struct Entry<K, V> {
    hash: u32,
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry, keeping only the low [`HASH_BITS`] of `hash`.
    pub const fn new(key: K, hash: u32, value: V) -> Self {
        Self {
            hash: hash & HASH_MASK,
            key,
            value,
        }
    }

    /// The masked hash.
    #[must_use]
    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// The key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The value.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }
}

/// Bucket of entries that share one full hash.
///
/// Invariant: `entries.len() >= 2`, every entry carries `hash`.
pub struct CollisionNode<K, V> {
    pub(crate) hash: u32,
    pub(crate) entries: Vec<Arc<Entry<K, V>>>,
}

impl<K, V> CollisionNode<K, V> {
    pub(crate) fn new(hash: u32, entries: Vec<Arc<Entry<K, V>>>) -> Self {
        debug_assert!(entries.len() >= 2, "collision node needs two entries");
        debug_assert!(
            entries.iter().all(|e| e.hash == hash),
            "collision entry with foreign hash"
        );
        Self { hash, entries }
    }

    /// The hash shared by every entry.
    #[must_use]
    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// The colliding entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Arc<Entry<K, V>>] {
        &self.entries
    }
}

/// Sparse internal node.
///
/// Invariant: `bitmap.count_ones() == children.len()`, children ordered by
/// ascending bit position, `1 <= children.len() <= BITMAP_MAX_CHILDREN`.
pub struct BitmapNode<K, V> {
    pub(crate) bitmap: u32,
    pub(crate) children: Vec<TreePart<K, V>>,
}

impl<K, V> BitmapNode<K, V> {
    pub(crate) fn new(bitmap: u32, children: Vec<TreePart<K, V>>) -> Self {
        debug_assert_eq!(
            bitmap.count_ones() as usize,
            children.len(),
            "bitmap population differs from child count"
        );
        debug_assert!(
            (1..=BITMAP_MAX_CHILDREN).contains(&children.len()),
            "bitmap node with {} children",
            children.len()
        );
        Self { bitmap, children }
    }

    /// Bitmap of occupied positions.
    #[must_use]
    pub const fn bitmap(&self) -> u32 {
        self.bitmap
    }

    /// Children, ordered by ascending bit position.
    #[must_use]
    pub fn children(&self) -> &[TreePart<K, V>] {
        &self.children
    }
}

/// Dense internal node with all 32 slots materialised.
///
/// Invariant: `live >= ARRAY_MIN_CHILDREN`.
pub struct ArrayNode<K, V> {
    pub(crate) live: usize,
    pub(crate) children: [Option<TreePart<K, V>>; ARRAY_WIDTH],
}

impl<K, V> ArrayNode<K, V> {
    pub(crate) fn new(children: [Option<TreePart<K, V>>; ARRAY_WIDTH]) -> Self {
        let live = children.iter().filter(|c| c.is_some()).count();
        debug_assert!(
            live >= ARRAY_MIN_CHILDREN,
            "array node with only {live} live slots"
        );
        Self { live, children }
    }

    /// Number of occupied slots.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// All 32 slots.
    #[must_use]
    pub const fn children(&self) -> &[Option<TreePart<K, V>>; ARRAY_WIDTH] {
        &self.children
    }
}

/// Any node of the trie.
///
/// Children are shared by `Arc`; cloning a `TreePart` never copies a subtree.
pub enum TreePart<K, V> {
    /// Single key-value leaf.
    Entry(Arc<Entry<K, V>>),
    /// Leaf bucket of same-hash entries.
    Collision(Arc<CollisionNode<K, V>>),
    /// Sparse internal node.
    Bitmap(Arc<BitmapNode<K, V>>),
    /// Dense internal node.
    Array(Arc<ArrayNode<K, V>>),
}

impl<K, V> TreePart<K, V> {
    pub(crate) fn bitmap(bitmap: u32, children: Vec<Self>) -> Self {
        Self::Bitmap(Arc::new(BitmapNode::new(bitmap, children)))
    }

    pub(crate) fn array(children: [Option<Self>; ARRAY_WIDTH]) -> Self {
        Self::Array(Arc::new(ArrayNode::new(children)))
    }

    pub(crate) fn collision(hash: u32, entries: Vec<Arc<Entry<K, V>>>) -> Self {
        Self::Collision(Arc::new(CollisionNode::new(hash, entries)))
    }

    /// Returns `true` for entries and collision nodes.
    ///
    /// Leaves do not depend on their depth, so they may be hoisted toward
    /// the root when their parent collapses.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Entry(_) | Self::Collision(_))
    }

    /// Returns `true` if both parts are the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Entry(a), Self::Entry(b)) => Arc::ptr_eq(a, b),
            (Self::Collision(a), Self::Collision(b)) => Arc::ptr_eq(a, b),
            (Self::Bitmap(a), Self::Bitmap(b)) => Arc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
#[must_use]
pub const fn fragment(hash: u32, shift: u32) -> u32 {
    (hash >> shift) & 0x1F
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// ---------------------------------------------------------------------------
// Manual trait impls: avoid false `K: Trait, V: Trait` bounds.
// ---------------------------------------------------------------------------

impl<K, V> Clone for TreePart<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Entry(e) => Self::Entry(Arc::clone(e)),
            Self::Collision(c) => Self::Collision(Arc::clone(c)),
            Self::Bitmap(b) => Self::Bitmap(Arc::clone(b)),
            Self::Array(a) => Self::Array(Arc::clone(a)),
        }
    }
}

impl<K, V> fmt::Debug for TreePart<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(e) => f.debug_struct("Entry").field("hash", &e.hash).finish_non_exhaustive(),
            Self::Collision(c) => f
                .debug_struct("Collision")
                .field("hash", &c.hash)
                .field("entries", &c.entries.len())
                .finish(),
            Self::Bitmap(b) => f
                .debug_struct("Bitmap")
                .field("bitmap", &format_args!("{:#034b}", b.bitmap))
                .field("children", &b.children.len())
                .finish(),
            Self::Array(a) => f.debug_struct("Array").field("live", &a.live).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree dump
// ---------------------------------------------------------------------------

/// Indented rendering of a subtree, one node per line.
///
/// Returned by [`Hamt::dump`](crate::Hamt::dump).
pub struct TreeDump<'a, K, V> {
    pub(crate) root: Option<&'a TreePart<K, V>>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for TreeDump<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_part(f, self.root, 0)
    }
}

fn write_part<K: fmt::Debug, V: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    part: Option<&TreePart<K, V>>,
    indent: usize,
) -> fmt::Result {
    let pad = "";
    match part {
        None => writeln!(f, "{pad:indent$}null"),
        Some(TreePart::Entry(e)) => write_entry(f, e, indent),
        Some(TreePart::Collision(c)) => {
            writeln!(f, "{pad:indent$}Collision {}", c.hash)?;
            c.entries
                .iter()
                .try_for_each(|e| write_entry(f, e, indent + 2))
        }
        Some(TreePart::Bitmap(b)) => {
            writeln!(f, "{pad:indent$}Bitmap ({:b})", b.bitmap)?;
            b.children
                .iter()
                .try_for_each(|c| write_part(f, Some(c), indent + 2))
        }
        Some(TreePart::Array(a)) => {
            writeln!(f, "{pad:indent$}Array")?;
            a.children
                .iter()
                .try_for_each(|c| write_part(f, c.as_ref(), indent + 2))
        }
    }
}

fn write_entry<K: fmt::Debug, V: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    e: &Entry<K, V>,
    indent: usize,
) -> fmt::Result {
    let pad = "";
    writeln!(f, "{pad:indent$}{:?} : {:?} ({})", e.key, e.value, e.hash)
}
