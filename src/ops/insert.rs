//! Insertion operation: path-copy insert with node promotion.

use std::sync::Arc;

use crate::hash::KeyEq;
use crate::node::{self, Entry, TreePart};

use super::{cloned_inserting, cloned_replacing};

/// Outcome of a recursive insert.
pub struct InsertOutcome<K, V> {
    /// New root of the modified subtree.
    pub node: TreePart<K, V>,
    /// `true` if a new key was inserted, `false` if an existing value was replaced.
    pub inserted: bool,
}

/// Inserts `entry` into the subtree rooted at `part` via path copying.
///
/// `part` is `None` for an empty trie or an empty array slot.
pub fn insert_recursive<K, V, Q>(
    part: Option<&TreePart<K, V>>,
    entry: Arc<Entry<K, V>>,
    shift: u32,
) -> InsertOutcome<K, V>
where
    Q: KeyEq<K>,
{
    let Some(part) = part else {
        return InsertOutcome {
            node: TreePart::Entry(entry),
            inserted: true,
        };
    };

    match part {
        TreePart::Entry(existing) => {
            if existing.hash() != entry.hash() {
                let hash = entry.hash();
                let node = pair_nodes(
                    part.clone(),
                    existing.hash(),
                    TreePart::Entry(entry),
                    hash,
                    shift,
                );
                return InsertOutcome {
                    node,
                    inserted: true,
                };
            }
            if Q::key_eq(existing.key(), entry.key()) {
                // Same key → the new entry replaces the leaf.
                InsertOutcome {
                    node: TreePart::Entry(entry),
                    inserted: false,
                }
            } else {
                log::trace!("hash {:#010x} collides, creating collision node", entry.hash());
                InsertOutcome {
                    node: TreePart::collision(entry.hash(), vec![Arc::clone(existing), entry]),
                    inserted: true,
                }
            }
        }
        TreePart::Collision(coll) => {
            if coll.hash != entry.hash() {
                let hash = entry.hash();
                let node = pair_nodes(part.clone(), coll.hash, TreePart::Entry(entry), hash, shift);
                return InsertOutcome {
                    node,
                    inserted: true,
                };
            }
            let found = coll
                .entries
                .iter()
                .position(|e| Q::key_eq(e.key(), entry.key()));
            match found {
                Some(pos) => InsertOutcome {
                    node: TreePart::collision(coll.hash, cloned_replacing(&coll.entries, pos, entry)),
                    inserted: false,
                },
                None => {
                    let len = coll.entries.len();
                    InsertOutcome {
                        node: TreePart::collision(
                            coll.hash,
                            cloned_inserting(&coll.entries, len, entry),
                        ),
                        inserted: true,
                    }
                }
            }
        }
        TreePart::Bitmap(bm) => {
            debug_assert!(shift <= node::MAX_SHIFT, "bitmap node below max depth");
            let frag = node::fragment(entry.hash(), shift);
            let bit = node::mask(frag);
            let pos = node::index(bm.bitmap, bit);

            if bm.bitmap & bit != 0 {
                // Position has a child → recurse.
                let outcome =
                    insert_recursive::<K, V, Q>(Some(&bm.children[pos]), entry, shift + node::BITS_PER_LEVEL);
                return InsertOutcome {
                    node: TreePart::bitmap(bm.bitmap, cloned_replacing(&bm.children, pos, outcome.node)),
                    inserted: outcome.inserted,
                };
            }

            if bm.children.len() < node::BITMAP_MAX_CHILDREN {
                // Position empty → add the entry in sorted position.
                return InsertOutcome {
                    node: TreePart::bitmap(
                        bm.bitmap | bit,
                        cloned_inserting(&bm.children, pos, TreePart::Entry(entry)),
                    ),
                    inserted: true,
                };
            }

            // Would exceed the sparse limit → spread children over 32 slots.
            log::trace!("promoting bitmap node to array node at shift {shift}");
            let mut slots: [Option<TreePart<K, V>>; node::ARRAY_WIDTH] = std::array::from_fn(|_| None);
            let mut children = bm.children.iter();
            for (i, slot) in slots.iter_mut().enumerate() {
                if bm.bitmap & (1 << i) != 0 {
                    *slot = children.next().cloned();
                }
            }
            slots[frag as usize] = Some(TreePart::Entry(entry));
            InsertOutcome {
                node: TreePart::array(slots),
                inserted: true,
            }
        }
        TreePart::Array(arr) => {
            debug_assert!(shift <= node::MAX_SHIFT, "array node below max depth");
            let frag = node::fragment(entry.hash(), shift) as usize;
            let outcome = insert_recursive::<K, V, Q>(
                arr.children[frag].as_ref(),
                entry,
                shift + node::BITS_PER_LEVEL,
            );
            let mut slots = arr.children.clone();
            slots[frag] = Some(outcome.node);
            InsertOutcome {
                node: TreePart::array(slots),
                inserted: outcome.inserted,
            }
        }
    }
}

/// Builds the smallest bitmap chain that separates two leaves with
/// different hashes.
///
/// Descends one level per shared fragment, wrapping each level in a
/// singleton bitmap node, until the fragments differ.
fn pair_nodes<K, V>(
    one: TreePart<K, V>,
    one_hash: u32,
    two: TreePart<K, V>,
    two_hash: u32,
    shift: u32,
) -> TreePart<K, V> {
    debug_assert_ne!(one_hash, two_hash, "cannot pair colliding leaves");
    debug_assert!(shift <= node::MAX_SHIFT, "distinct 30-bit hashes split by depth 6");

    let f1 = node::fragment(one_hash, shift);
    let f2 = node::fragment(two_hash, shift);

    if f1 == f2 {
        let child = pair_nodes(one, one_hash, two, two_hash, shift + node::BITS_PER_LEVEL);
        TreePart::bitmap(node::mask(f1), vec![child])
    } else {
        let children = if f1 < f2 { vec![one, two] } else { vec![two, one] };
        TreePart::bitmap(node::mask(f1) | node::mask(f2), children)
    }
}
