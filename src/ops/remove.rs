//! Removal operation: path-copy delete with leaf hoisting and demotion.

use std::sync::Arc;

use crate::hash::KeyEq;
use crate::node::{self, TreePart};

use super::{cloned_removing, cloned_replacing};

/// Outcome of a recursive remove.
pub enum RemoveOutcome<K, V> {
    /// Key was not found; the tree is unchanged.
    NotFound,
    /// Key was removed.
    Removed {
        /// New root of the modified subtree, or `None` if the subtree is now empty.
        node: Option<TreePart<K, V>>,
    },
}

/// Removes `key` from the subtree rooted at `part` via path copying.
pub fn remove_recursive<K, V, Q>(
    part: &TreePart<K, V>,
    hash: u32,
    key: &K,
    shift: u32,
) -> RemoveOutcome<K, V>
where
    Q: KeyEq<K>,
{
    match part {
        TreePart::Entry(entry) => {
            if entry.hash() == hash && Q::key_eq(entry.key(), key) {
                RemoveOutcome::Removed { node: None }
            } else {
                RemoveOutcome::NotFound
            }
        }
        TreePart::Collision(coll) => {
            if coll.hash != hash {
                return RemoveOutcome::NotFound;
            }
            let Some(pos) = coll.entries.iter().position(|e| Q::key_eq(e.key(), key)) else {
                return RemoveOutcome::NotFound;
            };
            debug_assert!(coll.entries.len() >= 2, "collision node needs two entries");
            if coll.entries.len() == 2 {
                // One survivor → degenerate to a bare entry.
                let other = Arc::clone(&coll.entries[1 - pos]);
                return RemoveOutcome::Removed {
                    node: Some(TreePart::Entry(other)),
                };
            }
            RemoveOutcome::Removed {
                node: Some(TreePart::collision(coll.hash, cloned_removing(&coll.entries, pos))),
            }
        }
        TreePart::Bitmap(bm) => {
            let bit = node::mask(node::fragment(hash, shift));
            if bm.bitmap & bit == 0 {
                return RemoveOutcome::NotFound;
            }
            let pos = node::index(bm.bitmap, bit);
            let outcome =
                remove_recursive::<K, V, Q>(&bm.children[pos], hash, key, shift + node::BITS_PER_LEVEL);
            let RemoveOutcome::Removed { node: replacement } = outcome else {
                return RemoveOutcome::NotFound;
            };

            let (bitmap, mut children) = match replacement {
                Some(child) => (bm.bitmap, cloned_replacing(&bm.children, pos, child)),
                None => (bm.bitmap & !bit, cloned_removing(&bm.children, pos)),
            };

            let node = match children.len() {
                0 => None,
                // A lone leaf does not depend on depth → hoist it.
                1 if children[0].is_leaf() => children.pop(),
                _ => Some(TreePart::bitmap(bitmap, children)),
            };
            RemoveOutcome::Removed { node }
        }
        TreePart::Array(arr) => {
            let frag = node::fragment(hash, shift) as usize;
            let Some(child) = arr.children[frag].as_ref() else {
                return RemoveOutcome::NotFound;
            };
            let outcome =
                remove_recursive::<K, V, Q>(child, hash, key, shift + node::BITS_PER_LEVEL);
            let RemoveOutcome::Removed { node: replacement } = outcome else {
                return RemoveOutcome::NotFound;
            };

            if replacement.is_none() && arr.live - 1 < node::ARRAY_MIN_CHILDREN {
                // Too sparse → compact the remaining slots into a bitmap node.
                log::trace!("demoting array node to bitmap node at shift {shift}");
                let mut bitmap = 0;
                let mut children = Vec::with_capacity(arr.live - 1);
                for (i, slot) in arr.children.iter().enumerate() {
                    if i == frag {
                        continue;
                    }
                    if let Some(c) = slot {
                        bitmap |= 1 << i;
                        children.push(c.clone());
                    }
                }
                return RemoveOutcome::Removed {
                    node: Some(TreePart::bitmap(bitmap, children)),
                };
            }

            let mut slots = arr.children.clone();
            slots[frag] = replacement;
            RemoveOutcome::Removed {
                node: Some(TreePart::array(slots)),
            }
        }
    }
}
