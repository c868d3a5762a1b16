//! Lookup operation: traverses the trie to find a key.

use crate::hash::KeyEq;
use crate::node::{self, Entry, TreePart};

/// Searches for `key` in the subtree rooted at `part`.
///
/// Returns the matching entry if found.
pub fn get_recursive<'a, K, V, Q>(
    part: &'a TreePart<K, V>,
    hash: u32,
    key: &K,
    shift: u32,
) -> Option<&'a Entry<K, V>>
where
    Q: KeyEq<K>,
{
    match part {
        TreePart::Entry(entry) => {
            if entry.hash() == hash && Q::key_eq(entry.key(), key) {
                Some(entry)
            } else {
                None
            }
        }
        TreePart::Collision(coll) => {
            if coll.hash != hash {
                return None;
            }
            // Linear search through collision entries.
            coll.entries
                .iter()
                .find(|e| Q::key_eq(e.key(), key))
                .map(|e| &**e)
        }
        TreePart::Bitmap(bm) => {
            debug_assert!(shift <= node::MAX_SHIFT, "bitmap node below max depth");
            let bit = node::mask(node::fragment(hash, shift));
            if bm.bitmap & bit == 0 {
                return None;
            }
            let child = &bm.children[node::index(bm.bitmap, bit)];
            get_recursive::<K, V, Q>(child, hash, key, shift + node::BITS_PER_LEVEL)
        }
        TreePart::Array(arr) => {
            debug_assert!(shift <= node::MAX_SHIFT, "array node below max depth");
            let child = arr.children[node::fragment(hash, shift) as usize].as_ref()?;
            get_recursive::<K, V, Q>(child, hash, key, shift + node::BITS_PER_LEVEL)
        }
    }
}
