//! Iterator types for HAMT handles.
//!
//! [`Iter`] walks one immutable snapshot with an explicit stack instead of
//! recursion, so a half-finished traversal can be paused, resumed, or
//! cloned and continued independently.

use std::iter::FusedIterator;

use crate::node::{self, Entry, TreePart};

/// One level of the traversal: a node and the next child to visit.
struct Frame<'a, K, V> {
    node: &'a TreePart<K, V>,
    next: usize,
}

/// What a frame hands out when advanced.
enum Step<'a, K, V> {
    Leaf(&'a Entry<K, V>),
    Node(&'a TreePart<K, V>),
}

impl<'a, K, V> Step<'a, K, V> {
    fn of(part: &'a TreePart<K, V>) -> Self {
        match part {
            TreePart::Entry(e) => Self::Leaf(e),
            _ => Self::Node(part),
        }
    }
}

impl<'a, K, V> Frame<'a, K, V> {
    const fn new(node: &'a TreePart<K, V>) -> Self {
        Self { node, next: 0 }
    }

    /// Moves to the next child of this frame's node, if any.
    fn next_child(&mut self) -> Option<Step<'a, K, V>> {
        match self.node {
            TreePart::Entry(_) => unreachable!("entries are yielded, never pushed"),
            TreePart::Collision(c) => {
                let e = c.entries.get(self.next)?;
                self.next += 1;
                Some(Step::Leaf(e))
            }
            TreePart::Bitmap(b) => {
                let child = b.children.get(self.next)?;
                self.next += 1;
                Some(Step::of(child))
            }
            TreePart::Array(a) => {
                while self.next < node::ARRAY_WIDTH {
                    let slot = a.children[self.next].as_ref();
                    self.next += 1;
                    if let Some(child) = slot {
                        return Some(Step::of(child));
                    }
                }
                None
            }
        }
    }
}

/// Iterator over references to key-value pairs in a [`Hamt`](crate::Hamt).
///
/// Order follows the hash-bit structure of the trie, not insertion order,
/// and is the same on every traversal of the same handle.
pub struct Iter<'a, K, V> {
    stack: Vec<Frame<'a, K, V>>,
    current: Option<&'a Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Creates an iterator positioned on the leftmost entry under `root`.
    ///
    /// `len` is the number of entries reachable from `root`.
    pub(crate) fn new(root: Option<&'a TreePart<K, V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(node::MAX_DEPTH),
            current: None,
            remaining: len,
        };
        match root.map(Step::of) {
            None => {}
            Some(Step::Leaf(e)) => iter.current = Some(e),
            Some(Step::Node(n)) => {
                iter.stack.push(Frame::new(n));
                iter.current = iter.advance();
            }
        }
        iter
    }

    /// Returns the current entry and moves past it.
    pub(crate) fn next_entry(&mut self) -> Option<&'a Entry<K, V>> {
        let entry = self.current?;
        self.current = self.advance();
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    /// Finds the next entry: pops exhausted frames, descends leftmost
    /// through internal nodes.
    fn advance(&mut self) -> Option<&'a Entry<K, V>> {
        while let Some(frame) = self.stack.last_mut() {
            match frame.next_child() {
                Some(Step::Leaf(e)) => return Some(e),
                Some(Step::Node(n)) => {
                    debug_assert!(self.stack.len() < node::MAX_DEPTH, "trie deeper than hash allows");
                    self.stack.push(Frame::new(n));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|e| (e.key(), e.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// ---------------------------------------------------------------------------
// Manual trait impls: a cursor copy must not require `K: Clone, V: Clone`.
// ---------------------------------------------------------------------------

impl<K, V> Clone for Frame<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Frame<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            current: self.current,
            remaining: self.remaining,
        }
    }
}
