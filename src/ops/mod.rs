//! Trie engine: lookup, path-copy insert and path-copy remove.

pub mod get;
pub mod insert;
pub mod remove;

// ---------------------------------------------------------------------------
// Child array builders shared by insert and remove
// ---------------------------------------------------------------------------

fn cloned_inserting<T: Clone>(items: &[T], at: usize, item: T) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(&items[..at]);
    out.push(item);
    out.extend_from_slice(&items[at..]);
    out
}

fn cloned_replacing<T: Clone>(items: &[T], at: usize, item: T) -> Vec<T> {
    let mut out = items.to_vec();
    out[at] = item;
    out
}

fn cloned_removing<T: Clone>(items: &[T], at: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len() - 1);
    out.extend_from_slice(&items[..at]);
    out.extend_from_slice(&items[at + 1..]);
    out
}
