mod basic;
mod shape;

use crate::Hamt;
use crate::node::TreePart;

/// Routes `log` output through the test harness. `RUST_LOG=trace` shows
/// node-shape transitions.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a map of `n` integer keys, each hashed to itself.
pub fn identity_map(n: u32) -> Hamt<u32, u32> {
    (0..n).map(|i| (i, i, i * 10)).collect()
}

/// Asserts that the handle passes every structural check.
#[track_caller]
pub fn assert_valid<K: PartialEq, V>(map: &Hamt<K, V>) {
    if let Err(err) = map.check_invariants() {
        panic!("invalid trie: {err}");
    }
}

/// Short name of the root's variant, for shape assertions.
pub fn root_kind<K, V>(map: &Hamt<K, V>) -> &'static str {
    match map.root() {
        None => "empty",
        Some(TreePart::Entry(_)) => "entry",
        Some(TreePart::Collision(_)) => "collision",
        Some(TreePart::Bitmap(_)) => "bitmap",
        Some(TreePart::Array(_)) => "array",
    }
}
