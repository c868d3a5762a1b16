//! Node-shape transitions: pairing, promotion, demotion and hoisting.

use crate::Hamt;
use crate::node::{self, TreePart};

use super::{assert_valid, identity_map, init_logging, root_kind};

/// "a"@1 and "b"@33 share the first 5-bit slice, so the pair is built one
/// level down under a singleton bitmap node. Removing "a" collapses both
/// levels back to a bare entry.
#[test]
fn nested_singleton_bitmap_then_collapse() {
    let map = Hamt::new().with_entry("a", 1, "A").with_entry("b", 33, "B");

    let Some(TreePart::Bitmap(outer)) = map.root() else {
        panic!("expected bitmap root, got {:?}", map.root());
    };
    assert_eq!(outer.bitmap(), 1 << 1);
    assert_eq!(outer.children().len(), 1);
    let TreePart::Bitmap(inner) = &outer.children()[0] else {
        panic!("expected nested bitmap, got {:?}", outer.children()[0]);
    };
    assert_eq!(inner.bitmap(), 0b11);
    assert_eq!(inner.children().len(), 2);

    assert_eq!(map.lookup(&"a", 1), Some(&"A"));
    assert_eq!(map.lookup(&"b", 33), Some(&"B"));
    assert_valid(&map);

    let map = map.without(&"a", 1);
    assert_eq!(map.lookup(&"a", 1), None);
    assert_eq!(map.lookup(&"b", 33), Some(&"B"));
    let Some(TreePart::Entry(entry)) = map.root() else {
        panic!("expected bare entry root, got {:?}", map.root());
    };
    assert_eq!(*entry.key(), "b");
    assert_valid(&map);
}

/// Hashes that agree on all but the last slice build the deepest chain.
#[test]
fn deepest_pair() {
    let low = 7;
    let high = 7 | (1 << node::MAX_SHIFT);
    let map = Hamt::new().with_entry('l', low, 1).with_entry('h', high, 2);

    let mut depth = 0;
    let mut part = map.root().unwrap();
    while let TreePart::Bitmap(b) = part {
        depth += 1;
        part = b.children().last().unwrap();
    }
    assert_eq!(depth, 6);
    assert_eq!(map.lookup(&'l', low), Some(&1));
    assert_eq!(map.lookup(&'h', high), Some(&2));
    assert_valid(&map);

    let map = map.without(&'h', high);
    assert_eq!(root_kind(&map), "entry");
}

/// Bitmap children are stored by ascending fragment, whatever the
/// insertion order.
#[test]
fn bitmap_children_ascending() {
    let map = Hamt::new()
        .with_entry(9, 9, ())
        .with_entry(3, 3, ())
        .with_entry(5, 5, ());

    let Some(TreePart::Bitmap(b)) = map.root() else {
        panic!("expected bitmap root");
    };
    assert_eq!(b.bitmap(), (1 << 3) | (1 << 5) | (1 << 9));
    let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, [3, 5, 9]);
}

/// Fifteen children stay sparse; the sixteenth materialises an array node.
#[test]
fn promotion_at_sixteen_children() {
    init_logging();

    let sparse = identity_map(node::BITMAP_MAX_CHILDREN as u32);
    let Some(TreePart::Bitmap(b)) = sparse.root() else {
        panic!("expected bitmap root, got {:?}", sparse.root());
    };
    assert_eq!(b.children().len(), node::BITMAP_MAX_CHILDREN);

    let dense = sparse.with_entry(15, 15, 150);
    let Some(TreePart::Array(a)) = dense.root() else {
        panic!("expected array root, got {:?}", dense.root());
    };
    assert_eq!(a.live(), 16);
    for i in 0..16_u32 {
        let slot = a.children()[i as usize].as_ref().unwrap();
        assert!(matches!(slot, TreePart::Entry(e) if *e.key() == i));
        assert_eq!(dense.lookup(&i, i), Some(&(i * 10)));
    }
    assert!(a.children()[16..].iter().all(Option::is_none));
    assert_valid(&dense);
    assert_valid(&sparse);
}

/// Promotion keeps existing children at their true indices even when the
/// new entry lands between them.
#[test]
fn promotion_with_gap() {
    let evens: Hamt<u32, u32> = (0..15).map(|i| (i * 2, i * 2, i)).collect();
    let dense = evens.with_entry(7, 7, 99);

    let Some(TreePart::Array(a)) = dense.root() else {
        panic!("expected array root");
    };
    for i in 0..15_u32 {
        assert!(a.children()[(i * 2) as usize].is_some());
    }
    assert!(a.children()[7].is_some());
    assert_eq!(dense.lookup(&7, 7), Some(&99));
    assert_eq!(dense.lookup(&28, 28), Some(&14));
    assert_valid(&dense);
}

/// Replacing a value inside a dense node does not change its shape.
#[test]
fn array_update_keeps_array() {
    let dense = identity_map(32);
    let updated = dense.with_entry(4, 4, 0);
    assert_eq!(root_kind(&updated), "array");
    assert_eq!(updated.len(), 32);
    assert_eq!(updated.lookup(&4, 4), Some(&0));
    assert_eq!(dense.lookup(&4, 4), Some(&40));
}

/// Dropping below sixteen live slots demotes to a bitmap node.
#[test]
fn demotion_below_sixteen() {
    init_logging();

    let dense = identity_map(16);
    assert_eq!(root_kind(&dense), "array");

    let sparse = dense.without(&0, 0);
    let Some(TreePart::Bitmap(b)) = sparse.root() else {
        panic!("expected bitmap root, got {:?}", sparse.root());
    };
    assert_eq!(b.children().len(), 15);
    assert_eq!(b.bitmap(), 0xFFFE);
    for i in 1..16_u32 {
        assert_eq!(sparse.lookup(&i, i), Some(&(i * 10)));
    }
    assert_valid(&sparse);
}

/// An array above the minimum stays an array after a removal.
#[test]
fn removal_above_minimum_keeps_array() {
    let dense = identity_map(20);
    let smaller = dense.without(&3, 3);
    let Some(TreePart::Array(a)) = smaller.root() else {
        panic!("expected array root");
    };
    assert_eq!(a.live(), 19);
    assert!(a.children()[3].is_none());
    assert_valid(&smaller);
}

/// Alternating insert/remove at the boundary flips shape each time and
/// never corrupts the trie.
#[test]
fn boundary_alternation() {
    let mut map = identity_map(15);
    for _ in 0..5 {
        map = map.with_entry(15, 15, 150);
        assert_eq!(root_kind(&map), "array");
        assert_valid(&map);
        map = map.without(&15, 15);
        assert_eq!(root_kind(&map), "bitmap");
        assert_valid(&map);
    }
    assert_eq!(map.len(), 15);
}

/// A slot emptied inside an array node whose subtree collapses to a leaf
/// keeps the leaf in the slot.
#[test]
fn array_child_collapses_to_leaf() {
    // Slot 1 holds a pair {1, 33}; slots 0..16 are otherwise single entries.
    let map = identity_map(16).with_entry(33, 33, 330);
    let Some(TreePart::Array(a)) = map.root() else {
        panic!("expected array root");
    };
    assert!(matches!(a.children()[1], Some(TreePart::Bitmap(_))));

    let map = map.without(&1, 1);
    let Some(TreePart::Array(a)) = map.root() else {
        panic!("expected array root");
    };
    assert!(matches!(&a.children()[1], Some(TreePart::Entry(e)) if *e.key() == 33));
    assert_eq!(map.lookup(&33, 33), Some(&330));
    assert_valid(&map);
}

/// Removing an absent key shares the original root.
#[test]
fn absent_removal_shares_root() {
    let map = identity_map(100);
    let same = map.without(&1000, 1000);
    assert!(same.ptr_eq(&map));

    let same = map.without(&1000, 5);
    assert!(same.ptr_eq(&map));
}

/// Collision bucket meets a different hash deeper in the trie.
#[test]
fn collision_paired_with_entry() {
    let map = Hamt::new()
        .with_entry(1, 0x41, 'a')
        .with_entry(2, 0x41, 'b')
        .with_entry(3, 0x01, 'c');

    let Some(TreePart::Bitmap(outer)) = map.root() else {
        panic!("expected bitmap root");
    };
    let TreePart::Bitmap(inner) = &outer.children()[0] else {
        panic!("expected nested bitmap");
    };
    assert_eq!(inner.bitmap(), (1 << 0) | (1 << 2));
    assert!(matches!(inner.children()[0], TreePart::Entry(_)));
    assert!(matches!(inner.children()[1], TreePart::Collision(_)));
    assert_valid(&map);
}
