use crate::Hamt;
use crate::hash::hash_one;

use super::assert_valid;

#[test]
fn empty_map() {
    let map: Hamt<String, i32> = Hamt::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert!(map.root().is_none());
    assert_eq!(map.iter().count(), 0);
}

#[test]
fn insert_one() {
    let map = Hamt::new().with_entry("hello", hash_one("hello"), 42);
    assert_eq!(map.len(), 1);
    assert!(!map.is_empty());
    assert_eq!(map.lookup(&"hello", hash_one("hello")), Some(&42));
}

#[test]
fn lookup_missing_key() {
    let map = Hamt::new().with_entry("a", hash_one("a"), 1);
    assert_eq!(map.lookup(&"b", hash_one("b")), None);
}

#[test]
fn lookup_on_empty() {
    let map: Hamt<&str, i32> = Hamt::new();
    assert_eq!(map.lookup(&"a", 7), None);
    assert!(!map.contains_key(&"a", 7));
}

#[test]
fn same_key_wrong_hash_is_missing() {
    let map = Hamt::new().with_entry("a", 5, 1);
    assert_eq!(map.lookup(&"a", 6), None);
}

#[test]
fn insert_multiple() {
    let mut map = Hamt::new();
    for i in 0..10_u32 {
        map = map.with_entry(i, hash_one(&i), i * 10);
    }
    assert_eq!(map.len(), 10);
    for i in 0..10_u32 {
        assert_eq!(map.lookup(&i, hash_one(&i)), Some(&(i * 10)));
    }
    assert_valid(&map);
}

#[test]
fn overwrite_value() {
    let h = hash_one("k");
    let map = Hamt::new().with_entry("k", h, 1).with_entry("k", h, 2);
    assert_eq!(map.len(), 1);
    assert_eq!(map.lookup(&"k", h), Some(&2));
}

#[test]
fn hash_is_truncated_to_30_bits() {
    let map = Hamt::new().with_entry("k", 0xC000_0001, 1);
    assert_eq!(map.lookup(&"k", 1), Some(&1));
    assert_eq!(map.lookup(&"k", 0x4000_0001), Some(&1));
    assert!(map.without(&"k", 0x8000_0001).is_empty());
}

#[test]
fn contains_key_true_and_false() {
    let map = Hamt::new().with_entry(42, 42, "val");
    assert!(map.contains_key(&42, 42));
    assert!(!map.contains_key(&2, 2));
}

#[test]
fn get_key_value_returns_stored_key() {
    let map = Hamt::new().with_entry(String::from("key"), 9, 1);
    let (k, v) = map.get_key_value(&String::from("key"), 9).unwrap();
    assert_eq!(k, "key");
    assert_eq!(*v, 1);
}

#[test]
fn remove_existing() {
    let map = Hamt::new()
        .with_entry("a", hash_one("a"), 1)
        .with_entry("b", hash_one("b"), 2);
    let map = map.without(&"a", hash_one("a"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.lookup(&"a", hash_one("a")), None);
    assert_eq!(map.lookup(&"b", hash_one("b")), Some(&2));
    assert_valid(&map);
}

#[test]
fn remove_missing() {
    let map = Hamt::new().with_entry("a", hash_one("a"), 1);
    let after = map.without(&"z", hash_one("z"));
    assert_eq!(after.len(), 1);
    assert_eq!(after, map);
}

#[test]
fn remove_from_empty() {
    let map: Hamt<i32, i32> = Hamt::new();
    let after = map.without(&1, 1);
    assert!(after.is_empty());
    assert!(after.ptr_eq(&map));
}

#[test]
fn remove_all() {
    let mut map = Hamt::new();
    for i in 1..=3_u32 {
        map = map.with_entry(i, i, i * 10);
    }
    for i in 1..=3_u32 {
        map = map.without(&i, i);
    }
    assert!(map.is_empty());
    assert!(map.root().is_none());
}

#[test]
fn idempotent_reinsert() {
    let h = hash_one("x");
    let once = Hamt::new().with_entry("x", h, 1);
    let twice = once.with_entry("x", h, 1);
    assert_eq!(once, twice);
    assert_eq!(twice.len(), 1);
    assert!(!once.ptr_eq(&twice));
}
