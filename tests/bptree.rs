use std::collections::BTreeMap;

use bptree::{BpTree, Degree, Error};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range narrower than `TEST_SIZE` so inserts collide and removes hit.
fn key_strategy() -> impl Strategy<Value = i32> {
    -500i32..500i32
}

fn degree_strategy() -> impl Strategy<Value = usize> {
    2usize..=8
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i32, i64),
    Remove(i32),
    Find(i32),
    ContainsKey(i32),
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| TreeOp::Insert(k, v)),
        4 => key_strategy().prop_map(TreeOp::Remove),
        2 => key_strategy().prop_map(TreeOp::Find),
        1 => key_strategy().prop_map(TreeOp::ContainsKey),
    ]
}

fn keys_of<V>(tree: &BpTree<i32, V>) -> Vec<i32> {
    tree.keys().copied().collect()
}

// ─── Randomized comparison against BTreeMap ──────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Replays random operations on both a `BpTree` and a `BTreeMap`, auditing
    /// the tree's structure after every mutation.
    #[test]
    fn ops_match_btreemap(degree in degree_strategy(), ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree: BpTree<i32, i64> = BpTree::new(degree);
        let mut model: BTreeMap<i32, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                TreeOp::Insert(k, v) => {
                    let expected = !model.contains_key(k);
                    if expected {
                        model.insert(*k, *v);
                    }
                    prop_assert_eq!(tree.insert(*k, *v), expected, "insert({})", k);
                    prop_assert_eq!(tree.validate(), Ok(()), "after insert({})", k);
                }
                TreeOp::Remove(k) => {
                    let expected = model.remove(k);
                    prop_assert_eq!(tree.try_remove(k).ok(), expected, "remove({})", k);
                    prop_assert_eq!(tree.validate(), Ok(()), "after remove({})", k);
                }
                TreeOp::Find(k) => {
                    prop_assert_eq!(tree.find(k), model.get(k), "find({})", k);
                }
                TreeOp::ContainsKey(k) => {
                    prop_assert_eq!(tree.contains_key(k), model.contains_key(k), "contains_key({})", k);
                }
            }
            prop_assert_eq!(tree.len(), model.len());
        }

        prop_assert!(tree.iter().eq(model.iter()));
        prop_assert!(tree.iter().rev().eq(model.iter().rev()));
    }

    /// Drains a tree in random order; every intermediate shape must audit clean
    /// and the final tree is a lone empty leaf.
    #[test]
    fn draining_leaves_an_empty_root(degree in degree_strategy(), keys in proptest::collection::hash_set(key_strategy(), 1..300)) {
        let mut tree = BpTree::new(degree);
        tree.extend(keys.iter().map(|&k| (k, ())));
        prop_assert_eq!(tree.len(), keys.len());

        for k in &keys {
            prop_assert!(tree.remove(k));
            prop_assert_eq!(tree.validate(), Ok(()));
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.height(), 1);
        prop_assert_eq!(tree.render_keys(), "[]\n");
    }

    /// A clone answers every lookup like its source and diverges once either side changes.
    #[test]
    fn clones_are_independent(degree in degree_strategy(), keys in proptest::collection::btree_set(key_strategy(), 1..200)) {
        let mut source = BpTree::new(degree);
        source.extend(keys.iter().map(|&k| (k, i64::from(k) * 3)));
        let copy = source.clone();

        prop_assert_eq!(copy.validate(), Ok(()));
        prop_assert_eq!(copy.render_keys(), source.render_keys());
        prop_assert!(copy.iter().eq(source.iter()));

        let removed: Vec<i32> = keys.iter().copied().step_by(2).collect();
        for k in &removed {
            source.remove(k);
        }
        prop_assert_eq!(copy.len(), keys.len());
        for k in &removed {
            prop_assert_eq!(copy.find(k), Some(&(i64::from(*k) * 3)));
            prop_assert_eq!(source.find(k), None);
        }
        prop_assert_eq!(copy.validate(), Ok(()));
    }
}

// ─── Worked scenarios ────────────────────────────────────────────────────────

#[test]
fn degree_four_lookup_and_value_order() {
    let mut tree = BpTree::new(4);
    for (key, value) in [(30, "A"), (130, "B"), (9, "C"), (81, "D"), (150, "E"), (40, "F"), (1, "G")] {
        assert!(tree.insert(key, value));
    }

    assert_eq!(tree.find(&81), Some(&"D"));
    assert_eq!(tree.find(&999), None);
    assert_eq!(tree.render_values(), "G\nC\nA\nF\nD\nB\nE\n");
    assert_eq!(tree.render_keys(), "[40,130]\n[1,9,30] [40,81] [130,150]\n");
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn degree_three_delete_evens() {
    let mut tree = BpTree::new(3);
    for key in 1..=20 {
        assert!(tree.insert(key, key * 100));
    }
    assert_eq!(tree.validate(), Ok(()));

    for key in (2..=20).step_by(2) {
        assert!(tree.remove(&key));
        assert_eq!(tree.validate(), Ok(()), "after removing {key}");
        assert_eq!(tree.find(&key), None);
    }

    assert_eq!(keys_of(&tree), (1..=20).step_by(2).collect::<Vec<_>>());
    for key in (1..=20).step_by(2) {
        assert_eq!(tree.find(&key), Some(&(key * 100)));
    }
}

#[test]
fn degree_two_splits_into_three_levels() {
    let mut tree = BpTree::new(2);
    for key in 1..=7 {
        tree.insert(key, ());
    }
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.render_keys(), "[5]\n[3] [7]\n[1,2] [3,4] [5,6] [7]\n");
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn removing_the_only_key_leaves_an_empty_root() {
    let mut tree = BpTree::new(3);
    tree.insert(42, "answer");
    assert!(tree.remove(&42));
    assert!(tree.is_empty());
    assert_eq!(tree.find(&42), None);
    assert_eq!(tree.render_keys(), "[]\n");
    assert_eq!(tree.render_values(), "");
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn removing_an_absent_key_changes_nothing() {
    let mut tree = BpTree::new(3);
    tree.extend((0..10).map(|k| (k, k)));
    let before = tree.render_keys();
    assert!(!tree.remove(&10));
    assert_eq!(tree.try_remove(&-1), Err(Error::KeyNotFound));
    assert_eq!(tree.render_keys(), before);
    assert_eq!(tree.len(), 10);
}

#[test]
fn duplicate_insert_is_idempotent() {
    let mut tree = BpTree::new(3);
    tree.extend((0..12).map(|k| (k, k.to_string())));
    let keys = tree.render_keys();

    for _ in 0..3 {
        assert!(!tree.insert(7, "seven".to_string()));
        assert_eq!(tree.try_insert(7, "seven".to_string()), Err(Error::DuplicateKey));
    }
    assert_eq!(tree.find(&7).map(String::as_str), Some("7"));
    assert_eq!(tree.len(), 12);
    assert_eq!(tree.render_keys(), keys);
}

#[test]
fn empty_values_are_not_absence() {
    let mut tree = BpTree::new(2);
    tree.insert("blank", String::new());
    assert_eq!(tree.find("blank").map(String::as_str), Some(""));
    assert!(tree.contains_key("blank"));
    assert_eq!(tree.find("missing"), None);
}

#[test]
fn string_keys_look_up_by_str() {
    let mut tree: BpTree<String, usize> = BpTree::new(4);
    for (i, word) in ["pear", "apple", "fig", "kiwi", "plum", "date"].into_iter().enumerate() {
        tree.insert(word.to_string(), i);
    }
    assert_eq!(tree.find("kiwi"), Some(&3));
    assert!(tree.remove("apple"));
    assert_eq!(
        tree.keys().map(String::as_str).collect::<Vec<_>>(),
        ["date", "fig", "kiwi", "pear", "plum"]
    );
}

#[test]
fn invalid_degrees_are_rejected() {
    assert_eq!(BpTree::<i32, i32>::try_new(0).err(), Some(Error::InvalidDegree { degree: 0, min: 2 }));
    assert_eq!(Degree::try_from(1), Err(Error::InvalidDegree { degree: 1, min: 2 }));
    let tree: BpTree<i32, i32> = BpTree::with_degree(Degree::new(2).unwrap());
    assert_eq!(tree.degree().get(), 2);
}

#[test]
fn clear_keeps_the_degree() {
    let mut tree = BpTree::new(5);
    tree.extend((0..100).map(|k| (k, k)));
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.degree().get(), 5);
    assert_eq!(tree.iter().next(), None);
    tree.insert(1, 1);
    assert_eq!(tree.validate(), Ok(()));
}

// ─── Iteration ───────────────────────────────────────────────────────────────

#[test]
fn iterators_agree_in_both_directions() {
    let mut tree = BpTree::new(3);
    tree.extend((0..50).rev().map(|k| (k, -k)));

    let forward: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    let mut backward: Vec<_> = tree.iter().rev().map(|(k, v)| (*k, *v)).collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(tree.iter().len(), 50);
    assert_eq!(tree.values().rev().next(), Some(&-49));

    let mut total = 0;
    for (k, _) in &tree {
        total += k;
    }
    assert_eq!(total, (0..50).sum());
}

#[test]
fn debug_output_lists_pairs_in_order() {
    let mut tree = BpTree::new(2);
    tree.extend([(3, "c"), (1, "a"), (2, "b")]);
    assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
}

// ─── Sequential workloads ────────────────────────────────────────────────────

#[test]
fn ordered_and_reverse_workloads_stay_valid() {
    for degree in 2..=8 {
        let mut tree = BpTree::new(degree);
        for key in 0..500 {
            tree.insert(key, ());
        }
        assert_eq!(tree.validate(), Ok(()), "ascending insert, m = {degree}");
        for key in (0..500).rev() {
            assert!(tree.remove(&key));
        }
        assert_eq!(tree.validate(), Ok(()), "descending remove, m = {degree}");
        assert!(tree.is_empty());

        for key in (0..500).rev() {
            tree.insert(key, ());
        }
        for key in 0..500 {
            assert!(tree.remove(&key));
            if key % 50 == 0 {
                assert_eq!(tree.validate(), Ok(()), "ascending remove at {key}, m = {degree}");
            }
        }
        assert_eq!(tree.height(), 1);
    }
}
