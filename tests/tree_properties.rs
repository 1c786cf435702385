//! Property-based tests for BalancedTree.
//!
//! Random operation sequences are replayed against the tree and the balance,
//! height, ordering and size properties are checked after every step.

use balanced_tree::{BalancedTree, Traversal, TreeError, helper::within_height_bound};
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Operation {
    Insert(i16),
    Remove(i16),
}

/// Small key range so that removals and duplicates actually hit stored keys
fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (-64i16..64).prop_map(Operation::Insert),
        2 => (-64i16..64).prop_map(Operation::Remove),
    ]
}

fn keys(max_size: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(any::<i32>(), 0..max_size)
}

fn keys_of(tree: &BalancedTree<i32>) -> Vec<i32> {
    tree.in_order().into_iter().copied().collect()
}

// =============================================================================
// Balance and height
// =============================================================================

proptest! {
    /// The balance invariant holds after every insert and remove.
    #[test]
    fn prop_balanced_after_every_operation(ops in prop::collection::vec(operation(), 0..200)) {
        let mut tree = BalancedTree::new();
        for op in ops {
            match op {
                Operation::Insert(key) => {
                    tree.insert(key);
                }
                Operation::Remove(key) => {
                    let _ = tree.remove(&key);
                }
            }
            prop_assert!(tree.is_balanced());
            prop_assert!(tree.is_ordered());
        }
    }

    /// An AVL tree of n nodes is never taller than 1.44 * log2(n + 2).
    #[test]
    fn prop_height_bound(keys in keys(500)) {
        let tree: BalancedTree<i32> = keys.into_iter().collect();
        if !tree.is_empty() {
            prop_assert!(within_height_bound(tree.height(), tree.distinct_len()));
        }
    }

    /// Sorted input is the worst case for an unbalanced tree and must stay logarithmic.
    #[test]
    fn prop_height_bound_sorted_input(len in 1usize..2_000) {
        let tree: BalancedTree<usize> = (0..len).collect();
        prop_assert!(within_height_bound(tree.height(), len));
    }
}

// =============================================================================
// Ordering, search and size
// =============================================================================

proptest! {
    /// In-order traversal is non-decreasing and matches a sorted copy of the input.
    #[test]
    fn prop_in_order_sorted(keys in keys(200)) {
        let tree: BalancedTree<i32> = keys.iter().copied().collect();
        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(keys_of(&tree), expected);
    }

    /// Every stored key is found by all traversals, and is gone after its removal.
    #[test]
    fn prop_search_round_trip(keys in prop::collection::btree_set(any::<i32>(), 1..100)) {
        let mut tree: BalancedTree<i32> = keys.iter().copied().collect();

        for key in &keys {
            for order in Traversal::ALL {
                prop_assert_eq!(tree.search(key, order), Some(key));
            }
        }

        for key in &keys {
            prop_assert_eq!(tree.remove(key), Ok(()));
            for order in Traversal::ALL {
                prop_assert_eq!(tree.search(key, order), None);
            }
            prop_assert!(tree.is_balanced());
        }
        prop_assert!(tree.is_empty());
    }

    /// All traversal orders agree on every probe, stored or not.
    #[test]
    fn prop_traversals_agree(keys in keys(100), probe: i32) {
        let tree: BalancedTree<i32> = keys.into_iter().collect();
        let expected = tree.contains(&probe);
        for order in Traversal::ALL {
            prop_assert_eq!(tree.search(&probe, order).is_some(), expected);
        }
    }

    /// len equals inserts minus successful removes, and tracks a reference multiset.
    #[test]
    fn prop_size_consistency(ops in prop::collection::vec(operation(), 0..200)) {
        let mut tree = BalancedTree::new();
        let mut reference: BTreeMap<i16, usize> = BTreeMap::new();
        let (mut inserts, mut removes) = (0usize, 0usize);

        for op in ops {
            match op {
                Operation::Insert(key) => {
                    tree.insert(key);
                    *reference.entry(key).or_default() += 1;
                    inserts += 1;
                }
                Operation::Remove(key) => match reference.get_mut(&key) {
                    Some(count) => {
                        prop_assert_eq!(tree.remove(&key), Ok(()));
                        *count -= 1;
                        if *count == 0 {
                            reference.remove(&key);
                        }
                        removes += 1;
                    }
                    None => prop_assert_eq!(tree.remove(&key), Err(TreeError::KeyNotFound)),
                },
            }
        }

        prop_assert_eq!(tree.len(), inserts - removes);
        prop_assert_eq!(tree.distinct_len(), reference.len());
        for (key, count) in &reference {
            prop_assert_eq!(tree.count(key), *count);
        }
    }
}

// =============================================================================
// Invert and rebuild
// =============================================================================

proptest! {
    /// Inverting twice restores the exact shape.
    #[test]
    fn prop_invert_idempotence(keys in keys(150)) {
        let mut tree: BalancedTree<i32> = keys.into_iter().collect();
        let pre_order: Vec<i32> = tree.pre_order().into_iter().copied().collect();
        let post_order: Vec<i32> = tree.post_order().into_iter().copied().collect();

        tree.invert();
        prop_assert!(tree.is_balanced());
        tree.invert();

        prop_assert_eq!(tree.pre_order().into_iter().copied().collect::<Vec<_>>(), pre_order);
        prop_assert_eq!(tree.post_order().into_iter().copied().collect::<Vec<_>>(), post_order);
        prop_assert!(tree.is_ordered());
    }

    /// A single inversion reverses the in-order sequence.
    #[test]
    fn prop_invert_reverses_in_order(keys in keys(150)) {
        let mut tree: BalancedTree<i32> = keys.into_iter().collect();
        let mut expected = keys_of(&tree);
        expected.reverse();
        tree.invert();
        prop_assert_eq!(keys_of(&tree), expected);
    }

    /// Rebuilding keeps the multiset and yields an ordered, balanced tree.
    #[test]
    fn prop_rebuild_preserves_keys(keys in keys(150), invert: bool) {
        let mut tree: BalancedTree<i32> = keys.iter().copied().collect();
        if invert {
            tree.invert();
        }
        tree.rebuild();

        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(keys_of(&tree), expected);
        prop_assert!(tree.is_ordered());
        prop_assert!(tree.is_balanced());
    }
}
