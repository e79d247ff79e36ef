// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use tempfile::tempdir;

fn open_index(b: u16) -> (tempfile::TempDir, BTreeIndex) {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    let index = BTreeIndex::open(config).unwrap();
    (dir, index)
}

/// Walk the whole tree checking key ordering, child-count, min/max
/// occupancy, and parentage invariants at every node.
fn check_invariants(index: &BTreeIndex) {
    check_node(index, index.root_id, true, index.min_keys(), index.keys_size());
}

fn check_node(index: &BTreeIndex, node_id: i64, is_root: bool, min_keys: usize, keys_size: usize) {
    let node = index.load(node_id).unwrap();

    for w in node.keys.windows(2) {
        assert_ne!(w[0].compare(&w[1]), std::cmp::Ordering::Greater, "keys not sorted");
    }

    if !node.is_leaf() {
        assert_eq!(node.children_ids.len(), node.keys.len() + 1, "child count != k+1");
    }

    if !is_root {
        assert!(node.keys.len() >= min_keys, "non-root node below minimum");
        assert!(node.keys.len() <= keys_size, "non-root node above maximum");

        let parent = index.load(node.parent_id).unwrap();
        assert!(
            parent.children_ids.contains(&node.id),
            "parentage invariant violated"
        );
    }

    for &child_id in &node.children_ids {
        check_node(index, child_id, false, min_keys, keys_size);
    }
}

fn leaf_depth(index: &BTreeIndex, node_id: i64) -> usize {
    let node = index.load(node_id).unwrap();
    if node.is_leaf() {
        0
    } else {
        1 + leaf_depth(index, node.children_ids[0])
    }
}

fn all_leaves_equal_depth(index: &BTreeIndex) -> bool {
    fn collect_depths(index: &BTreeIndex, node_id: i64, depth: usize, out: &mut Vec<usize>) {
        let node = index.load(node_id).unwrap();
        if node.is_leaf() {
            out.push(depth);
        } else {
            for &c in &node.children_ids {
                collect_depths(index, c, depth + 1, out);
            }
        }
    }
    let mut depths = Vec::new();
    collect_depths(index, index.root_id, 0, &mut depths);
    depths.iter().all(|&d| d == depths[0])
}

#[test]
fn s1_basic_insert_and_extrema_scans() {
    let (_dir, mut index) = open_index(4);
    for k in [10, 20, 5, 6, 12, 30, 7, 17] {
        index.insert(Value::Int(k), k as i64).unwrap();
    }

    assert!(leaf_depth(&index, index.root_id) >= 1);
    let root = index.load(index.root_id).unwrap();
    assert!(root.keys.len() == 1 || root.keys.len() == 2);

    assert_eq!(index.find_n_smallest(3).unwrap(), vec![5, 6, 7]);
    assert_eq!(index.find_n_biggest(3).unwrap(), vec![30, 20, 17]);
    check_invariants(&index);
}

#[test]
fn s2_duplicate_keys() {
    let (_dir, mut index) = open_index(4);
    index.insert(Value::Int(5), 1).unwrap(); // 'a'
    index.insert(Value::Int(5), 2).unwrap(); // 'b'
    index.insert(Value::Int(5), 3).unwrap(); // 'c'

    let mut contents = index.find_contents(&Value::Int(5)).unwrap();
    contents.sort();
    assert_eq!(contents, vec![1, 2, 3]);

    let first = index.find_first_or_default(&Value::Int(5)).unwrap();
    assert!(first.is_some());

    assert!(index.delete(&Value::Int(5), 2).unwrap());
    let mut remaining = index.find_contents(&Value::Int(5)).unwrap();
    remaining.sort();
    assert_eq!(remaining, vec![1, 3]);
}

#[test]
fn s3_sequential_insert_then_reverse_delete() {
    let (_dir, mut index) = open_index(4);
    for k in 1..=20i64 {
        index.insert(Value::Int(k), k).unwrap();
    }
    check_invariants(&index);

    for k in (1..=20i64).rev() {
        assert!(index.delete(&Value::Int(k), k).unwrap());
        check_invariants(&index);
        assert!(all_leaves_equal_depth(&index));
    }

    let root = index.load(index.root_id).unwrap();
    assert_eq!(root.keys.len(), 0);
    assert!(root.is_leaf());
}

#[test]
fn s4_fourth_insert_splits_root() {
    let (_dir, mut index) = open_index(4);
    for k in 1..=4i64 {
        index.insert(Value::Int(k), k).unwrap();
    }
    let root = index.load(index.root_id).unwrap();
    assert_eq!(root.keys.len(), 1);
    assert_eq!(root.keys[0], Value::Int(2));
    assert_eq!(root.children_ids.len(), 2);
    check_invariants(&index);
}

#[test]
fn s5_deletion_triggers_borrow_or_merge() {
    let (_dir, mut index) = open_index(4);
    for k in 1..=12i64 {
        index.insert(Value::Int(k), k).unwrap();
    }
    check_invariants(&index);

    for k in [1, 2, 3] {
        index.delete(&Value::Int(k), k).unwrap();
        check_invariants(&index);
    }
}

#[test]
fn s6_root_collapse_reduces_depth() {
    let (_dir, mut index) = open_index(4);
    for k in 1..=8i64 {
        index.insert(Value::Int(k), k).unwrap();
    }
    let depth_before = leaf_depth(&index, index.root_id);

    for k in (3..=8i64).rev() {
        index.delete(&Value::Int(k), k).unwrap();
        check_invariants(&index);
    }
    for k in [1, 2] {
        index.delete(&Value::Int(k), k).unwrap();
        check_invariants(&index);
    }

    let depth_after = leaf_depth(&index, index.root_id);
    assert!(depth_after <= depth_before);
}

#[test]
fn find_with_key_and_content_is_existence_probe() {
    let (_dir, mut index) = open_index(4);
    index.insert(Value::Int(1), 100).unwrap();
    assert_eq!(
        index.find_with_key_and_content(&Value::Int(1), 100).unwrap(),
        Some(100)
    );
    assert_eq!(
        index.find_with_key_and_content(&Value::Int(1), 999).unwrap(),
        None
    );
}

#[test]
fn idempotent_deletion() {
    let (_dir, mut index) = open_index(4);
    index.insert(Value::Int(1), 100).unwrap();
    assert!(index.delete(&Value::Int(1), 100).unwrap());
    assert!(!index.delete(&Value::Int(1), 100).unwrap());
}

#[test]
fn find_smallest_on_empty_tree_is_none() {
    let (_dir, index) = open_index(4);
    assert_eq!(index.find_smallest().unwrap(), None);
}

#[test]
fn find_n_smallest_returns_fewer_than_n_if_tree_is_smaller() {
    let (_dir, mut index) = open_index(4);
    index.insert(Value::Int(1), 1).unwrap();
    index.insert(Value::Int(2), 2).unwrap();
    assert_eq!(index.find_n_smallest(10).unwrap(), vec![1, 2]);
}

#[test]
fn reopen_resumes_from_persisted_root() {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    {
        let mut index = BTreeIndex::open(config.clone()).unwrap();
        for k in 1..=6i64 {
            index.insert(Value::Int(k), k).unwrap();
        }
    }
    let reopened = BTreeIndex::open(config).unwrap();
    assert_eq!(reopened.find_n_smallest(6).unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn open_rejects_branching_factor_below_three() {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b: 2,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    let err = BTreeIndex::open(config).unwrap_err();
    assert!(matches!(err, IndexError::InvalidBranchingFactor { b: 2 }));
}

#[test]
fn second_open_on_same_directory_fails_lock() {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    let _first = BTreeIndex::open(config.clone()).unwrap();
    let second = BTreeIndex::open(config);
    assert!(matches!(second, Err(IndexError::LockHeld { .. })));
}

#[test]
fn drop_removes_backing_files() {
    let dir = tempdir().unwrap();
    let directory = dir.path().to_path_buf();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::Int,
        directory: directory.clone(),
    };
    let index = BTreeIndex::open(config).unwrap();
    index.drop().unwrap();
    assert!(!directory.join("nodes.bin").exists());
    assert!(!directory.join("metadata.bin").exists());
}
