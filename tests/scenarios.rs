// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios driven entirely through the public `BTreeIndex`
//! API, never by poking at tree internals.

use bxtree::codec::Value;
use bxtree::schema::FieldKind;
use bxtree::{BTreeIndex, ContentStore, IndexResult, Resolved, TreeConfig};
use tempfile::tempdir;

struct RowStore;

impl ContentStore<String> for RowStore {
    fn get(&self, content_id: i64) -> IndexResult<String> {
        Ok(format!("row-{}", content_id))
    }
}

fn open(b: u16) -> (tempfile::TempDir, BTreeIndex) {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    let index = BTreeIndex::open(config).unwrap();
    (dir, index)
}

#[test]
fn scenario_insert_then_find_returns_rows_through_content_store() {
    let (_dir, mut index) = open(4);
    index.insert(Value::Int(1), 7).unwrap();

    let rows = index.find(&Value::Int(1), Some(&RowStore as &dyn ContentStore<String>)).unwrap();
    assert_eq!(rows, vec![Resolved::Row("row-7".to_string())]);
}

#[test]
fn scenario_find_without_content_store_degrades_to_raw_ids() {
    let (_dir, mut index) = open(4);
    index.insert(Value::Int(1), 7).unwrap();

    let rows = index.find::<String>(&Value::Int(1), None).unwrap();
    assert_eq!(rows, vec![Resolved::ContentId(7)]);
}

#[test]
fn scenario_many_insertions_then_deletions_preserve_search_completeness() {
    let (_dir, mut index) = open(4);
    for k in 0..200i64 {
        index.insert(Value::Int(k % 37), k).unwrap();
    }

    // Every inserted (key, content) pair must be found.
    for k in 0..200i64 {
        assert_eq!(
            index
                .find_with_key_and_content(&Value::Int(k % 37), k)
                .unwrap(),
            Some(k)
        );
    }

    // Delete every third one and confirm exact survivors remain.
    let mut deleted = Vec::new();
    for k in (0..200i64).step_by(3) {
        assert!(index.delete(&Value::Int(k % 37), k).unwrap());
        deleted.push(k);
    }

    for k in 0..200i64 {
        let expect_present = !deleted.contains(&k);
        let found = index
            .find_with_key_and_content(&Value::Int(k % 37), k)
            .unwrap()
            .is_some();
        assert_eq!(found, expect_present, "mismatch for content {}", k);
    }
}

#[test]
fn scenario_string_keyed_index_round_trips() {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::String { max_chars: 16 },
        directory: dir.path().to_path_buf(),
    };
    let mut index = BTreeIndex::open(config).unwrap();

    for (i, word) in ["pear", "apple", "kiwi", "mango", "fig"].iter().enumerate() {
        index.insert(Value::Str(word.to_string()), i as i64).unwrap();
    }

    assert_eq!(
        index
            .find_with_key_and_content(&Value::Str("apple".to_string()), 1)
            .unwrap(),
        Some(1)
    );
    assert_eq!(
        index.find_with_key_and_content(&Value::Str("apple".to_string()), 99).unwrap(),
        None
    );
}

#[test]
fn scenario_reopen_after_process_restart_keeps_all_entries() {
    let dir = tempdir().unwrap();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::Int,
        directory: dir.path().to_path_buf(),
    };
    {
        let mut index = BTreeIndex::open(config.clone()).unwrap();
        for k in 1..=30i64 {
            index.insert(Value::Int(k), k * 10).unwrap();
        }
    }

    let index = BTreeIndex::open(config).unwrap();
    for k in 1..=30i64 {
        assert_eq!(
            index.find_with_key_and_content(&Value::Int(k), k * 10).unwrap(),
            Some(k * 10)
        );
    }
}

#[test]
fn scenario_drop_removes_all_index_files() {
    let dir = tempdir().unwrap();
    let directory = dir.path().to_path_buf();
    let config = TreeConfig {
        b: 4,
        key_kind: FieldKind::Int,
        directory: directory.clone(),
    };
    let mut index = BTreeIndex::open(config).unwrap();
    index.insert(Value::Int(1), 1).unwrap();
    index.drop().unwrap();

    assert!(!directory.join("nodes.bin").exists());
    assert!(!directory.join("metadata.bin").exists());
}
