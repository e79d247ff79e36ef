// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The B-tree node entity: one record of the node store.
//!
//! A node identifier is a handle into the node store, never an owning
//! reference — `parent_id` and `children_ids` are plain integers the
//! engine resolves through [`crate::tree::node_store::NodeStore`] on
//! every traversal step, the arena-and-index pattern rather than an
//! owning tree of `Box`/`Rc` links.

use crate::codec::Value;
use crate::error::IndexResult;
use crate::record::Record;
use crate::schema::{FieldDef, FieldKind, Schema};

/// Sentinel for "no parent" (this node is the root) and, doubling as the
/// same bit pattern, "no id yet" (this node has never been written).
pub const NONE_ID: i64 = -1;

/// One node of the tree: a slot id, a parent handle, and the three
/// bounded lists that hold its keys, their paired content-ids, and (for
/// internal nodes) child handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub parent_id: i64,
    pub keys: Vec<Value>,
    pub contents: Vec<i64>,
    pub children_ids: Vec<i64>,
}

impl Node {
    /// A freshly allocated, empty leaf with no parent yet assigned.
    pub fn new_leaf() -> Self {
        Self {
            id: NONE_ID,
            parent_id: NONE_ID,
            keys: Vec::new(),
            contents: Vec::new(),
            children_ids: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl Record for Node {
    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int(self.id),
            Value::Int(self.parent_id),
            Value::List(self.keys.clone()),
            Value::List(self.contents.iter().map(|c| Value::Int(*c)).collect()),
            Value::List(self.children_ids.iter().map(|c| Value::Int(*c)).collect()),
        ]
    }

    fn from_values(values: Vec<Value>) -> IndexResult<Self> {
        let mut it = values.into_iter();
        let id = expect_int(&mut it, "id")?;
        let parent_id = expect_int(&mut it, "parent_id")?;
        let keys = expect_list(&mut it, "keys")?;
        let contents = expect_list(&mut it, "contents")?
            .into_iter()
            .map(expect_int_value)
            .collect::<IndexResult<Vec<_>>>()?;
        let children_ids = expect_list(&mut it, "children_ids")?
            .into_iter()
            .map(expect_int_value)
            .collect::<IndexResult<Vec<_>>>()?;

        Ok(Node {
            id,
            parent_id,
            keys,
            contents,
            children_ids,
        })
    }
}

fn expect_int(it: &mut std::vec::IntoIter<Value>, field: &str) -> IndexResult<i64> {
    match it.next() {
        Some(Value::Int(v)) => Ok(v),
        _ => Err(crate::error::IndexError::Decode {
            field: field.to_string(),
            reason: "expected Int".to_string(),
        }),
    }
}

fn expect_list(it: &mut std::vec::IntoIter<Value>, field: &str) -> IndexResult<Vec<Value>> {
    match it.next() {
        Some(Value::List(v)) => Ok(v),
        _ => Err(crate::error::IndexError::Decode {
            field: field.to_string(),
            reason: "expected List".to_string(),
        }),
    }
}

fn expect_int_value(value: Value) -> IndexResult<i64> {
    match value {
        Value::Int(v) => Ok(v),
        _ => Err(crate::error::IndexError::Decode {
            field: "<list element>".to_string(),
            reason: "expected Int element".to_string(),
        }),
    }
}

/// Build the node record's schema for a tree with key kind `key_kind`
/// and branching factor `b`.
///
/// `keys`/`contents` are capped at `keys_size = b - 1`; `children_ids`
/// at `b`.
pub fn node_schema(key_kind: FieldKind, b: u16) -> IndexResult<Schema> {
    let keys_size = (b - 1) as usize;
    Schema::new(vec![
        FieldDef::new("id", FieldKind::Int),
        FieldDef::new("parent_id", FieldKind::Int),
        FieldDef::new("keys", FieldKind::list_of(key_kind, keys_size)),
        FieldDef::new("contents", FieldKind::list_of(FieldKind::Int, keys_size)),
        FieldDef::new(
            "children_ids",
            FieldKind::list_of(FieldKind::Int, b as usize),
        ),
    ])
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
