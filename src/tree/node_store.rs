// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! A [`PagedRecordStore`] specialised for [`Node`] records.

use super::node::{node_schema, Node, NONE_ID};
use crate::error::IndexResult;
use crate::record::RecordLayout;
use crate::schema::FieldKind;
use crate::store::PagedRecordStore;
use std::path::Path;

#[derive(Debug)]
pub struct NodeStore {
    store: PagedRecordStore<Node>,
}

impl NodeStore {
    pub fn open(path: &Path, key_kind: FieldKind, b: u16) -> IndexResult<Self> {
        let layout = RecordLayout::new(node_schema(key_kind, b)?);
        Ok(Self {
            store: PagedRecordStore::open(path, layout)?,
        })
    }

    pub fn get_node(&self, id: i64) -> IndexResult<Option<Node>> {
        self.store.find_by_id(id)
    }

    /// Persist `node`. If it has never been written (`id == NONE_ID`) it
    /// is appended and stamped with the assigned id; otherwise its
    /// existing slot is overwritten.
    pub fn put_node(&mut self, node: &mut Node) -> IndexResult<i64> {
        if node.id == NONE_ID {
            let id = self.store.append(node)?;
            node.id = id;
            Ok(id)
        } else {
            self.store.put(node.id, node)?;
            Ok(node.id)
        }
    }

    pub fn delete_node(&mut self, id: i64) -> IndexResult<()> {
        self.store.delete(id)
    }

    pub fn destroy(self) -> IndexResult<()> {
        self.store.destroy()
    }
}

#[cfg(test)]
#[path = "node_store_test.rs"]
mod node_store_test;
