// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Index metadata: a single-record store holding just the current
//! `root_id`.

use crate::codec::Value;
use crate::error::{IndexError, IndexResult};
use crate::record::{Record, RecordLayout};
use crate::schema::{FieldDef, FieldKind, Schema};
use crate::store::PagedRecordStore;
use std::path::Path;

const ROOT_SLOT: i64 = 0;

#[derive(Debug)]
struct MetadataRecord {
    root_id: i64,
}

impl Record for MetadataRecord {
    fn to_values(&self) -> Vec<Value> {
        vec![Value::Int(self.root_id)]
    }

    fn from_values(values: Vec<Value>) -> IndexResult<Self> {
        match values.into_iter().next() {
            Some(Value::Int(root_id)) => Ok(MetadataRecord { root_id }),
            _ => Err(IndexError::Decode {
                field: "root_id".to_string(),
                reason: "expected Int".to_string(),
            }),
        }
    }
}

fn metadata_schema() -> Schema {
    Schema::new(vec![FieldDef::new("root_id", FieldKind::Int)])
        .expect("metadata schema has no list fields")
}

#[derive(Debug)]
pub struct Metadata {
    store: PagedRecordStore<MetadataRecord>,
}

impl Metadata {
    pub fn open(path: &Path) -> IndexResult<Self> {
        let layout = RecordLayout::new(metadata_schema());
        Ok(Self {
            store: PagedRecordStore::open(path, layout)?,
        })
    }

    /// `None` on first ever access to the index, before a root has been
    /// created.
    pub fn get_root_id(&self) -> IndexResult<Option<i64>> {
        Ok(self.store.find_by_id(ROOT_SLOT)?.map(|r| r.root_id))
    }

    pub fn set_root_id(&mut self, root_id: i64) -> IndexResult<()> {
        let record = MetadataRecord { root_id };
        if self.store.find_by_id(ROOT_SLOT)?.is_some() {
            self.store.put(ROOT_SLOT, &record)
        } else {
            let slot = self.store.append(&record)?;
            debug_assert_eq!(slot, ROOT_SLOT);
            Ok(())
        }
    }

    pub fn destroy(self) -> IndexResult<()> {
        self.store.destroy()
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;
