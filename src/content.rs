// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The external row store the engine resolves content-ids through.
//!
//! Out of scope for this crate (the embedding application owns row
//! storage); only the interface the engine consumes is defined here.

use crate::error::IndexResult;

/// Resolves an opaque content-id into the caller's row type.
pub trait ContentStore<Row> {
    fn get(&self, content_id: i64) -> IndexResult<Row>;
}

/// A value resolved through the tree: either the caller's row (when a
/// [`ContentStore`] was supplied) or the raw content-id (when it was
/// not), matching the contract's "rows (or content-ids if no Content
/// Store)".
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<Row> {
    Row(Row),
    ContentId(i64),
}

impl<Row> Resolved<Row> {
    fn from_id(id: i64, store: Option<&dyn ContentStore<Row>>) -> IndexResult<Self> {
        match store {
            Some(store) => store.get(id).map(Resolved::Row),
            None => Ok(Resolved::ContentId(id)),
        }
    }

    pub(crate) fn resolve_all(
        ids: Vec<i64>,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Vec<Self>> {
        ids.into_iter().map(|id| Self::from_id(id, store)).collect()
    }

    pub(crate) fn resolve_one(
        id: Option<i64>,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Option<Self>> {
        id.map(|id| Self::from_id(id, store)).transpose()
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;
