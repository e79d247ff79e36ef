// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Disk-backed B-tree index engine.
//!
//! Maps ordered keys to one or more opaque content-ids, persisting
//! every node in a fixed-width binary file. The engine is the sole
//! writer of its directory (single-writer, single-process) and owns no
//! process-wide state: every [`TreeConfig`] produces an independent
//! [`BTreeIndex`] instance with its own file handles, acquired on
//! [`BTreeIndex::open`] and released on drop.
//!
//! Row storage, schema discovery, CLI surfaces, and configuration-file
//! formats are out of scope — the engine consumes a [`ContentStore`] for
//! the first and an explicit [`codec::Value`]/[`schema::Schema`] pair
//! for the rest, never reflection.

pub mod codec;
pub mod content;
pub mod error;
pub mod record;
pub mod schema;
pub mod store;
pub mod tree;

pub use content::{ContentStore, Resolved};
pub use error::{IndexError, IndexResult};
pub use tree::{BTreeIndex, TreeConfig};
