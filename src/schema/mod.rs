// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Explicit schema descriptors, replacing runtime reflection.
//!
//! [`Schema`] is built once per record type and threaded everywhere
//! [`crate::record::RecordLayout`] needs it, the same way a table
//! definition is built once and handed to every validator rather than
//! re-derived per call.

mod types;

pub use types::{FieldDef, FieldKind, Schema};

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
