// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the B-tree index engine.
//!
//! A single flat enum carries every failure the engine can surface, each
//! variant holding the structured context needed to diagnose it without a
//! log line (the crate carries no logging dependency, see the crate root
//! docs).

use std::fmt;
use std::path::PathBuf;

/// Standard `Result` type for all engine operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors surfaced by the codec, record layout, paged store, and B-tree
/// engine.
#[derive(Debug, Clone)]
pub enum IndexError {
    /// A value does not fit the field's declared kind at encode time.
    Encode { field: String, reason: String },

    /// Bytes read from storage are not valid for the field's declared kind.
    Decode { field: String, reason: String },

    /// A list's actual length exceeds its declared maximum at encode time.
    ListTooLarge {
        field: String,
        max: usize,
        actual: usize,
    },

    /// An element's kind differs from the list's declared element kind.
    ListElementTypeMismatch { field: String },

    /// A list's declared element kind is not among the supported
    /// primitives.
    ListElementKindUnsupported { field: String },

    /// A complex value reached a code path expecting a primitive, or vice
    /// versa.
    NonPrimitiveAsPrimitive { field: String },

    /// A `find_by_id` target does not exist where the engine's own
    /// invariants require it to (e.g. a child id read from a live parent).
    MissingRecord { slot_id: i64 },

    /// A structural invariant was violated by data read back from disk.
    IndexCorrupt { reason: String },

    /// A field kind is unsupported in its position (e.g. a list of lists,
    /// or a list of bounded strings outside a schema that also declares
    /// their per-element max length).
    UnsupportedFieldKind { field: String },

    /// The branching factor supplied to `TreeConfig` is too small to form
    /// a valid B-tree (must allow at least one key per node).
    InvalidBranchingFactor { b: u16 },

    /// The index's write lock is already held by another handle.
    LockHeld { path: PathBuf },

    /// An I/O error occurred against the backing files.
    Io { operation: String, reason: String },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { field, reason } => {
                write!(f, "failed to encode field '{}': {}", field, reason)
            }
            Self::Decode { field, reason } => {
                write!(f, "failed to decode field '{}': {}", field, reason)
            }
            Self::ListTooLarge { field, max, actual } => write!(
                f,
                "list field '{}' has {} elements, exceeds declared maximum {}",
                field, actual, max
            ),
            Self::ListElementTypeMismatch { field } => {
                write!(f, "element kind mismatch in list field '{}'", field)
            }
            Self::ListElementKindUnsupported { field } => write!(
                f,
                "list field '{}' declares an unsupported element kind",
                field
            ),
            Self::NonPrimitiveAsPrimitive { field } => write!(
                f,
                "field '{}' reached a code path expecting the opposite primitivity",
                field
            ),
            Self::MissingRecord { slot_id } => {
                write!(f, "record at slot {} is missing", slot_id)
            }
            Self::IndexCorrupt { reason } => write!(f, "index corrupt: {}", reason),
            Self::UnsupportedFieldKind { field } => {
                write!(f, "field '{}' has an unsupported kind for its position", field)
            }
            Self::InvalidBranchingFactor { b } => write!(
                f,
                "branching factor {} is too small (must be >= 3)",
                b
            ),
            Self::LockHeld { path } => {
                write!(f, "index at '{}' is locked by another writer", path.display())
            }
            Self::Io { operation, reason } => {
                write!(f, "I/O error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for IndexError {}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::Io {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
