// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Field kind and schema value types.

use crate::codec::{W_B, W_C, W_F, W_I};
use crate::error::{IndexError, IndexResult};

/// Declared kind of a single schema field.
///
/// A tagged variant rather than runtime reflection. `Char` is split out
/// from `Bool` because a node's key-kind may itself be a character
/// field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Char,
    /// Bounded string with a declared maximum character count.
    String { max_chars: usize },
    /// Bounded homogeneous list. `element` must be a primitive
    /// (`Int`/`Float`/`Bool`/`Char`) or a bounded `String` — a list of
    /// lists is rejected at [`Schema::new`] time.
    List {
        element: Box<FieldKind>,
        max_len: usize,
    },
}

impl FieldKind {
    /// Convenience constructor for a primitive-element list.
    pub fn list_of(element: FieldKind, max_len: usize) -> FieldKind {
        FieldKind::List {
            element: Box::new(element),
            max_len,
        }
    }

    /// `true` if this kind is valid as a list's element kind. Lists of
    /// strings are permitted only where the schema also gives a
    /// per-element max character count.
    fn is_valid_list_element(&self) -> bool {
        matches!(
            self,
            FieldKind::Int | FieldKind::Float | FieldKind::Bool | FieldKind::Char | FieldKind::String { .. }
        )
    }

    /// Fixed byte width this field occupies on disk.
    pub fn byte_width(&self) -> usize {
        match self {
            FieldKind::Int => W_I,
            FieldKind::Float => W_F,
            FieldKind::Bool => W_B,
            FieldKind::Char => W_C,
            FieldKind::String { max_chars } => (max_chars + 1) * W_C,
            FieldKind::List { element, max_len } => W_I + max_len * element.byte_width(),
        }
    }
}

/// A single field's name, kind, and (derived, by [`Schema::new`]) byte
/// offset within the record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    /// Byte offset relative to the start of the record's field section
    /// (i.e. *after* the leading existence flag). Computed by
    /// [`Schema::new`]; `0` until then.
    pub(crate) offset: usize,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            offset: 0,
        }
    }
}

/// An ordered list of field descriptors plus the derived per-field
/// offsets and total record width.
///
/// Built once per record type (e.g. once for the B-tree's node record,
/// once for its single-record metadata) and passed by reference
/// wherever [`crate::record::RecordLayout`] needs it — there is no
/// hidden process-wide schema registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
    /// Total record width in bytes, including the leading existence flag.
    record_width: usize,
}

impl Schema {
    /// Validate `fields` and compute offsets / total width.
    ///
    /// ## Error Conditions
    /// - A list field declares an element kind that is itself a list
    ///   (`UnsupportedFieldKind`).
    pub fn new(fields: Vec<FieldDef>) -> IndexResult<Self> {
        let mut offset = W_B; // leading existence flag
        let mut resolved = Vec::with_capacity(fields.len());
        for mut field in fields {
            if let FieldKind::List { element, .. } = &field.kind {
                if !element.is_valid_list_element() {
                    return Err(IndexError::UnsupportedFieldKind { field: field.name });
                }
            }
            field.offset = offset;
            offset += field.kind.byte_width();
            resolved.push(field);
        }
        Ok(Self {
            fields: resolved,
            record_width: offset,
        })
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total byte width of one record of this schema, existence flag
    /// included.
    pub fn record_width(&self) -> usize {
        self.record_width
    }
}
