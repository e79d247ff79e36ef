// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::IndexError;

#[test]
fn offsets_accumulate_after_existence_flag() {
    let schema = Schema::new(vec![
        FieldDef::new("a", FieldKind::Int),
        FieldDef::new("b", FieldKind::Bool),
    ])
    .unwrap();

    assert_eq!(schema.field("a").unwrap().offset, 1);
    assert_eq!(schema.field("b").unwrap().offset, 1 + 8);
    assert_eq!(schema.record_width(), 1 + 8 + 1);
}

#[test]
fn string_width_includes_terminator_slot() {
    let schema = Schema::new(vec![FieldDef::new(
        "name",
        FieldKind::String { max_chars: 10 },
    )])
    .unwrap();
    assert_eq!(schema.field("name").unwrap().kind.byte_width(), 11);
}

#[test]
fn list_of_primitives_is_accepted() {
    let schema = Schema::new(vec![FieldDef::new(
        "children",
        FieldKind::list_of(FieldKind::Int, 4),
    )])
    .unwrap();
    assert_eq!(schema.fields().len(), 1);
}

#[test]
fn list_of_strings_is_accepted() {
    let schema = Schema::new(vec![FieldDef::new(
        "tags",
        FieldKind::list_of(FieldKind::String { max_chars: 3 }, 2),
    )]);
    assert!(schema.is_ok());
}

#[test]
fn list_of_lists_is_rejected() {
    let nested = FieldKind::list_of(FieldKind::Int, 2);
    let err = Schema::new(vec![FieldDef::new("bad", FieldKind::list_of(nested, 2))]).unwrap_err();
    assert!(matches!(err, IndexError::UnsupportedFieldKind { .. }));
}

#[test]
fn unknown_field_lookup_returns_none() {
    let schema = Schema::new(vec![FieldDef::new("a", FieldKind::Int)]).unwrap();
    assert!(schema.field("missing").is_none());
}
