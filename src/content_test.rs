// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use super::*;

struct Echo;

impl ContentStore<String> for Echo {
    fn get(&self, content_id: i64) -> IndexResult<String> {
        Ok(format!("row-{}", content_id))
    }
}

#[test]
fn resolve_all_without_store_returns_raw_ids() {
    let resolved = Resolved::<String>::resolve_all(vec![1, 2], None).unwrap();
    assert_eq!(resolved, vec![Resolved::ContentId(1), Resolved::ContentId(2)]);
}

#[test]
fn resolve_all_with_store_resolves_rows() {
    let echo = Echo;
    let resolved = Resolved::resolve_all(vec![1, 2], Some(&echo as &dyn ContentStore<String>)).unwrap();
    assert_eq!(
        resolved,
        vec![
            Resolved::Row("row-1".to_string()),
            Resolved::Row("row-2".to_string())
        ]
    );
}

#[test]
fn resolve_one_none_is_none() {
    let resolved = Resolved::<String>::resolve_one(None, None).unwrap();
    assert_eq!(resolved, None);
}
