// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width record serialization on top of a [`crate::schema::Schema`].

mod layout;

pub use layout::{Record, RecordLayout};
