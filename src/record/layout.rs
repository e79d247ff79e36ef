// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Given a schema, compute field offsets and the total byte width of a
//! record; encode/decode a whole record through the codec.
//!
//! `RecordLayout` only turns an in-memory object into the bytes of one
//! record and back — it owns no file handle. [`crate::store::PagedRecordStore`]
//! owns the file and does the `slot_id * record_width` seek math, calling
//! into a layout to encode/decode the bytes of each slot.

use crate::codec::{decode_value, encode_value, W_B};
use crate::error::{IndexError, IndexResult};
use crate::schema::Schema;

/// A type that can be serialized as one record of a [`Schema`].
///
/// Implementors hand back their field values in schema-declared order and
/// rebuild themselves from the same order; `RecordLayout` never inspects
/// field names at runtime.
pub trait Record: Sized {
    fn to_values(&self) -> Vec<crate::codec::Value>;
    fn from_values(values: Vec<crate::codec::Value>) -> IndexResult<Self>;
}

/// Precomputed field offsets and record width for one record type.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    schema: Schema,
}

impl RecordLayout {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Total byte width of one record, existence flag included.
    pub fn record_width(&self) -> usize {
        self.schema.record_width()
    }

    /// Encode `obj` as the bytes of one record: existence=true followed
    /// by each field in schema order at its precomputed offset.
    ///
    /// ## Error Conditions
    /// Returns the first field's `Encode`/type-mismatch error, if any;
    /// `obj` must supply exactly as many values as the schema declares
    /// fields.
    pub fn encode<R: Record>(&self, obj: &R) -> IndexResult<Vec<u8>> {
        let values = obj.to_values();
        if values.len() != self.schema.fields().len() {
            return Err(IndexError::Encode {
                field: "<record>".to_string(),
                reason: format!(
                    "expected {} field values, got {}",
                    self.schema.fields().len(),
                    values.len()
                ),
            });
        }

        let mut buf = vec![0u8; self.record_width()];
        buf[0] = 0x01; // existence flag

        for (field, value) in self.schema.fields().iter().zip(values.iter()) {
            let encoded = encode_value(&field.name, value, &field.kind)?;
            let start = field.offset;
            buf[start..start + encoded.len()].copy_from_slice(&encoded);
        }
        Ok(buf)
    }

    /// Decode one record's bytes (exactly [`Self::record_width`] long).
    /// Returns `None` if the existence flag is clear.
    pub fn decode<R: Record>(&self, bytes: &[u8]) -> IndexResult<Option<R>> {
        if bytes.len() < self.record_width() {
            return Err(IndexError::Decode {
                field: "<record>".to_string(),
                reason: format!(
                    "expected at least {} bytes, got {}",
                    self.record_width(),
                    bytes.len()
                ),
            });
        }
        if bytes[0] == 0 {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            let width = field.kind.byte_width();
            let slice = &bytes[field.offset..field.offset + width];
            values.push(decode_value(&field.name, slice, &field.kind)?);
        }
        R::from_values(values).map(Some)
    }

    /// The single byte written by `delete_record`: existence=false.
    pub fn tombstone_byte() -> [u8; W_B] {
        [0x00]
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
