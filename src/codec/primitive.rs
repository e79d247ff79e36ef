// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width encoders/decoders for the four primitive field kinds.
//!
//! All multi-byte values use little-endian byte order, chosen once and
//! held constant for the life of a file.

use crate::error::{IndexError, IndexResult};

/// Width in bytes of a signed integer field.
pub const W_I: usize = 8;
/// Width in bytes of a floating-point field.
pub const W_F: usize = 8;
/// Width in bytes of a boolean field.
pub const W_B: usize = 1;
/// Width in bytes of a character field.
pub const W_C: usize = 1;

/// Canonical boolean byte for `true`.
const BOOL_TRUE: u8 = 0x01;
/// Canonical boolean byte for `false`.
const BOOL_FALSE: u8 = 0x00;

pub fn encode_int(value: i64) -> [u8; W_I] {
    value.to_le_bytes()
}

pub fn decode_int(bytes: &[u8]) -> IndexResult<i64> {
    let arr: [u8; W_I] = bytes[..W_I].try_into().map_err(|_| IndexError::Decode {
        field: "<int>".to_string(),
        reason: format!("expected {} bytes, got {}", W_I, bytes.len()),
    })?;
    Ok(i64::from_le_bytes(arr))
}

pub fn encode_float(value: f64) -> [u8; W_F] {
    value.to_le_bytes()
}

pub fn decode_float(bytes: &[u8]) -> IndexResult<f64> {
    let arr: [u8; W_F] = bytes[..W_F].try_into().map_err(|_| IndexError::Decode {
        field: "<float>".to_string(),
        reason: format!("expected {} bytes, got {}", W_F, bytes.len()),
    })?;
    Ok(f64::from_le_bytes(arr))
}

pub fn encode_bool(value: bool) -> [u8; W_B] {
    [if value { BOOL_TRUE } else { BOOL_FALSE }]
}

/// Any nonzero byte decodes as `true`.
pub fn decode_bool(bytes: &[u8]) -> IndexResult<bool> {
    bytes
        .first()
        .map(|b| *b != BOOL_FALSE)
        .ok_or_else(|| IndexError::Decode {
            field: "<bool>".to_string(),
            reason: "empty byte slice".to_string(),
        })
}

/// Encode a single ASCII byte. Callers are responsible for filtering
/// non-ASCII code points before reaching this layer (bounded strings do
/// this in [`crate::codec::composite`]).
pub fn encode_char(value: u8) -> [u8; W_C] {
    [value]
}

pub fn decode_char(bytes: &[u8]) -> IndexResult<u8> {
    bytes.first().copied().ok_or_else(|| IndexError::Decode {
        field: "<char>".to_string(),
        reason: "empty byte slice".to_string(),
    })
}

#[cfg(test)]
#[path = "primitive_test.rs"]
mod primitive_test;
