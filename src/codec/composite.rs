// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width encoders/decoders for the two composite field kinds:
//! bounded strings and bounded homogeneous lists.
//!
//! Both composites always advance the cursor by their full reserved
//! width regardless of actual content length, so every record of a
//! schema occupies exactly the same number of bytes.

use super::primitive::{
    decode_bool, decode_char, decode_float, decode_int, encode_bool, encode_char, encode_float,
    encode_int, W_B, W_C, W_F, W_I,
};
use super::Value;
use crate::error::{IndexError, IndexResult};
use crate::schema::FieldKind;

/// Encode a bounded string of declared maximum character count `max_chars`.
///
/// Non-ASCII code points are replaced with a single space before
/// encoding. The encoded form is `max_chars + 1` one-byte character
/// slots: the logical string occupies a prefix of them, the rest
/// (including, explicitly, the final slot) are null.
///
/// Strings longer than `max_chars` are truncated, since record layout
/// only ever calls this with values already validated against the
/// schema.
pub fn encode_string(value: &str, max_chars: usize) -> Vec<u8> {
    let filtered: Vec<u8> = value
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b' ' })
        .take(max_chars)
        .collect();

    let width = (max_chars + 1) * W_C;
    let mut buf = vec![0u8; width];
    buf[..filtered.len()].copy_from_slice(&filtered);
    // Final slot is explicitly the null terminator even when the string
    // fills all max_chars slots.
    buf[max_chars] = 0;
    buf
}

/// Decode a bounded string. Reads characters until the first null byte
/// or `max_chars` characters, whichever comes first; the caller (record
/// layout) is responsible for advancing past the full `(max_chars + 1) *
/// W_C` reserved width.
pub fn decode_string(bytes: &[u8], max_chars: usize) -> String {
    let usable = &bytes[..max_chars.min(bytes.len())];
    let end = usable.iter().position(|&b| b == 0).unwrap_or(usable.len());
    String::from_utf8_lossy(&usable[..end]).into_owned()
}

/// Zero value for a primitive element kind, used to pad unused list
/// slots.
fn zero_value(kind: &FieldKind) -> IndexResult<Value> {
    match kind {
        FieldKind::Int => Ok(Value::Int(0)),
        FieldKind::Float => Ok(Value::Float(0.0)),
        FieldKind::Bool => Ok(Value::Bool(false)),
        FieldKind::Char => Ok(Value::Char(0)),
        FieldKind::String { .. } => Ok(Value::Str(String::new())),
        _ => Err(IndexError::ListElementKindUnsupported {
            field: "<list>".to_string(),
        }),
    }
}

/// Byte width of a single element slot for a list whose declared element
/// kind is `kind`. Only primitives and bounded strings are valid list
/// element kinds — a list of lists is rejected.
fn primitive_width(kind: &FieldKind) -> IndexResult<usize> {
    match kind {
        FieldKind::Int => Ok(W_I),
        FieldKind::Float => Ok(W_F),
        FieldKind::Bool => Ok(W_B),
        FieldKind::Char => Ok(W_C),
        FieldKind::String { max_chars } => Ok((max_chars + 1) * W_C),
        _ => Err(IndexError::ListElementKindUnsupported {
            field: "<list>".to_string(),
        }),
    }
}

fn encode_primitive(value: &Value, kind: &FieldKind) -> IndexResult<Vec<u8>> {
    match (value, kind) {
        (Value::Int(v), FieldKind::Int) => Ok(encode_int(*v).to_vec()),
        (Value::Float(v), FieldKind::Float) => Ok(encode_float(*v).to_vec()),
        (Value::Bool(v), FieldKind::Bool) => Ok(encode_bool(*v).to_vec()),
        (Value::Char(v), FieldKind::Char) => Ok(encode_char(*v).to_vec()),
        (Value::Str(s), FieldKind::String { max_chars }) => Ok(encode_string(s, *max_chars)),
        _ => Err(IndexError::ListElementTypeMismatch {
            field: "<list>".to_string(),
        }),
    }
}

fn decode_primitive(bytes: &[u8], kind: &FieldKind) -> IndexResult<Value> {
    match kind {
        FieldKind::Int => decode_int(bytes).map(Value::Int),
        FieldKind::Float => decode_float(bytes).map(Value::Float),
        FieldKind::Bool => decode_bool(bytes).map(Value::Bool),
        FieldKind::Char => decode_char(bytes).map(Value::Char),
        FieldKind::String { max_chars } => Ok(Value::Str(decode_string(bytes, *max_chars))),
        _ => Err(IndexError::ListElementKindUnsupported {
            field: "<list>".to_string(),
        }),
    }
}

/// Encode a bounded homogeneous list: a `W_I`-width length prefix
/// followed by exactly `max_len` element slots of `element`'s fixed
/// width.
pub fn encode_list(
    field: &str,
    items: &[Value],
    element: &FieldKind,
    max_len: usize,
) -> IndexResult<Vec<u8>> {
    let elem_width = primitive_width(element).map_err(|_| IndexError::ListElementKindUnsupported {
        field: field.to_string(),
    })?;

    if items.len() > max_len {
        return Err(IndexError::ListTooLarge {
            field: field.to_string(),
            max: max_len,
            actual: items.len(),
        });
    }
    for item in items {
        if !item.matches_kind(element) {
            return Err(IndexError::ListElementTypeMismatch {
                field: field.to_string(),
            });
        }
    }

    let mut buf = Vec::with_capacity(W_I + max_len * elem_width);
    buf.extend_from_slice(&encode_int(items.len() as i64));

    let zero = zero_value(element)?;
    for i in 0..max_len {
        let value = items.get(i).unwrap_or(&zero);
        buf.extend_from_slice(&encode_primitive(value, element)?);
    }
    Ok(buf)
}

/// Decode a bounded homogeneous list, advancing through the full
/// reserved width (length prefix plus `max_len` element slots).
pub fn decode_list(
    field: &str,
    bytes: &[u8],
    element: &FieldKind,
    max_len: usize,
) -> IndexResult<Vec<Value>> {
    let elem_width = primitive_width(element).map_err(|_| IndexError::ListElementKindUnsupported {
        field: field.to_string(),
    })?;

    let length = decode_int(&bytes[..W_I])? as usize;
    if length > max_len {
        return Err(IndexError::Decode {
            field: field.to_string(),
            reason: format!(
                "stored list length {} exceeds declared maximum {}",
                length, max_len
            ),
        });
    }

    let mut out = Vec::with_capacity(length);
    let mut offset = W_I;
    for _ in 0..length {
        out.push(decode_primitive(&bytes[offset..offset + elem_width], element)?);
        offset += elem_width;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "composite_test.rs"]
mod composite_test;
