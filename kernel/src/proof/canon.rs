//! Canonical JSON bytes for hashing and artifact persistence.
//!
//! Rules:
//!
//! 1. Object keys sorted by byte order.
//! 2. Compact form, no whitespace.
//! 3. Strings escaped per RFC 8259.
//! 4. Numbers must be integers. Floating-point quantities (scores, bumps)
//!    go through [`f64_value`], which carries the IEEE-754 bit pattern as
//!    hex so the bytes never depend on float formatting.

use std::io::Write;

use serde_json::Value;

/// Canonicalization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    /// A JSON number was not an integer.
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
}

/// Canonical JSON bytes of `value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number in the tree is not
/// an `i64` or `u64`.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, CanonError> {
    let mut buf = Vec::new();
    emit(&mut buf, value)?;
    Ok(buf)
}

fn emit(buf: &mut Vec<u8>, value: &Value) -> Result<(), CanonError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                let _ = write!(buf, "{i}");
            } else if let Some(u) = n.as_u64() {
                let _ = write!(buf, "{u}");
            } else {
                return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
            }
        }
        Value::String(s) => emit_str(buf, s),
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                emit(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            buf.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                emit_str(buf, key);
                buf.push(b':');
                emit(buf, item)?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

fn emit_str(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(buf, "\\u{:04x}", u32::from(c));
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Float as `{"bits": "<16 hex digits>", "approx": "<decimal>"}`.
///
/// `bits` is normative; `approx` is for humans and never parsed back.
#[must_use]
pub fn f64_value(x: f64) -> Value {
    serde_json::json!({
        "approx": format!("{x:.6}"),
        "bits": format!("{:016x}", x.to_bits()),
    })
}

/// Inverse of [`f64_value`], reading the `bits` field only.
#[must_use]
pub fn f64_from_value(value: &Value) -> Option<f64> {
    let bits = value.get("bits")?.as_str()?;
    u64::from_str_radix(bits, 16).ok().map(f64::from_bits)
}
