//! Record decoding driven by per-table pack-format descriptors.
//!
//! Each data table (country, region, city) carries a format string in the
//! database header describing how its records are laid out, e.g.
//! `"T:id/c2:iso/b:name"`. A descriptor is an ordered list of
//! `code:field_name` pairs joined by `/`. The string is parsed once at open
//! time into a [`PackFormat`]; decoding a record is then a single pass over
//! the byte span with a cursor, no re-parsing per lookup.
//!
//! Multi-byte integers inside records are little-endian, unlike the
//! big-endian header and index sections.

use crate::error::{GeoError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Decoded value of a single record field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer (biased byte, 16-bit and biased 24-bit codes)
    Int(i64),
    /// Unsigned integer (unsigned byte, 16-bit, 24-bit and fallback codes)
    Uint(u64),
    /// IEEE-754 double
    Double(f64),
    /// UTF-8 string (NUL-terminated or fixed-width)
    String(String),
}

impl Value {
    /// View the value as an unsigned integer, if it is one
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            Value::Int(n) if *n >= 0 => Some(*n as u64),
            _ => None,
        }
    }

    /// View the value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A decoded record: field name to value
pub type GeoRecord = HashMap<String, Value>;

/// Field type codes understood by the unpacker
///
/// Anything not listed decodes as [`FieldKind::Uint32`], the 4-byte
/// fallback. That keeps readers working against databases built with a
/// newer code set: unknown fields still advance the cursor correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `t` - byte biased by -128, signed result
    Int8Biased,
    /// `T` - unsigned byte
    Uint8,
    /// `s` - signed 16-bit
    Int16,
    /// `S` - unsigned 16-bit
    Uint16,
    /// `m` - 24-bit biased by -8388608, signed result
    Int24Biased,
    /// `M` - unsigned 24-bit
    Uint24,
    /// `d` - IEEE-754 double
    Double,
    /// `b` - NUL-terminated string
    StringNul,
    /// `cN` - fixed string of exactly N bytes
    StringFixed(usize),
    /// fallback - unsigned 32-bit
    Uint32,
}

impl FieldKind {
    fn from_code(code: &str) -> Result<Self> {
        if code.is_empty() {
            return Err(GeoError::BadDescriptor("empty type code".to_string()));
        }
        if let Some(digits) = code.strip_prefix('c') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let n: usize = digits
                    .parse()
                    .map_err(|_| GeoError::BadDescriptor(format!("bad char width in {:?}", code)))?;
                return Ok(FieldKind::StringFixed(n));
            }
        }
        Ok(match code {
            "t" => FieldKind::Int8Biased,
            "T" => FieldKind::Uint8,
            "s" => FieldKind::Int16,
            "S" => FieldKind::Uint16,
            "m" => FieldKind::Int24Biased,
            "M" => FieldKind::Uint24,
            "d" => FieldKind::Double,
            "b" => FieldKind::StringNul,
            _ => FieldKind::Uint32,
        })
    }

    /// Fixed decoded width in bytes, or `None` for NUL-terminated strings
    pub fn width(&self) -> Option<usize> {
        match self {
            FieldKind::Int8Biased | FieldKind::Uint8 => Some(1),
            FieldKind::Int16 | FieldKind::Uint16 => Some(2),
            FieldKind::Int24Biased | FieldKind::Uint24 => Some(3),
            FieldKind::Double => Some(8),
            FieldKind::StringNul => None,
            FieldKind::StringFixed(n) => Some(*n),
            FieldKind::Uint32 => Some(4),
        }
    }
}

/// One field of a pack-format descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct PackField {
    /// Decoding rule for this field
    pub kind: FieldKind,
    /// Field name used as the record map key
    pub name: String,
}

/// Parsed pack-format descriptor for one data table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackFormat {
    fields: Vec<PackField>,
}

impl PackFormat {
    /// Parse a `/`-joined descriptor string of `code:name` fields
    ///
    /// An empty string parses to an empty format (a table the database
    /// does not populate). Anything else must be well-formed.
    pub fn parse(descriptor: &str) -> Result<Self> {
        if descriptor.is_empty() {
            return Ok(Self::default());
        }
        let mut fields = Vec::new();
        for part in descriptor.split('/') {
            let (code, name) = part.split_once(':').ok_or_else(|| {
                GeoError::BadDescriptor(format!("field {:?} is not code:name", part))
            })?;
            if name.is_empty() {
                return Err(GeoError::BadDescriptor(format!(
                    "field {:?} has an empty name",
                    part
                )));
            }
            fields.push(PackField {
                kind: FieldKind::from_code(code)?,
                name: name.to_string(),
            });
        }
        Ok(Self { fields })
    }

    /// Number of fields in the descriptor
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the descriptor has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The parsed field list, in record order
    pub fn fields(&self) -> &[PackField] {
        &self.fields
    }

    /// Decode a record byte span into named fields
    ///
    /// Walks the span left to right, advancing a cursor by each field's
    /// width. Fails with [`GeoError::Truncated`] if a field would read
    /// past the end of the span. Trailing bytes beyond the last field are
    /// ignored; records are padded up to the table's max record size.
    pub fn unpack(&self, span: &[u8]) -> Result<GeoRecord> {
        let mut record = HashMap::with_capacity(self.fields.len());
        let mut cursor = 0usize;

        for field in &self.fields {
            let (value, width) = decode_field(field.kind, span, cursor)?;
            record.insert(field.name.clone(), value);
            cursor += width;
        }
        Ok(record)
    }
}

fn take<'a>(span: &'a [u8], cursor: usize, width: usize) -> Result<&'a [u8]> {
    if cursor + width > span.len() {
        return Err(GeoError::Truncated {
            what: "record field",
            offset: cursor,
        });
    }
    Ok(&span[cursor..cursor + width])
}

fn decode_field(kind: FieldKind, span: &[u8], cursor: usize) -> Result<(Value, usize)> {
    let value = match kind {
        FieldKind::Int8Biased => {
            let b = take(span, cursor, 1)?[0];
            Value::Int(b as i64 - 128)
        }
        FieldKind::Uint8 => Value::Uint(take(span, cursor, 1)?[0] as u64),
        FieldKind::Int16 => {
            let b = take(span, cursor, 2)?;
            Value::Int(i16::from_le_bytes([b[0], b[1]]) as i64)
        }
        FieldKind::Uint16 => {
            let b = take(span, cursor, 2)?;
            Value::Uint(u16::from_le_bytes([b[0], b[1]]) as u64)
        }
        FieldKind::Int24Biased => {
            let b = take(span, cursor, 3)?;
            let raw = u32::from_le_bytes([b[0], b[1], b[2], 0]);
            Value::Int(raw as i64 - 8_388_608)
        }
        FieldKind::Uint24 => {
            let b = take(span, cursor, 3)?;
            Value::Uint(u32::from_le_bytes([b[0], b[1], b[2], 0]) as u64)
        }
        FieldKind::Double => {
            let b = take(span, cursor, 8)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(b);
            Value::Double(f64::from_le_bytes(raw))
        }
        FieldKind::StringNul => {
            let rest = &span[cursor.min(span.len())..];
            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or(GeoError::Truncated {
                    what: "record field",
                    offset: cursor,
                })?;
            let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
            // width covers the terminator
            return Ok((Value::String(s), nul + 1));
        }
        FieldKind::StringFixed(n) => {
            let b = take(span, cursor, n)?;
            Value::String(String::from_utf8_lossy(b).into_owned())
        }
        FieldKind::Uint32 => {
            let b = take(span, cursor, 4)?;
            Value::Uint(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as u64)
        }
    };
    // width() is Some for every kind that reaches here
    Ok((value, kind.width().unwrap_or(0)))
}
