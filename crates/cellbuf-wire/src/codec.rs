//! Binary encode/decode for marshalled buffers.
//!
//! All integers are little-endian. A marshalled buffer is a `u32` entry
//! count followed by one entry per cell: `u32` aligned size, `u8` value tag,
//! then the value payload. Absent strings and binders carry a presence byte.

use std::io::{Read, Write};

use cellbuf_core::{BinderRef, Cell, Value, ValueTag};

use crate::error::WireError;

/// Tag for [`Value::Byte`].
pub const TAG_BYTE: u8 = 0;
/// Tag for [`Value::Int`].
pub const TAG_INT: u8 = 1;
/// Tag for [`Value::Long`].
pub const TAG_LONG: u8 = 2;
/// Tag for [`Value::Float`].
pub const TAG_FLOAT: u8 = 3;
/// Tag for [`Value::Double`].
pub const TAG_DOUBLE: u8 = 4;
/// Tag for [`Value::String`].
pub const TAG_STRING: u8 = 5;
/// Tag for [`Value::ByteArray`].
pub const TAG_BYTE_ARRAY: u8 = 6;
/// Tag for [`Value::Binder`].
pub const TAG_BINDER: u8 = 7;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// Wire tag for a value type.
pub fn tag_byte(tag: ValueTag) -> u8 {
    match tag {
        ValueTag::Byte => TAG_BYTE,
        ValueTag::Int => TAG_INT,
        ValueTag::Long => TAG_LONG,
        ValueTag::Float => TAG_FLOAT,
        ValueTag::Double => TAG_DOUBLE,
        ValueTag::String => TAG_STRING,
        ValueTag::ByteArray => TAG_BYTE_ARRAY,
        ValueTag::Binder => TAG_BINDER,
    }
}

/// Value type for a wire tag.
pub fn value_tag(tag: u8) -> Result<ValueTag, WireError> {
    Ok(match tag {
        TAG_BYTE => ValueTag::Byte,
        TAG_INT => ValueTag::Int,
        TAG_LONG => ValueTag::Long,
        TAG_FLOAT => ValueTag::Float,
        TAG_DOUBLE => ValueTag::Double,
        TAG_STRING => ValueTag::String,
        TAG_BYTE_ARRAY => ValueTag::ByteArray,
        TAG_BINDER => ValueTag::Binder,
        other => return Err(WireError::UnknownValueTag { tag: other }),
    })
}

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), WireError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), WireError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), WireError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed byte array (u32 length + bytes).
pub fn write_length_prefixed_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), WireError> {
    let len = u32::try_from(b.len())
        .map_err(|_| WireError::malformed(format!("payload of {} bytes is too long", b.len())))?;
    write_u32_le(w, len)?;
    w.write_all(b)?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, WireError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, WireError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, WireError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_array<const N: usize>(r: &mut dyn Read) -> Result<[u8; N], WireError> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a length-prefixed byte array.
///
/// The declared length is not trusted for allocation; a prefix longer than
/// the remaining input fails as truncated.
pub fn read_length_prefixed_bytes(r: &mut dyn Read) -> Result<Vec<u8>, WireError> {
    let len = read_u32_le(r)?;
    let mut buf = Vec::new();
    r.take(u64::from(len)).read_to_end(&mut buf)?;
    if buf.len() as u64 != u64::from(len) {
        return Err(WireError::malformed(format!(
            "length prefix {len} exceeds remaining input of {} bytes",
            buf.len()
        )));
    }
    Ok(buf)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, WireError> {
    let bytes = read_length_prefixed_bytes(r)?;
    String::from_utf8(bytes)
        .map_err(|e| WireError::malformed(format!("invalid UTF-8 string: {e}")))
}

fn read_presence(r: &mut dyn Read) -> Result<bool, WireError> {
    match read_u8(r)? {
        ABSENT => Ok(false),
        PRESENT => Ok(true),
        other => Err(WireError::malformed(format!("invalid presence flag {other}"))),
    }
}

// ── Value encode/decode ─────────────────────────────────────────

/// Encode a value payload (without its tag).
pub fn encode_value(w: &mut dyn Write, value: &Value) -> Result<(), WireError> {
    match value {
        Value::Byte(v) => w.write_all(&v.to_le_bytes())?,
        Value::Int(v) => w.write_all(&v.to_le_bytes())?,
        Value::Long(v) => w.write_all(&v.to_le_bytes())?,
        Value::Float(v) => w.write_all(&v.to_le_bytes())?,
        Value::Double(v) => w.write_all(&v.to_le_bytes())?,
        Value::String(None) => write_u8(w, ABSENT)?,
        Value::String(Some(s)) => {
            write_u8(w, PRESENT)?;
            write_length_prefixed_bytes(w, s.as_bytes())?;
        }
        Value::ByteArray(bytes) => write_length_prefixed_bytes(w, bytes)?,
        Value::Binder(None) => write_u8(w, ABSENT)?,
        Value::Binder(Some(binder)) => {
            write_u8(w, PRESENT)?;
            write_u64_le(w, binder.0)?;
        }
    }
    Ok(())
}

/// Decode a value payload of the given type.
pub fn decode_value(r: &mut dyn Read, tag: ValueTag) -> Result<Value, WireError> {
    Ok(match tag {
        ValueTag::Byte => Value::Byte(i8::from_le_bytes(read_array(r)?)),
        ValueTag::Int => Value::Int(i32::from_le_bytes(read_array(r)?)),
        ValueTag::Long => Value::Long(i64::from_le_bytes(read_array(r)?)),
        ValueTag::Float => Value::Float(f32::from_le_bytes(read_array(r)?)),
        ValueTag::Double => Value::Double(f64::from_le_bytes(read_array(r)?)),
        ValueTag::String => Value::String(if read_presence(r)? {
            Some(read_length_prefixed_str(r)?)
        } else {
            None
        }),
        ValueTag::ByteArray => Value::ByteArray(read_length_prefixed_bytes(r)?),
        ValueTag::Binder => Value::Binder(if read_presence(r)? {
            Some(BinderRef(read_u64_le(r)?))
        } else {
            None
        }),
    })
}

// ── Entry encode/decode ─────────────────────────────────────────

/// Encode one cell: size, tag, payload.
pub fn encode_entry(w: &mut dyn Write, cell: &Cell) -> Result<(), WireError> {
    write_u32_le(w, cell.size_bytes())?;
    write_u8(w, tag_byte(cell.value().tag()))?;
    encode_value(w, cell.value())
}

/// Decode one cell. Sizes that are zero or not a multiple of 4 are rejected.
pub fn decode_entry(r: &mut dyn Read) -> Result<Cell, WireError> {
    let size_bytes = read_u32_le(r)?;
    if size_bytes == 0 {
        return Err(WireError::malformed("cell size 0 covers no slots"));
    }
    if size_bytes % 4 != 0 {
        return Err(WireError::malformed(format!(
            "cell size {size_bytes} is not 4-byte aligned"
        )));
    }
    let tag = value_tag(read_u8(r)?)?;
    let value = decode_value(r, tag)?;
    Ok(Cell::new(size_bytes, value))
}

/// Encode an entry count followed by every cell.
pub fn encode_entries(w: &mut dyn Write, cells: &[&Cell]) -> Result<(), WireError> {
    let count = u32::try_from(cells.len())
        .map_err(|_| WireError::malformed(format!("{} entries do not fit a u32 count", cells.len())))?;
    write_u32_le(w, count)?;
    for cell in cells {
        encode_entry(w, cell)?;
    }
    Ok(())
}

/// Decode an entry count followed by that many cells.
pub fn decode_entries(r: &mut dyn Read) -> Result<Vec<Cell>, WireError> {
    let count = read_u32_le(r)?;
    // Every entry takes at least five bytes, so cap the preallocation.
    let mut cells = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        cells.push(decode_entry(r)?);
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        encode_value(&mut out, value).unwrap();
        out
    }

    #[test]
    fn int_payload_is_little_endian() {
        assert_eq!(encoded(&Value::Int(0x0102_0304)), vec![4, 3, 2, 1]);
    }

    #[test]
    fn absent_string_is_single_flag_byte() {
        assert_eq!(encoded(&Value::String(None)), vec![ABSENT]);
    }

    #[test]
    fn present_string_layout() {
        assert_eq!(
            encoded(&Value::String(Some("hi".into()))),
            vec![PRESENT, 2, 0, 0, 0, b'h', b'i']
        );
    }

    #[test]
    fn binder_layout() {
        assert_eq!(
            encoded(&Value::Binder(Some(BinderRef(9)))),
            vec![PRESENT, 9, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn every_tag_maps_both_ways() {
        for tag in [
            ValueTag::Byte,
            ValueTag::Int,
            ValueTag::Long,
            ValueTag::Float,
            ValueTag::Double,
            ValueTag::String,
            ValueTag::ByteArray,
            ValueTag::Binder,
        ] {
            assert_eq!(value_tag(tag_byte(tag)).unwrap(), tag);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        let bytes = [4, 0, 0, 0, 42];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, WireError::UnknownValueTag { tag: 42 }));
    }

    #[test]
    fn unaligned_size_rejected() {
        let bytes = [5, 0, 0, 0, TAG_INT, 1, 0, 0, 0];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, WireError::MalformedEntry { .. }));
    }

    #[test]
    fn zero_size_rejected() {
        let bytes = [0, 0, 0, 0, TAG_INT, 7, 0, 0, 0];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        match err {
            WireError::MalformedEntry { detail } => assert!(detail.contains("size 0")),
            other => panic!("expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn bad_presence_flag_rejected() {
        let bytes = [4, 0, 0, 0, TAG_STRING, 7];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        match err {
            WireError::MalformedEntry { detail } => assert!(detail.contains("presence flag 7")),
            other => panic!("expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_rejected() {
        let bytes = [8, 0, 0, 0, TAG_STRING, PRESENT, 2, 0, 0, 0, 0xff, 0xfe];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        match err {
            WireError::MalformedEntry { detail } => assert!(detail.contains("UTF-8")),
            other => panic!("expected MalformedEntry, got {other:?}"),
        }
    }

    #[test]
    fn oversized_length_prefix_does_not_allocate() {
        let bytes = [8, 0, 0, 0, TAG_BYTE_ARRAY, 0xff, 0xff, 0xff, 0xff, 1, 2];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, WireError::MalformedEntry { .. }));
    }

    #[test]
    fn truncated_int_is_io_error() {
        let bytes = [4, 0, 0, 0, TAG_INT, 1, 2];
        let err = decode_entry(&mut Cursor::new(&bytes[..])).unwrap_err();
        match err {
            WireError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn entries_round_trip() {
        let a = Cell::new(4, Value::Int(-3));
        let b = Cell::new(8, Value::String(Some("hi".into())));
        let mut out = Vec::new();
        encode_entries(&mut out, &[&a, &b]).unwrap();
        let cells = decode_entries(&mut Cursor::new(&out)).unwrap();
        assert_eq!(cells, vec![a, b]);
    }
}
