//! Value fixtures shared by buffer, wire, and registry tests.

use cellbuf_buffer::TaggedCellBuffer;
use cellbuf_core::{BinderRef, BufferError, Value, ValueTag};
use proptest::prelude::*;

/// Write `value` through the typed primitive matching its variant.
///
/// Byte arrays are written whole, with their length prefix.
pub fn write_typed(buf: &mut TaggedCellBuffer, value: &Value) -> Result<(), BufferError> {
    match value {
        Value::Byte(v) => buf.write_byte(*v),
        Value::Int(v) => buf.write_int(*v),
        Value::Long(v) => buf.write_long(*v),
        Value::Float(v) => buf.write_float(*v),
        Value::Double(v) => buf.write_double(*v),
        Value::String(s) => buf.write_string(s.as_deref()),
        Value::ByteArray(bytes) => buf.write_byte_array(Some(bytes), 0, bytes.len() as u32),
        Value::Binder(b) => buf.write_strong_binder(*b),
    }
}

/// Read a value of type `tag` through the matching typed primitive.
///
/// An absent byte array reads back as an empty one.
pub fn read_typed(buf: &mut TaggedCellBuffer, tag: ValueTag) -> Result<Value, BufferError> {
    Ok(match tag {
        ValueTag::Byte => Value::Byte(buf.read_byte()?),
        ValueTag::Int => Value::Int(buf.read_int()?),
        ValueTag::Long => Value::Long(buf.read_long()?),
        ValueTag::Float => Value::Float(buf.read_float()?),
        ValueTag::Double => Value::Double(buf.read_double()?),
        ValueTag::String => Value::String(buf.read_string()?),
        ValueTag::ByteArray => Value::ByteArray(buf.read_byte_array()?.unwrap_or_default()),
        ValueTag::Binder => Value::Binder(buf.read_strong_binder()?),
    })
}

/// One or more values of every variant, including absent and edge values.
pub fn sample_values() -> Vec<Value> {
    vec![
        Value::Byte(-7),
        Value::Int(42),
        Value::Int(i32::MIN),
        Value::Long(-1),
        Value::Long(i64::MAX),
        Value::Float(1.5),
        Value::Float(f32::NAN),
        Value::Double(-0.0),
        Value::Double(std::f64::consts::PI),
        Value::String(Some("hi".into())),
        Value::String(Some(String::new())),
        Value::String(Some("h\u{e9}llo \u{1F600}".into())),
        Value::String(None),
        Value::ByteArray(vec![1, 2, 3, 4, 5]),
        Value::ByteArray(Vec::new()),
        Value::Binder(Some(BinderRef(77))),
        Value::Binder(None),
    ]
}

/// Build a buffer from `values` via typed writes, rewound to position 0.
///
/// # Panics
///
/// Panics if any write fails.
pub fn filled_buffer(values: &[Value]) -> TaggedCellBuffer {
    let mut buf = TaggedCellBuffer::new();
    for value in values {
        write_typed(&mut buf, value).expect("fixture write failed");
    }
    buf.set_data_position(0).expect("fixture rewind failed");
    buf
}

/// Strategy producing arbitrary values of every variant.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i8>().prop_map(Value::Byte),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        any::<f32>().prop_map(Value::Float),
        any::<f64>().prop_map(Value::Double),
        proptest::option::of(".{0,12}").prop_map(Value::String),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Value::ByteArray),
        proptest::option::of(any::<u64>().prop_map(BinderRef)).prop_map(Value::Binder),
    ]
}
