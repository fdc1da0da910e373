//! Workload builders for cellbuf benchmarks.
//!
//! - [`mixed_values`]: a deterministic mix of every value type
//! - [`int_buffer`]: a rewound buffer of `n` consecutive ints

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cellbuf_buffer::TaggedCellBuffer;
use cellbuf_core::{BinderRef, BufferError, Value};

/// Build `n` values cycling through every variant.
///
/// Strings and byte arrays grow with the index modulo 16 so sizes vary.
pub fn mixed_values(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| match i % 8 {
            0 => Value::Byte(i as i8),
            1 => Value::Int(i as i32),
            2 => Value::Long(i as i64 * 1_000_003),
            3 => Value::Float(i as f32 * 0.5),
            4 => Value::Double(i as f64 / 3.0),
            5 => Value::String(Some("x".repeat(i % 16))),
            6 => Value::ByteArray(vec![i as u8; i % 16]),
            _ => Value::Binder(Some(BinderRef(i as u64))),
        })
        .collect()
}

/// Write `n` ints and rewind to position 0.
pub fn int_buffer(n: u32) -> Result<TaggedCellBuffer, BufferError> {
    let mut buf = TaggedCellBuffer::new();
    for i in 0..n {
        buf.write_int(i as i32)?;
    }
    buf.set_data_position(0)?;
    Ok(buf)
}
