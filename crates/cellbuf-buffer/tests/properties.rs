//! Property tests over arbitrary write/read sequences.

use cellbuf_buffer::TaggedCellBuffer;
use cellbuf_core::{align, BufferError, Value};
use cellbuf_test_utils::{arb_value, filled_buffer, read_typed, sample_values, write_typed};
use proptest::prelude::*;

#[test]
fn every_sample_value_round_trips() {
    for value in sample_values() {
        let mut buf = filled_buffer(std::slice::from_ref(&value));
        let read = read_typed(&mut buf, value.tag()).unwrap();
        assert!(read.bit_eq(&value), "{value:?} read back as {read:?}");
        assert_eq!(buf.data_position(), buf.data_size());
    }
}

#[derive(Clone, Debug)]
enum Op {
    WriteInt(i32),
    WriteLong(i64),
    WriteBytes(Vec<u8>),
    SetPosition(u32),
    SetSize(u32),
    SetCapacity(u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::WriteInt),
        any::<i64>().prop_map(Op::WriteLong),
        proptest::collection::vec(any::<u8>(), 0..40).prop_map(Op::WriteBytes),
        (0u32..128).prop_map(Op::SetPosition),
        (0u32..128).prop_map(Op::SetSize),
        (0u32..256).prop_map(Op::SetCapacity),
    ]
}

proptest! {
    #[test]
    fn write_then_rewind_reads_same_values(values in proptest::collection::vec(arb_value(), 0..24)) {
        let mut buf = filled_buffer(&values);
        for value in &values {
            let read = read_typed(&mut buf, value.tag()).unwrap();
            prop_assert!(read.bit_eq(value), "{:?} != {:?}", read, value);
        }
        prop_assert_eq!(buf.data_position(), buf.data_size());
    }

    #[test]
    fn position_advances_by_aligned_size(sizes in proptest::collection::vec(0u32..64, 1..16)) {
        let mut buf = TaggedCellBuffer::new();
        for size in sizes {
            let before = buf.data_position();
            buf.write_value(size, Value::ByteArray(vec![0; size as usize])).unwrap();
            prop_assert_eq!(buf.data_position() - before, align(size));
            prop_assert_eq!(buf.data_position() % 4, 0);
        }
    }

    #[test]
    fn capacity_is_monotonic_and_invariants_hold(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let mut buf = TaggedCellBuffer::new();
        let mut last_capacity = 0;
        for op in ops {
            let end_before = buf.data_position();
            let result = match &op {
                Op::WriteInt(v) => buf.write_int(*v),
                Op::WriteLong(v) => buf.write_long(*v),
                Op::WriteBytes(b) => buf.write_byte_array(Some(b), 0, b.len() as u32),
                Op::SetPosition(p) => buf.set_data_position(*p),
                Op::SetSize(s) => buf.set_data_size(*s),
                Op::SetCapacity(c) => buf.set_data_capacity_at_least(*c),
            };
            match (&op, result) {
                (Op::SetPosition(p), Err(e)) => {
                    prop_assert!(*p > buf.data_size());
                    let is_oob = matches!(e, BufferError::OutOfBounds { .. });
                    prop_assert!(is_oob);
                }
                (_, Err(e)) => prop_assert!(false, "unexpected error {e}"),
                (Op::WriteInt(_), Ok(())) => {
                    prop_assert!(buf.data_capacity() >= end_before + 4);
                }
                _ => {}
            }
            prop_assert!(buf.data_capacity() >= last_capacity);
            prop_assert!(buf.data_position() <= buf.data_size());
            prop_assert!(buf.data_size() <= buf.data_capacity());
            last_capacity = buf.data_capacity();
        }
    }

    #[test]
    fn truncation_leaves_no_stale_data(count in 1u32..16, keep in 0u32..16) {
        let keep = keep.min(count);
        let mut buf = TaggedCellBuffer::new();
        for i in 0..count {
            buf.write_int(i as i32).unwrap();
        }
        buf.set_data_size(keep * 4).unwrap();
        buf.set_data_size(count * 4).unwrap();
        for i in keep..count {
            buf.set_data_position(i * 4).unwrap();
            prop_assert_eq!(
                buf.read_int(),
                Err(BufferError::UninitializedRead { position: i * 4 })
            );
        }
        buf.set_data_position(0).unwrap();
        for i in 0..keep {
            prop_assert_eq!(buf.read_int().unwrap(), i as i32);
        }
    }

    #[test]
    fn append_requires_cursor_at_end(prefix in 1u32..8, rewind in 0u32..8) {
        let src = filled_buffer(&[Value::Int(1), Value::Long(2)]);
        let mut dest = TaggedCellBuffer::new();
        for i in 0..prefix {
            dest.write_int(i as i32).unwrap();
        }
        let rewind = rewind.min(prefix) * 4;
        dest.set_data_position(dest.data_size() - rewind).unwrap();
        let result = dest.append_from(&src, 0, 12);
        if rewind == 0 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(dest.data_position(), dest.data_size());
            prop_assert_eq!(dest.data_size(), prefix * 4 + 12);
        } else {
            let not_at_end = matches!(result, Err(BufferError::AppendNotAtEnd { .. }));
            prop_assert!(not_at_end);
        }
    }
}

#[test]
fn typed_dispatch_covers_every_variant() {
    let mut buf = TaggedCellBuffer::new();
    for value in sample_values() {
        write_typed(&mut buf, &value).unwrap();
    }
    buf.set_data_position(0).unwrap();
    for value in sample_values() {
        assert!(read_typed(&mut buf, value.tag()).unwrap().bit_eq(&value));
    }
}
