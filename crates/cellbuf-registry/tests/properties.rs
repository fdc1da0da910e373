//! Random value sequences driven through registry handles.

use cellbuf_core::Value;
use cellbuf_registry::HandleRegistry;
use cellbuf_test_utils::{arb_value, read_typed, write_typed};
use proptest::prelude::*;

fn write_all(reg: &HandleRegistry, values: &[Value]) -> cellbuf_core::BufferHandle {
    let h = reg.create().unwrap();
    for value in values {
        reg.with_buffer(h, |buf| write_typed(buf, value)).unwrap();
    }
    h
}

proptest! {
    #[test]
    fn values_round_trip_through_a_handle(values in proptest::collection::vec(arb_value(), 0..24)) {
        let reg = HandleRegistry::new();
        let h = write_all(&reg, &values);
        let size = reg.data_size(h).unwrap();
        reg.set_data_position(h, 0).unwrap();
        for value in &values {
            let read = reg.with_buffer(h, |buf| read_typed(buf, value.tag())).unwrap();
            prop_assert!(read.bit_eq(value), "{:?} != {:?}", read, value);
        }
        prop_assert_eq!(reg.data_position(h).unwrap(), size);
        prop_assert_eq!(reg.data_available(h).unwrap(), 0);
    }

    #[test]
    fn marshall_between_handles_preserves_reads(values in proptest::collection::vec(arb_value(), 0..24)) {
        let reg = HandleRegistry::new();
        let src = write_all(&reg, &values);
        let bytes = reg.marshall(src).unwrap();
        let dest = reg.create().unwrap();
        reg.unmarshall(dest, &bytes, 0, bytes.len() as u32).unwrap();
        prop_assert_eq!(reg.data_size(dest).unwrap(), reg.data_size(src).unwrap());
        for value in &values {
            let read = reg.with_buffer(dest, |buf| read_typed(buf, value.tag())).unwrap();
            prop_assert!(read.bit_eq(value));
        }
    }

    #[test]
    fn append_between_handles_copies_every_value(values in proptest::collection::vec(arb_value(), 1..16)) {
        let reg = HandleRegistry::new();
        let src = write_all(&reg, &values);
        let size = reg.data_size(src).unwrap();
        let dest = reg.create().unwrap();
        reg.append_from(dest, src, 0, size).unwrap();
        reg.set_data_position(dest, 0).unwrap();
        for value in &values {
            let read = reg.with_buffer(dest, |buf| read_typed(buf, value.tag())).unwrap();
            prop_assert!(read.bit_eq(value));
        }
    }
}
