//! Alignment and capacity growth rules.
//!
//! Every write is padded to a 4-byte boundary, and capacity grows to 3/2 of
//! the required end position when a write overflows it. Capacity never
//! shrinks.

/// Bytes occupied by an int, float, byte, or length prefix.
pub const INT_SIZE_BYTES: u32 = 4;

/// Bytes occupied by a long or double.
pub const LONG_SIZE_BYTES: u32 = 8;

/// Bytes occupied by a binder reference (five 32-bit words, the size of a
/// flattened binder object).
pub const BINDER_SIZE_BYTES: u32 = 5 * INT_SIZE_BYTES;

/// Round `n` up to the next multiple of four.
///
/// Inputs within three of `u32::MAX` saturate to the largest aligned `u32`;
/// no buffer can hold a span that large, so the caller's capacity check
/// rejects them anyway.
pub const fn align(n: u32) -> u32 {
    match n.checked_add(3) {
        Some(padded) => padded / 4 * 4,
        None => u32::MAX / 4 * 4,
    }
}

/// Capacity needed to hold a write ending at `end_position`.
///
/// Returns `current` unchanged when the write already fits; otherwise
/// `end_position * 3 / 2`, which is never smaller than `end_position`.
pub fn required_capacity(current: u32, end_position: u32) -> u32 {
    if end_position <= current {
        return current;
    }
    let grown = u64::from(end_position) * 3 / 2;
    u32::try_from(grown).unwrap_or(u32::MAX)
}

/// Unpadded size of a string: a length word plus a NUL-terminated array of
/// UTF-16 code units. An absent string is just the length word.
pub fn string_size_bytes(s: Option<&str>) -> u32 {
    let terminated_units = match s {
        Some(s) => s.encode_utf16().count() as u64 + 1,
        None => 0,
    };
    let size = u64::from(INT_SIZE_BYTES) + terminated_units * 2;
    u32::try_from(size).unwrap_or(u32::MAX)
}
