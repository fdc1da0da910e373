//! Read-span consistency checks.

use cellbuf_core::{BufferError, CellId, ValueTag};

use crate::buffer::TaggedCellBuffer;

/// Verify every offset in `[start, start + span_len)` still references
/// `expected`.
///
/// Catches reads that begin mid-cell, cells truncated by a size change, and
/// cells partially overwritten by a later write. Offsets at or past the data
/// size count as empty.
pub(crate) fn check_span(
    buffer: &TaggedCellBuffer,
    start: u32,
    expected: CellId,
    span_len: u32,
    wanted: Option<ValueTag>,
) -> Result<(), BufferError> {
    for offset in start..start.saturating_add(span_len) {
        let found = buffer.slot(offset);
        if found != Some(expected) {
            let arena = buffer.arena();
            return Err(BufferError::TornRead {
                wanted,
                position: start,
                expected: arena.get(expected).value().to_string(),
                size_bytes: span_len,
                found: found.map(|id| arena.get(id).value().to_string()),
                offset,
            });
        }
    }
    Ok(())
}
