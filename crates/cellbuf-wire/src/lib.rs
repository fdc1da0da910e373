//! Portable marshal encoding for [`TaggedCellBuffer`].
//!
//! [`marshall`] scans a buffer's cells from offset 0 to its data size and
//! encodes each one with its aligned size and typed payload (see [`codec`]
//! for the byte layout). [`unmarshall`] decodes the entries and replays them
//! as writes into a fresh buffer, so the result reads back the same values
//! and has the same data size. Cell identities are not preserved.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;

use std::io::Cursor;

use cellbuf_buffer::{BufferConfig, TaggedCellBuffer};
use tracing::trace;

pub use error::WireError;

/// Encode every cell of `buffer` into a byte vector.
///
/// Fails with [`WireError::Buffer`] if any cell below the data size is torn
/// or uninitialized.
pub fn marshall(buffer: &TaggedCellBuffer) -> Result<Vec<u8>, WireError> {
    let cells = buffer.cells()?;
    let mut out = Vec::new();
    codec::encode_entries(&mut out, &cells)?;
    trace!(entries = cells.len(), bytes = out.len(), "marshalled buffer");
    Ok(out)
}

/// Decode `bytes` into a new buffer positioned at 0.
///
/// The whole slice must be consumed; trailing bytes are rejected.
pub fn unmarshall(bytes: &[u8], config: BufferConfig) -> Result<TaggedCellBuffer, WireError> {
    let mut cursor = Cursor::new(bytes);
    let cells = codec::decode_entries(&mut cursor)?;
    let consumed = cursor.position();
    if consumed != bytes.len() as u64 {
        return Err(WireError::malformed(format!(
            "{} trailing bytes after {} entries",
            bytes.len() as u64 - consumed,
            cells.len()
        )));
    }
    let entries = cells.len();
    let buffer = TaggedCellBuffer::from_cells(config, cells)?;
    trace!(entries, size = buffer.data_size(), "unmarshalled buffer");
    Ok(buffer)
}
