//! The tagged-cell buffer: cursor, size, capacity, and cell slots.
//!
//! Each byte offset below the capacity holds `Option<CellId>`. A write of
//! `n` aligned bytes allocates one [`Cell`] and stores its id in `n`
//! consecutive slots; a read starting at an offset checks that the whole
//! span still references that same cell.

use cellbuf_core::{align, required_capacity, BufferError, Cell, CellId, Value, ValueTag};
use tracing::{debug, trace};

use crate::arena::CellArena;
use crate::config::BufferConfig;
use crate::segment::Segment;
use crate::validate::check_span;

/// Extra arena entries tolerated beyond twice the capacity before compaction.
const COMPACT_SLACK: usize = 1024;

/// A growable, position-addressed buffer of type-tagged cells.
///
/// Invariant: `data_position <= data_size <= data_capacity()`. Capacity never
/// decreases except through [`clear`](Self::clear).
#[derive(Clone, Debug)]
pub struct TaggedCellBuffer {
    config: BufferConfig,
    arena: CellArena,
    /// One entry per byte of capacity.
    slots: Vec<Option<CellId>>,
    data_position: u32,
    data_size: u32,
    /// Set when a write extends the data size; cleared by any explicit
    /// position or size change.
    wrote_end_without_repositioning: bool,
}

impl Default for TaggedCellBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TaggedCellBuffer {
    /// Create an empty buffer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Create an empty buffer (capacity 0) with the given configuration.
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            config,
            arena: CellArena::new(),
            slots: Vec::new(),
            data_position: 0,
            data_size: 0,
            wrote_end_without_repositioning: false,
        }
    }

    /// Rebuild a buffer by replaying `cells` as writes, then rewinding to 0.
    ///
    /// This is the inverse of [`cells`](Self::cells): the result reads back
    /// the same values and has the same data size, with fresh identities.
    pub fn from_cells(
        config: BufferConfig,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, BufferError> {
        let mut buffer = Self::with_config(config);
        for cell in cells {
            buffer.write_value(cell.size_bytes(), cell.into_value())?;
        }
        buffer.set_data_position(0)?;
        Ok(buffer)
    }

    /// The configuration this buffer was built with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Number of bytes of data written.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Current read/write cursor.
    pub fn data_position(&self) -> u32 {
        self.data_position
    }

    /// Total slot count, including space past the data size.
    pub fn data_capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Bytes between the cursor and the data size.
    pub fn data_available(&self) -> u32 {
        self.data_size - self.data_position
    }

    /// Whether the last write extended the buffer and nothing has
    /// repositioned the cursor since.
    pub fn wrote_end_without_repositioning(&self) -> bool {
        self.wrote_end_without_repositioning
    }

    /// The cell id stored at `offset`, or `None` for an empty slot or an
    /// offset at or past the data size.
    pub fn slot(&self, offset: u32) -> Option<CellId> {
        if offset < self.data_size {
            self.slots[offset as usize]
        } else {
            None
        }
    }

    /// The cell referenced at `offset`, if any.
    pub fn cell_at(&self, offset: u32) -> Option<&Cell> {
        self.slot(offset).map(|id| self.arena.get(id))
    }

    /// The arena backing this buffer's slots.
    pub fn arena(&self) -> &CellArena {
        &self.arena
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Write `value` as one cell of `align(unpadded_size_bytes)` bytes at the
    /// cursor, growing capacity as needed.
    ///
    /// Overwriting part of an older cell is legal; the damaged cell is only
    /// reported when something tries to read it.
    ///
    /// A zero-byte write covers no slots, so it stores nothing and leaves
    /// the cursor, size and reposition flag untouched.
    pub fn write_value(&mut self, unpadded_size_bytes: u32, value: Value) -> Result<(), BufferError> {
        let size_bytes = align(unpadded_size_bytes);
        if size_bytes == 0 {
            return Ok(());
        }
        let end = self.checked_end(u64::from(self.data_position) + u64::from(size_bytes))?;
        if end > self.data_capacity() {
            let grown = required_capacity(self.data_capacity(), end).min(self.config.max_capacity);
            self.set_data_capacity_at_least(grown)?;
        }
        if end > self.data_size {
            self.wrote_end_without_repositioning = true;
            self.data_size = end;
        }
        trace!(
            position = self.data_position,
            size_bytes,
            tag = %value.tag(),
            "write"
        );
        let id = self.arena.alloc(Cell::new(size_bytes, value));
        self.slots[self.data_position as usize..end as usize].fill(Some(id));
        self.data_position = end;
        self.maybe_compact();
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Read the next value, which must have type `tag`.
    ///
    /// Returns `default` when reading past the end is permitted (see
    /// [`BufferConfig::detect_missing_reposition`]).
    pub fn read_value(&mut self, default: Value, tag: ValueTag) -> Result<Value, BufferError> {
        Ok(self.read_tagged(tag)?.unwrap_or(default))
    }

    /// Read the next value of type `tag`, or `None` past the end.
    ///
    /// On a type mismatch the cursor has already moved past the cell.
    pub(crate) fn read_tagged(&mut self, tag: ValueTag) -> Result<Option<Value>, BufferError> {
        let start = self.data_position;
        let Some(id) = self.read_next_cell(Some(tag))? else {
            return Ok(None);
        };
        let value = self.arena.get(id).value();
        if value.tag() != tag {
            return Err(BufferError::TypeMismatch {
                position: start,
                expected: tag,
                found: value.tag(),
            });
        }
        Ok(Some(value.clone()))
    }

    fn read_next_cell(&mut self, wanted: Option<ValueTag>) -> Result<Option<CellId>, BufferError> {
        if self.data_position >= self.data_size {
            if self.wrote_end_without_repositioning && self.config.detect_missing_reposition {
                return Err(BufferError::MissingReposition {
                    position: self.data_position,
                });
            }
            return Ok(None);
        }
        let id = self.slots[self.data_position as usize].ok_or(BufferError::UninitializedRead {
            position: self.data_position,
        })?;
        let size_bytes = self.arena.get(id).size_bytes();
        check_span(self, self.data_position, id, size_bytes, wanted)?;
        self.data_position = self.data_size.min(self.data_position + size_bytes);
        Ok(Some(id))
    }

    /// Every cell from offset 0 to the data size, in order, validating each
    /// span. The cursor is not moved.
    pub fn cells(&self) -> Result<Vec<&Cell>, BufferError> {
        let mut cells = Vec::new();
        let mut position = 0;
        while position < self.data_size {
            let id = self.slots[position as usize]
                .ok_or(BufferError::UninitializedRead { position })?;
            let cell = self.arena.get(id);
            check_span(self, position, id, cell.size_bytes(), None)?;
            cells.push(cell);
            position += cell.size_bytes();
        }
        Ok(cells)
    }

    // ── Position, size, capacity ────────────────────────────────

    /// Move the cursor. Fails if `pos` is past the data size.
    pub fn set_data_position(&mut self, pos: u32) -> Result<(), BufferError> {
        if pos > self.data_size {
            return Err(BufferError::OutOfBounds {
                what: "data position",
                value: u64::from(pos),
                limit: u64::from(self.data_size),
            });
        }
        self.data_position = pos;
        self.wrote_end_without_repositioning = false;
        Ok(())
    }

    /// Set the data size, clearing truncated slots and growing capacity to
    /// exactly `size` when needed. The cursor is clamped to the new size.
    pub fn set_data_size(&mut self, size: u32) -> Result<(), BufferError> {
        self.checked_end(u64::from(size))?;
        if size < self.data_size {
            // May cut a cell in half; that is reported at read time.
            self.slots[size as usize..self.data_size as usize].fill(None);
        }
        self.set_data_capacity_at_least(size)?;
        self.data_size = size;
        self.data_position = self.data_position.min(size);
        self.wrote_end_without_repositioning = false;
        Ok(())
    }

    /// Grow capacity to at least `new_capacity`. Never shrinks.
    pub fn set_data_capacity_at_least(&mut self, new_capacity: u32) -> Result<(), BufferError> {
        if new_capacity <= self.data_capacity() {
            return Ok(());
        }
        self.checked_end(u64::from(new_capacity))?;
        debug!(
            from = self.data_capacity(),
            to = new_capacity,
            "growing buffer capacity"
        );
        self.data_size = self.data_size.min(new_capacity);
        self.data_position = self.data_position.min(self.data_size);
        self.slots.resize(new_capacity as usize, None);
        Ok(())
    }

    /// Reset to the empty state, releasing capacity.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.slots = Vec::new();
        self.data_position = 0;
        self.data_size = 0;
        self.wrote_end_without_repositioning = false;
    }

    // ── Append ──────────────────────────────────────────────────

    /// Append `other[offset..offset + length)` at the end of this buffer.
    ///
    /// The cursor must be at the data size. The data size always grows by
    /// `length`, even when the range cuts through cells; such cells read as
    /// torn later.
    pub fn append_from(
        &mut self,
        other: &TaggedCellBuffer,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        self.ensure_at_end()?;
        let segment = other.export_range(offset, length)?;
        self.append_segment(segment)
    }

    /// Copy the slot range `[offset, offset + length)` out of this buffer.
    ///
    /// The range must lie within the capacity.
    pub fn export_range(&self, offset: u32, length: u32) -> Result<Segment, BufferError> {
        let end = u64::from(offset) + u64::from(length);
        if end > u64::from(self.data_capacity()) {
            return Err(BufferError::OutOfBounds {
                what: "append source range end",
                value: end,
                limit: u64::from(self.data_capacity()),
            });
        }
        Ok(Segment::capture(
            &self.arena,
            &self.slots[offset as usize..end as usize],
        ))
    }

    /// Append a segment captured by [`export_range`](Self::export_range).
    pub fn append_segment(&mut self, segment: Segment) -> Result<(), BufferError> {
        self.ensure_at_end()?;
        let old_size = self.data_size;
        let length = segment.len();
        let new_size = self.checked_end(u64::from(old_size) + u64::from(length))?;
        self.set_data_size(new_size)?;
        segment.import_into(
            &mut self.arena,
            &mut self.slots[old_size as usize..new_size as usize],
        );
        self.data_position += length;
        Ok(())
    }

    fn ensure_at_end(&self) -> Result<(), BufferError> {
        if self.data_position != self.data_size {
            return Err(BufferError::AppendNotAtEnd {
                position: self.data_position,
                size: self.data_size,
            });
        }
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────

    /// Narrow an end position to `u32`, rejecting anything past `max_capacity`.
    fn checked_end(&self, end: u64) -> Result<u32, BufferError> {
        if end > u64::from(self.config.max_capacity) {
            return Err(BufferError::CapacityExceeded {
                requested: end,
                max: self.config.max_capacity,
            });
        }
        Ok(end as u32)
    }

    fn maybe_compact(&mut self) {
        if self.arena.len() > 2 * self.slots.len() + COMPACT_SLACK {
            let before = self.arena.len();
            self.arena.compact(&mut self.slots);
            trace!(before, after = self.arena.len(), "compacted cell arena");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellbuf_core::BinderRef;

    #[test]
    fn new_buffer_is_empty() {
        let buf = TaggedCellBuffer::new();
        assert_eq!(buf.data_size(), 0);
        assert_eq!(buf.data_position(), 0);
        assert_eq!(buf.data_capacity(), 0);
        assert_eq!(buf.data_available(), 0);
    }

    #[test]
    fn write_fills_aligned_span_with_one_identity() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_value(5, Value::ByteArray(vec![1, 2, 3, 4, 5])).unwrap();
        assert_eq!(buf.data_position(), 8);
        assert_eq!(buf.data_size(), 8);
        let id = buf.slot(0).unwrap();
        assert!((0..8).all(|o| buf.slot(o) == Some(id)));
        assert_eq!(buf.cell_at(3).unwrap().size_bytes(), 8);
    }

    #[test]
    fn write_grows_capacity_by_three_halves() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        assert_eq!(buf.data_capacity(), 6);
        buf.write_int(2).unwrap();
        assert_eq!(buf.data_capacity(), 12);
        buf.write_int(3).unwrap();
        assert_eq!(buf.data_capacity(), 12);
    }

    #[test]
    fn growth_is_clamped_to_max_capacity() {
        let mut buf = TaggedCellBuffer::with_config(BufferConfig {
            max_capacity: 10,
            ..BufferConfig::default()
        });
        buf.write_long(1).unwrap();
        assert_eq!(buf.data_capacity(), 10);
        let err = buf.write_int(2).unwrap_err();
        assert_eq!(
            err,
            BufferError::CapacityExceeded {
                requested: 12,
                max: 10
            }
        );
    }

    #[test]
    fn overwrite_in_place_does_not_extend_or_flag() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        buf.write_int(2).unwrap();
        buf.set_data_position(0).unwrap();
        buf.write_int(7).unwrap();
        assert_eq!(buf.data_size(), 8);
        assert!(!buf.wrote_end_without_repositioning());
        buf.set_data_position(0).unwrap();
        assert_eq!(buf.read_int().unwrap(), 7);
        assert_eq!(buf.read_int().unwrap(), 2);
    }

    #[test]
    fn read_past_end_returns_default_after_reposition() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        buf.set_data_position(4).unwrap();
        assert_eq!(buf.read_int().unwrap(), 0);
        assert_eq!(buf.read_string().unwrap(), None);
        assert_eq!(
            buf.read_value(Value::Double(1.5), ValueTag::Double).unwrap(),
            Value::Double(1.5)
        );
    }

    #[test]
    fn read_past_end_after_write_is_missing_reposition() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        assert_eq!(
            buf.read_int(),
            Err(BufferError::MissingReposition { position: 4 })
        );
    }

    #[test]
    fn missing_reposition_detection_can_be_disabled() {
        let mut buf = TaggedCellBuffer::with_config(BufferConfig {
            detect_missing_reposition: false,
            ..BufferConfig::default()
        });
        buf.write_int(1).unwrap();
        assert_eq!(buf.read_int().unwrap(), 0);
    }

    #[test]
    fn reading_empty_slot_is_uninitialized() {
        let mut buf = TaggedCellBuffer::new();
        buf.set_data_size(8).unwrap();
        assert_eq!(
            buf.read_int(),
            Err(BufferError::UninitializedRead { position: 0 })
        );
    }

    #[test]
    fn reading_mid_cell_is_torn() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_long(99).unwrap();
        buf.set_data_position(4).unwrap();
        let err = buf.read_int().unwrap_err();
        assert!(matches!(
            err,
            BufferError::TornRead {
                position: 4,
                offset: 8,
                found: None,
                ..
            }
        ));
    }

    #[test]
    fn type_mismatch_advances_cursor() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(5).unwrap();
        buf.set_data_position(0).unwrap();
        assert_eq!(
            buf.read_float(),
            Err(BufferError::TypeMismatch {
                position: 0,
                expected: ValueTag::Float,
                found: ValueTag::Int,
            })
        );
        assert_eq!(buf.data_position(), 4);
    }

    #[test]
    fn set_data_position_past_size_is_out_of_bounds() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(5).unwrap();
        assert_eq!(
            buf.set_data_position(5),
            Err(BufferError::OutOfBounds {
                what: "data position",
                value: 5,
                limit: 4
            })
        );
    }

    #[test]
    fn set_data_size_truncates_and_clamps_cursor() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        buf.write_int(2).unwrap();
        let capacity = buf.data_capacity();
        buf.set_data_size(4).unwrap();
        assert_eq!(buf.data_size(), 4);
        assert_eq!(buf.data_position(), 4);
        assert_eq!(buf.data_capacity(), capacity);
        assert!(!buf.wrote_end_without_repositioning());
        // Growing again exposes cleared slots, not stale data.
        buf.set_data_size(8).unwrap();
        buf.set_data_position(4).unwrap();
        assert_eq!(
            buf.read_int(),
            Err(BufferError::UninitializedRead { position: 4 })
        );
    }

    #[test]
    fn set_data_size_grows_capacity_exactly() {
        let mut buf = TaggedCellBuffer::new();
        buf.set_data_size(10).unwrap();
        assert_eq!(buf.data_capacity(), 10);
        assert_eq!(buf.data_size(), 10);
    }

    #[test]
    fn capacity_never_shrinks() {
        let mut buf = TaggedCellBuffer::new();
        buf.set_data_capacity_at_least(64).unwrap();
        buf.set_data_capacity_at_least(8).unwrap();
        assert_eq!(buf.data_capacity(), 64);
        buf.set_data_size(0).unwrap();
        assert_eq!(buf.data_capacity(), 64);
    }

    #[test]
    fn clear_resets_everything() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_strong_binder(Some(BinderRef(1))).unwrap();
        buf.clear();
        assert_eq!(buf.data_size(), 0);
        assert_eq!(buf.data_capacity(), 0);
        assert!(buf.arena().is_empty());
        assert_eq!(buf.read_strong_binder().unwrap(), None);
    }

    #[test]
    fn append_copies_and_preserves_identity() {
        let mut src = TaggedCellBuffer::new();
        src.write_int(1).unwrap();
        src.write_long(2).unwrap();

        let mut dest = TaggedCellBuffer::new();
        dest.write_int(0).unwrap();
        dest.append_from(&src, 0, 12).unwrap();
        assert_eq!(dest.data_size(), 16);
        assert_eq!(dest.data_position(), 16);

        dest.set_data_position(0).unwrap();
        assert_eq!(dest.read_int().unwrap(), 0);
        assert_eq!(dest.read_int().unwrap(), 1);
        assert_eq!(dest.read_long().unwrap(), 2);
    }

    #[test]
    fn append_not_at_end_fails() {
        let src = TaggedCellBuffer::new();
        let mut dest = TaggedCellBuffer::new();
        dest.write_int(0).unwrap();
        dest.set_data_position(0).unwrap();
        assert_eq!(
            dest.append_from(&src, 0, 0),
            Err(BufferError::AppendNotAtEnd {
                position: 0,
                size: 4
            })
        );
    }

    #[test]
    fn append_of_partial_cell_reads_torn() {
        let mut src = TaggedCellBuffer::new();
        src.write_long(2).unwrap();

        let mut dest = TaggedCellBuffer::new();
        dest.append_from(&src, 0, 4).unwrap();
        assert_eq!(dest.data_size(), 4);
        dest.set_data_position(0).unwrap();
        assert!(matches!(
            dest.read_long(),
            Err(BufferError::TornRead { offset: 4, .. })
        ));
    }

    #[test]
    fn append_source_range_must_fit_capacity() {
        let mut src = TaggedCellBuffer::new();
        src.write_int(1).unwrap();
        let mut dest = TaggedCellBuffer::new();
        assert!(matches!(
            dest.append_from(&src, 4, 8),
            Err(BufferError::OutOfBounds { limit: 6, .. })
        ));
    }

    #[test]
    fn cells_scan_leaves_cursor_alone() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(1).unwrap();
        buf.write_string(Some("abc")).unwrap();
        let cells = buf.cells().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].size_bytes(), 12);
        assert_eq!(buf.data_position(), 16);
    }

    #[test]
    fn cells_scan_rejects_torn_content() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_long(1).unwrap();
        buf.set_data_size(4).unwrap();
        assert!(matches!(buf.cells(), Err(BufferError::TornRead { .. })));
    }

    #[test]
    fn from_cells_replays_and_rewinds() {
        let buf = TaggedCellBuffer::from_cells(
            BufferConfig::default(),
            vec![Cell::new(4, Value::Int(3)), Cell::new(8, Value::Double(0.5))],
        )
        .unwrap();
        assert_eq!(buf.data_size(), 12);
        assert_eq!(buf.data_position(), 0);
        assert!(!buf.wrote_end_without_repositioning());
    }

    #[test]
    fn arena_is_compacted_under_repeated_overwrite() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(0).unwrap();
        for i in 0..5_000 {
            buf.set_data_position(0).unwrap();
            buf.write_int(i).unwrap();
        }
        assert!(buf.arena().len() <= 2 * buf.data_capacity() as usize + COMPACT_SLACK + 1);
        buf.set_data_position(0).unwrap();
        assert_eq!(buf.read_int().unwrap(), 4_999);
    }

    #[test]
    fn zero_byte_write_stores_nothing() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_int(3).unwrap();
        buf.set_data_position(0).unwrap();
        buf.write_value(0, Value::Int(9)).unwrap();
        assert_eq!(buf.arena().len(), 1);
        assert_eq!(buf.data_position(), 0);
        assert_eq!(buf.data_size(), 4);
        assert!(!buf.wrote_end_without_repositioning());
        assert_eq!(buf.read_int().unwrap(), 3);
    }

    #[tracing_test::traced_test]
    #[test]
    fn capacity_growth_is_logged() {
        let mut buf = TaggedCellBuffer::new();
        buf.write_long(1).unwrap();
        assert!(logs_contain("growing buffer capacity"));
        assert!(logs_contain("to=12"));
    }
}
