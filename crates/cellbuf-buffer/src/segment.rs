//! Slot ranges copied out of one buffer for appending into another.
//!
//! A [`Segment`] holds the distinct cells referenced by a slot range plus the
//! range's layout as indices into those cells. Importing a segment allocates
//! fresh cells in the destination arena, so slots that shared a cell in the
//! source share one in the destination, while a partially copied cell stays
//! torn and is caught at read time.

use cellbuf_core::{Cell, CellId};
use indexmap::IndexSet;

use crate::arena::CellArena;

/// A copied run of slots together with the cells they reference.
#[derive(Clone, Debug, Default)]
pub struct Segment {
    cells: Vec<Cell>,
    slots: Vec<Option<u32>>,
}

impl Segment {
    /// Capture `slots` from `arena`, deduplicating cells by identity.
    pub fn capture(arena: &CellArena, slots: &[Option<CellId>]) -> Self {
        let mut seen: IndexSet<CellId> = IndexSet::new();
        let layout = slots
            .iter()
            .map(|slot| slot.map(|id| seen.insert_full(id).0 as u32))
            .collect();
        let cells = seen.iter().map(|&id| arena.get(id).clone()).collect();
        Self {
            cells,
            slots: layout,
        }
    }

    /// Length of the copied range in bytes.
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct cells referenced by the range.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Move the cells into `arena` and write the range into `dest`.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is not exactly [`len`](Self::len) slots long.
    pub fn import_into(self, arena: &mut CellArena, dest: &mut [Option<CellId>]) {
        assert_eq!(dest.len(), self.slots.len(), "segment length mismatch");
        let ids: Vec<CellId> = self.cells.into_iter().map(|c| arena.alloc(c)).collect();
        for (slot, local) in dest.iter_mut().zip(self.slots) {
            *slot = local.map(|i| ids[i as usize]);
        }
    }
}
