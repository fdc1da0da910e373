//! Append-only arena of [`Cell`] records with stable indices.
//!
//! Buffer slots store [`CellId`]s into the arena. Cells are never mutated;
//! overwritten cells stay in the arena until [`CellArena::compact`] drops
//! every cell no slot references.

use cellbuf_core::{Cell, CellId};

/// Arena owning every cell written into one buffer.
#[derive(Clone, Debug, Default)]
pub struct CellArena {
    cells: Vec<Cell>,
}

impl CellArena {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Store a cell and return its identity.
    pub fn alloc(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    /// Look up a cell.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena since its last
    /// [`clear`](Self::clear) or [`compact`](Self::compact).
    pub fn get(&self, id: CellId) -> &Cell {
        &self.cells[id.0 as usize]
    }

    /// Number of cells held, live or overwritten.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the arena holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Drop cells no slot references and renumber the rest, rewriting
    /// `slots` in place.
    ///
    /// Identity is preserved: two slots hold equal ids after compaction iff
    /// they held equal ids before.
    pub fn compact(&mut self, slots: &mut [Option<CellId>]) {
        let mut remap: Vec<Option<CellId>> = vec![None; self.cells.len()];
        let mut order: Vec<CellId> = Vec::new();
        for slot in slots.iter_mut() {
            let Some(old) = *slot else { continue };
            let new = *remap[old.0 as usize].get_or_insert_with(|| {
                order.push(old);
                CellId(order.len() as u32 - 1)
            });
            *slot = Some(new);
        }
        let mut old_cells: Vec<Option<Cell>> =
            std::mem::take(&mut self.cells).into_iter().map(Some).collect();
        self.cells = order
            .iter()
            .filter_map(|id| old_cells[id.0 as usize].take())
            .collect();
    }
}
