//! Cell records and their arena identifiers.

use std::fmt;

use crate::value::Value;

/// Stable index of a [`Cell`] within a buffer's cell arena.
///
/// Every slot covered by one logical write stores the same `CellId`, so
/// identity comparison between slots is plain index equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One logical written value together with its aligned byte span.
///
/// Cells are immutable once created; overwriting a slot replaces the slot's
/// `CellId`, never the cell itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    size_bytes: u32,
    value: Value,
}

impl Cell {
    /// Create a cell. `size_bytes` must already be 4-byte aligned.
    pub fn new(size_bytes: u32, value: Value) -> Self {
        debug_assert_eq!(size_bytes % 4, 0, "cell size must be 4-byte aligned");
        Self { size_bytes, value }
    }

    /// Aligned size of the cell in bytes.
    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// The stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the cell, returning its value.
    pub fn into_value(self) -> Value {
        self.value
    }
}
