//! Tagged-cell buffer engine for cellbuf.
//!
//! A [`TaggedCellBuffer`] emulates a positional serialization buffer: each
//! byte offset holds a reference to the cell written there, so reads can be
//! type-checked and reads that straddle writes fail fast instead of
//! returning garbage.
//!
//! # Architecture
//!
//! ```text
//! TaggedCellBuffer
//! ├── CellArena        (Cell records, stable CellId indices)
//! ├── slots            (Vec<Option<CellId>>, one per byte of capacity)
//! ├── cursor / size    (data_position <= data_size <= capacity)
//! └── validate         (span consistency checks on every read)
//! ```
//!
//! Appends between buffers go through a [`Segment`], which carries the
//! copied cells and their slot layout so identity survives the copy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod buffer;
pub mod config;
pub mod segment;
mod typed;
mod validate;

pub use arena::CellArena;
pub use buffer::TaggedCellBuffer;
pub use config::BufferConfig;
pub use segment::Segment;
