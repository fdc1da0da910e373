//! Test fixtures and value generators for cellbuf development.
//!
//! Provides typed write/read dispatch over [`Value`]s, a fixed sample set
//! covering every variant, and a proptest [`arb_value`] strategy.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{arb_value, filled_buffer, read_typed, sample_values, write_typed};
