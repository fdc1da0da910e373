//! Handle registry for cellbuf buffers.
//!
//! A [`HandleRegistry`] owns every live [`TaggedCellBuffer`] and hands out
//! monotonic [`BufferHandle`]s. All buffer operations are available by
//! handle, either as direct methods or through the [`Op`] dispatch table.
//!
//! [`TaggedCellBuffer`]: cellbuf_buffer::TaggedCellBuffer
//! [`BufferHandle`]: cellbuf_core::BufferHandle

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod registry;
pub mod status;

pub use command::{Op, OpError, Outcome, Receipt};
pub use config::{DestroyPolicy, RegistryConfig};
pub use registry::HandleRegistry;
pub use status::BufferStatus;
