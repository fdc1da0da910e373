//! Core types for the cellbuf serialization buffer emulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! closed [`Value`] set a buffer can hold, the [`Cell`] record stored in
//! buffer slots, the alignment and growth policies, identifiers, and the
//! error taxonomy shared by every other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod id;
pub mod policy;
pub mod value;

pub use cell::{Cell, CellId};
pub use error::{BufferError, ConfigError};
pub use id::{BinderRef, BufferHandle};
pub use policy::{
    align, required_capacity, string_size_bytes, BINDER_SIZE_BYTES, INT_SIZE_BYTES,
    LONG_SIZE_BYTES,
};
pub use value::{Value, ValueTag};
