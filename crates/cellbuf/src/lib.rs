//! cellbuf: an in-memory emulator of a positional serialization buffer.
//!
//! Every write stores one type-tagged cell across the 4-byte-aligned span it
//! occupies. Reads check that their span is covered by exactly one intact
//! write, so reading the wrong type, reading mid-value, or reading across an
//! overwrite fails with a descriptive error instead of returning garbage.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! cellbuf sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use cellbuf::prelude::*;
//!
//! let registry = HandleRegistry::new();
//! let h = registry.create().unwrap();
//! registry.write_int(h, 42).unwrap();
//! registry.write_string(h, Some("hi")).unwrap();
//! registry.set_data_position(h, 0).unwrap();
//!
//! assert_eq!(registry.read_int(h).unwrap(), 42);
//! assert_eq!(registry.read_string(h).unwrap().as_deref(), Some("hi"));
//!
//! // The cell at offset 0 holds an int, not a long.
//! registry.set_data_position(h, 0).unwrap();
//! assert!(matches!(
//!     registry.read_long(h),
//!     Err(BufferError::TypeMismatch { .. })
//! ));
//!
//! // Shrinking the data size cuts the string cell in half.
//! registry.set_data_size(h, 8).unwrap();
//! registry.set_data_position(h, 4).unwrap();
//! assert!(matches!(
//!     registry.read_string(h),
//!     Err(BufferError::TornRead { .. })
//! ));
//!
//! registry.destroy(h).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cellbuf-core` | Values, cells, handles, sizing policies, errors |
//! | [`buffer`] | `cellbuf-buffer` | `TaggedCellBuffer`, cell arena, buffer config |
//! | [`wire`] | `cellbuf-wire` | Marshal encoding |
//! | [`registry`] | `cellbuf-registry` | Handle registry, dispatch table, status codes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Values, cells, identifiers, sizing policies, and errors (`cellbuf-core`).
pub use cellbuf_core as types;

/// The tagged-cell buffer engine (`cellbuf-buffer`).
///
/// [`buffer::TaggedCellBuffer`] can be used directly without a registry.
pub use cellbuf_buffer as buffer;

/// Marshal encoding (`cellbuf-wire`).
pub use cellbuf_wire as wire;

/// Handle registry and operation dispatch (`cellbuf-registry`).
pub use cellbuf_registry as registry;

/// Common imports for typical cellbuf usage.
pub mod prelude {
    // Core types
    pub use cellbuf_core::{BinderRef, BufferHandle, Value, ValueTag};

    // Errors
    pub use cellbuf_core::{BufferError, ConfigError};
    pub use cellbuf_wire::WireError;

    // Buffer
    pub use cellbuf_buffer::{BufferConfig, TaggedCellBuffer};

    // Registry
    pub use cellbuf_registry::{
        BufferStatus, DestroyPolicy, HandleRegistry, Op, Outcome, Receipt, RegistryConfig,
    };
}
