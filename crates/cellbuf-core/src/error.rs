//! Error taxonomy for buffer and registry operations.
//!
//! Every variant signals a usage or consistency bug in the caller. None are
//! retried internally; they propagate to the caller at the point of failure.

use std::error::Error;
use std::fmt;

use crate::id::BufferHandle;
use crate::value::ValueTag;

/// Text used when a torn span runs into an empty slot or the buffer end.
pub const UNINITIALIZED_TEXT: &str = "uninitialized data or the end of the buffer";

/// Errors from buffer operations and handle resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// The handle was never issued or has been destroyed.
    HandleNotFound {
        /// The unresolved handle.
        handle: BufferHandle,
    },
    /// A position, size, or range argument exceeds its bound.
    OutOfBounds {
        /// Which argument was out of range.
        what: &'static str,
        /// The offending value.
        value: u64,
        /// The largest permitted value.
        limit: u64,
    },
    /// A read targeted a never-written slot before the data size boundary.
    UninitializedRead {
        /// Position of the empty slot.
        position: u32,
    },
    /// A read span is not fully covered by one intact write.
    TornRead {
        /// The type the caller was reading, if any.
        wanted: Option<ValueTag>,
        /// Start of the span being read.
        position: u32,
        /// Textual form of the value that starts the span.
        expected: String,
        /// Size of that value's span in bytes.
        size_bytes: u32,
        /// Textual form of what interrupts the span; `None` for an empty
        /// slot or the end of the buffer.
        found: Option<String>,
        /// Offset at which the span is interrupted.
        offset: u32,
    },
    /// A typed read found a value of a different type.
    TypeMismatch {
        /// Start of the cell that was read.
        position: u32,
        /// The type the caller asked for.
        expected: ValueTag,
        /// The type actually stored.
        found: ValueTag,
    },
    /// A read past the end immediately followed writes that extended the
    /// buffer, with no position reset in between.
    MissingReposition {
        /// The cursor at the time of the read.
        position: u32,
    },
    /// An append was requested while the cursor was not at the end.
    AppendNotAtEnd {
        /// Current cursor.
        position: u32,
        /// Current data size.
        size: u32,
    },
    /// A byte array's length prefix disagrees with its payload.
    LengthMismatch {
        /// Length announced by the prefix (`-1` for absent).
        prefix: i64,
        /// Length actually available.
        actual: u64,
    },
    /// A write or capacity request exceeds the buffer's configured maximum.
    CapacityExceeded {
        /// Capacity the operation needed.
        requested: u64,
        /// Configured maximum capacity.
        max: u32,
    },
    /// An interface token did not name the expected interface.
    InterfaceMismatch {
        /// The interface the reader enforces.
        expected: String,
        /// The interface found in the buffer.
        found: Option<String>,
    },
    /// The registry lock was poisoned by a panic on another thread.
    RegistryPoisoned,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandleNotFound { handle } => write!(f, "handle {handle} not found"),
            Self::OutOfBounds { what, value, limit } => {
                write!(f, "{what} {value} out of bounds (limit {limit})")
            }
            Self::UninitializedRead { position } => {
                write!(f, "reading uninitialized data at position {position}")
            }
            Self::TornRead {
                wanted,
                position,
                expected,
                size_bytes,
                found,
                offset,
            } => {
                let wanted = wanted.map_or("value", ValueTag::name);
                let found = found.as_deref().unwrap_or(UNINITIALIZED_TEXT);
                write!(
                    f,
                    "looking for {wanted} at position {position}, found [{expected}] \
                     taking {size_bytes} bytes, but [{found}] interrupts it at position {offset}"
                )
            }
            Self::TypeMismatch {
                position,
                expected,
                found,
            } => {
                write!(
                    f,
                    "type mismatch at position {position}: expected {expected}, found {found}"
                )
            }
            Self::MissingReposition { position } => {
                write!(
                    f,
                    "read past the end at position {position} right after writing; \
                     did you forget to set the data position to 0?"
                )
            }
            Self::AppendNotAtEnd { position, size } => {
                write!(
                    f,
                    "append requested at position {position} but data size is {size}; \
                     appends are only reliable at the end"
                )
            }
            Self::LengthMismatch { prefix, actual } => {
                write!(
                    f,
                    "byte array length prefix is {prefix} but real length is {actual}"
                )
            }
            Self::CapacityExceeded { requested, max } => {
                write!(
                    f,
                    "buffer capacity exceeded: requested {requested} bytes, max {max} bytes"
                )
            }
            Self::InterfaceMismatch { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "binder invocation to an incorrect interface: expected {expected:?}, found {found:?}"
                ),
                None => write!(
                    f,
                    "binder invocation to an incorrect interface: expected {expected:?}, found none"
                ),
            },
            Self::RegistryPoisoned => write!(f, "handle registry lock poisoned"),
        }
    }
}

impl Error for BufferError {}

/// Errors from validating buffer or registry configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_capacity` must be non-zero.
    ZeroMaxCapacity,
    /// Handle `0` is reserved as "no buffer" and cannot be the first handle.
    ZeroFirstHandle,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxCapacity => write!(f, "max_capacity must be at least 1"),
            Self::ZeroFirstHandle => write!(f, "first_handle must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torn_read_message_names_interruption() {
        let err = BufferError::TornRead {
            wanted: Some(ValueTag::Int),
            position: 0,
            expected: "42".into(),
            size_bytes: 4,
            found: Some("7".into()),
            offset: 0,
        };
        assert_eq!(
            err.to_string(),
            "looking for int at position 0, found [42] taking 4 bytes, \
             but [7] interrupts it at position 0"
        );
    }

    #[test]
    fn torn_read_message_reports_missing_data() {
        let err = BufferError::TornRead {
            wanted: None,
            position: 4,
            expected: "9".into(),
            size_bytes: 8,
            found: None,
            offset: 8,
        };
        assert!(err.to_string().contains(UNINITIALIZED_TEXT));
        assert!(err.to_string().starts_with("looking for value"));
    }

    #[test]
    fn missing_reposition_hints_at_rewind() {
        let msg = BufferError::MissingReposition { position: 8 }.to_string();
        assert!(msg.contains("set the data position to 0"));
    }
}
