//! Stable integer status codes for registry operations.
//!
//! [`BufferStatus`] is a `repr(i32)` enum with one code per error condition.
//! Dispatch receipts carry these codes; conversions from [`BufferError`],
//! [`WireError`], and [`ConfigError`] are provided.

use cellbuf_core::{BufferError, ConfigError};
use cellbuf_wire::WireError;

/// Status code for a registry operation.
///
/// `Ok` = 0, all errors are negative. Values are stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferStatus {
    /// Success.
    Ok = 0,
    /// Handle was never issued or has been destroyed.
    HandleNotFound = -1,
    /// A position, size, or range argument is out of bounds.
    OutOfBounds = -2,
    /// A read hit a never-written slot.
    UninitializedRead = -3,
    /// A read span is not covered by one intact write.
    TornRead = -4,
    /// A typed read found a different type.
    TypeMismatch = -5,
    /// A read past the end directly followed an extending write.
    MissingReposition = -6,
    /// Append requested with the cursor away from the end.
    AppendNotAtEnd = -7,
    /// A byte array's length disagrees with its prefix or destination.
    LengthMismatch = -8,
    /// Capacity limit exceeded.
    CapacityExceeded = -9,
    /// Interface token mismatch.
    InterfaceMismatch = -10,
    /// Marshalled bytes could not be decoded.
    MalformedData = -11,
    /// Configuration validation error.
    ConfigError = -12,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
}

impl From<&BufferError> for BufferStatus {
    fn from(e: &BufferError) -> Self {
        match e {
            BufferError::HandleNotFound { .. } => BufferStatus::HandleNotFound,
            BufferError::OutOfBounds { .. } => BufferStatus::OutOfBounds,
            BufferError::UninitializedRead { .. } => BufferStatus::UninitializedRead,
            BufferError::TornRead { .. } => BufferStatus::TornRead,
            BufferError::TypeMismatch { .. } => BufferStatus::TypeMismatch,
            BufferError::MissingReposition { .. } => BufferStatus::MissingReposition,
            BufferError::AppendNotAtEnd { .. } => BufferStatus::AppendNotAtEnd,
            BufferError::LengthMismatch { .. } => BufferStatus::LengthMismatch,
            BufferError::CapacityExceeded { .. } => BufferStatus::CapacityExceeded,
            BufferError::InterfaceMismatch { .. } => BufferStatus::InterfaceMismatch,
            BufferError::RegistryPoisoned => BufferStatus::InternalError,
        }
    }
}

impl From<&WireError> for BufferStatus {
    fn from(e: &WireError) -> Self {
        match e {
            WireError::Buffer(inner) => BufferStatus::from(inner),
            WireError::Io(_) | WireError::MalformedEntry { .. } | WireError::UnknownValueTag { .. } => {
                BufferStatus::MalformedData
            }
        }
    }
}

impl From<&ConfigError> for BufferStatus {
    fn from(_e: &ConfigError) -> Self {
        BufferStatus::ConfigError
    }
}
