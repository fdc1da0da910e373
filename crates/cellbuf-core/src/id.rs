//! Strongly-typed identifiers for buffers and binder references.

use std::fmt;

/// Opaque identifier of a live buffer, issued by a handle registry.
///
/// Handles are allocated from a monotonic counter and never reused, so a
/// destroyed handle stays invalid for the lifetime of its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BufferHandle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Opaque reference to a binder-like object written into a buffer.
///
/// The buffer never interprets the token; it only stores it and hands the
/// same token back on read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinderRef(pub u64);

impl fmt::Display for BinderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binder#{}", self.0)
    }
}

impl From<u64> for BinderRef {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
