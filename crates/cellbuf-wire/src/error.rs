//! Error types for the marshal encoding.

use std::fmt;
use std::io;

use cellbuf_core::BufferError;

/// Errors that can occur while marshalling or unmarshalling a buffer.
#[derive(Debug)]
pub enum WireError {
    /// An I/O error occurred, including truncated input.
    Io(io::Error),
    /// An entry could not be decoded.
    MalformedEntry {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A value type tag is not recognized.
    UnknownValueTag {
        /// The unrecognized tag.
        tag: u8,
    },
    /// The buffer refused the operation (e.g. a torn cell during marshal,
    /// or a capacity limit during unmarshal).
    Buffer(BufferError),
}

impl WireError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedEntry {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedEntry { detail } => write!(f, "malformed entry: {detail}"),
            Self::UnknownValueTag { tag } => write!(f, "unknown value tag {tag}"),
            Self::Buffer(e) => write!(f, "buffer error: {e}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<BufferError> for WireError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn buffer_errors_chain_as_source() {
        let err = WireError::from(BufferError::UninitializedRead { position: 8 });
        let source = err.source().unwrap();
        assert_eq!(
            source.to_string(),
            BufferError::UninitializedRead { position: 8 }.to_string()
        );
        assert!(err.to_string().starts_with("buffer error: "));
    }

    #[test]
    fn malformed_has_no_source() {
        let err = WireError::malformed("bad flag 9");
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "malformed entry: bad flag 9");
    }
}
