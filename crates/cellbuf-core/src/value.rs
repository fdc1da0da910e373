//! The closed set of values a buffer cell can carry.

use std::fmt;

use crate::id::BinderRef;

/// A value stored in a single buffer cell.
///
/// The set is closed: every write primitive maps onto exactly one variant,
/// and typed reads check the variant through [`ValueTag`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A single byte, padded to a 4-byte cell.
    Byte(i8),
    /// A 32-bit signed integer.
    Int(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A string, or `None` for an absent string.
    String(Option<String>),
    /// An opaque byte payload (the body of a byte array or blob).
    ByteArray(Vec<u8>),
    /// A binder-like object reference, or `None` for an absent binder.
    Binder(Option<BinderRef>),
}

/// Fieldless discriminant of [`Value`], used to type-check reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// [`Value::Byte`].
    Byte,
    /// [`Value::Int`].
    Int,
    /// [`Value::Long`].
    Long,
    /// [`Value::Float`].
    Float,
    /// [`Value::Double`].
    Double,
    /// [`Value::String`].
    String,
    /// [`Value::ByteArray`].
    ByteArray,
    /// [`Value::Binder`].
    Binder,
}

impl Value {
    /// The tag of this value.
    pub fn tag(&self) -> ValueTag {
        match self {
            Self::Byte(_) => ValueTag::Byte,
            Self::Int(_) => ValueTag::Int,
            Self::Long(_) => ValueTag::Long,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::String(_) => ValueTag::String,
            Self::ByteArray(_) => ValueTag::ByteArray,
            Self::Binder(_) => ValueTag::Binder,
        }
    }

    /// Bitwise equality: floats compare by bit pattern so NaN payloads and
    /// signed zeros survive round-trip assertions.
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl ValueTag {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::ByteArray => "byte array",
            Self::Binder => "binder",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(Some(s)) => write!(f, "{s:?}"),
            Self::ByteArray(bytes) => write!(f, "{bytes:?}"),
            Self::Binder(Some(b)) => write!(f, "{b}"),
            Self::String(None) | Self::Binder(None) => f.write_str("null"),
        }
    }
}
