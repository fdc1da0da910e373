//! Typed write/read primitives layered over `write_value` / `read_tagged`.
//!
//! Each primitive fixes the unpadded size of its encoding: 4 bytes for
//! bytes, ints and floats, 8 for longs and doubles, a length word plus
//! NUL-terminated UTF-16 for strings, 20 for binder references. Byte arrays
//! are a length int followed by one opaque cell for the whole payload.

use cellbuf_core::policy::string_size_bytes;
use cellbuf_core::{
    BinderRef, BufferError, Value, ValueTag, BINDER_SIZE_BYTES, INT_SIZE_BYTES, LONG_SIZE_BYTES,
};

use crate::buffer::TaggedCellBuffer;

/// Length prefix written for an absent byte array.
const ABSENT_LENGTH: i32 = -1;

impl TaggedCellBuffer {
    /// Write a byte, occupying one 4-byte cell.
    pub fn write_byte(&mut self, v: i8) -> Result<(), BufferError> {
        self.write_value(INT_SIZE_BYTES, Value::Byte(v))
    }

    /// Read a byte (default `0`).
    pub fn read_byte(&mut self) -> Result<i8, BufferError> {
        match self.read_tagged(ValueTag::Byte)? {
            Some(Value::Byte(v)) => Ok(v),
            _ => Ok(0),
        }
    }

    /// Write an int.
    pub fn write_int(&mut self, v: i32) -> Result<(), BufferError> {
        self.write_value(INT_SIZE_BYTES, Value::Int(v))
    }

    /// Read an int (default `0`).
    pub fn read_int(&mut self) -> Result<i32, BufferError> {
        match self.read_tagged(ValueTag::Int)? {
            Some(Value::Int(v)) => Ok(v),
            _ => Ok(0),
        }
    }

    /// Write a long.
    pub fn write_long(&mut self, v: i64) -> Result<(), BufferError> {
        self.write_value(LONG_SIZE_BYTES, Value::Long(v))
    }

    /// Read a long (default `0`).
    pub fn read_long(&mut self) -> Result<i64, BufferError> {
        match self.read_tagged(ValueTag::Long)? {
            Some(Value::Long(v)) => Ok(v),
            _ => Ok(0),
        }
    }

    /// Write a float.
    pub fn write_float(&mut self, v: f32) -> Result<(), BufferError> {
        self.write_value(INT_SIZE_BYTES, Value::Float(v))
    }

    /// Read a float (default `0.0`).
    pub fn read_float(&mut self) -> Result<f32, BufferError> {
        match self.read_tagged(ValueTag::Float)? {
            Some(Value::Float(v)) => Ok(v),
            _ => Ok(0.0),
        }
    }

    /// Write a double.
    pub fn write_double(&mut self, v: f64) -> Result<(), BufferError> {
        self.write_value(LONG_SIZE_BYTES, Value::Double(v))
    }

    /// Read a double (default `0.0`).
    pub fn read_double(&mut self) -> Result<f64, BufferError> {
        match self.read_tagged(ValueTag::Double)? {
            Some(Value::Double(v)) => Ok(v),
            _ => Ok(0.0),
        }
    }

    /// Write a string, or an absent string for `None`.
    pub fn write_string(&mut self, s: Option<&str>) -> Result<(), BufferError> {
        self.write_value(string_size_bytes(s), Value::String(s.map(str::to_owned)))
    }

    /// Read a string (default absent).
    pub fn read_string(&mut self) -> Result<Option<String>, BufferError> {
        match self.read_tagged(ValueTag::String)? {
            Some(Value::String(s)) => Ok(s),
            _ => Ok(None),
        }
    }

    /// Write a binder reference, or an absent binder for `None`.
    pub fn write_strong_binder(&mut self, b: Option<BinderRef>) -> Result<(), BufferError> {
        self.write_value(BINDER_SIZE_BYTES, Value::Binder(b))
    }

    /// Read a binder reference (default absent).
    pub fn read_strong_binder(&mut self) -> Result<Option<BinderRef>, BufferError> {
        match self.read_tagged(ValueTag::Binder)? {
            Some(Value::Binder(b)) => Ok(b),
            _ => Ok(None),
        }
    }

    /// Write `bytes[offset..offset + length]` as a length int followed by one
    /// opaque cell. `None` writes only the length `-1`.
    ///
    /// An empty range writes just the length `0`.
    pub fn write_byte_array(
        &mut self,
        bytes: Option<&[u8]>,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        let Some(bytes) = bytes else {
            return self.write_int(ABSENT_LENGTH);
        };
        let end = u64::from(offset) + u64::from(length);
        if end > bytes.len() as u64 {
            return Err(BufferError::OutOfBounds {
                what: "byte array range end",
                value: end,
                limit: bytes.len() as u64,
            });
        }
        let prefix = i32::try_from(length).map_err(|_| BufferError::OutOfBounds {
            what: "byte array length",
            value: u64::from(length),
            limit: i32::MAX as u64,
        })?;
        self.write_int(prefix)?;
        if length > 0 {
            let payload = bytes[offset as usize..end as usize].to_vec();
            self.write_value(length, Value::ByteArray(payload))?;
        }
        Ok(())
    }

    /// Read a byte array written by [`write_byte_array`](Self::write_byte_array).
    ///
    /// Returns `None` for an absent array. Fails with `LengthMismatch` when
    /// the payload length disagrees with the prefix.
    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>, BufferError> {
        let length = self.read_int()?;
        if length == ABSENT_LENGTH {
            return Ok(None);
        }
        if length == 0 {
            return Ok(Some(Vec::new()));
        }
        let payload = match self.read_tagged(ValueTag::ByteArray)? {
            Some(Value::ByteArray(payload)) => payload,
            _ => Vec::new(),
        };
        if payload.len() as i64 != i64::from(length) {
            return Err(BufferError::LengthMismatch {
                prefix: i64::from(length),
                actual: payload.len() as u64,
            });
        }
        Ok(Some(payload))
    }

    /// Read a byte array into `dest`, which must match its length exactly.
    ///
    /// An absent array is a mismatch against any destination.
    pub fn read_byte_array_into(&mut self, dest: &mut [u8]) -> Result<(), BufferError> {
        match self.read_byte_array()? {
            Some(payload) if payload.len() == dest.len() => {
                dest.copy_from_slice(&payload);
                Ok(())
            }
            Some(payload) => Err(BufferError::LengthMismatch {
                prefix: dest.len() as i64,
                actual: payload.len() as u64,
            }),
            None => Err(BufferError::LengthMismatch {
                prefix: i64::from(ABSENT_LENGTH),
                actual: dest.len() as u64,
            }),
        }
    }

    /// Write a blob. Blobs share the byte array encoding.
    pub fn write_blob(
        &mut self,
        bytes: Option<&[u8]>,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        self.write_byte_array(bytes, offset, length)
    }

    /// Read a blob written by [`write_blob`](Self::write_blob).
    pub fn read_blob(&mut self) -> Result<Option<Vec<u8>>, BufferError> {
        self.read_byte_array()
    }

    /// Write an interface token: zeroed policy bits then the interface name.
    pub fn write_interface_token(&mut self, interface: &str) -> Result<(), BufferError> {
        self.write_int(0)?;
        self.write_string(Some(interface))
    }

    /// Consume an interface token and check it names `interface`.
    pub fn enforce_interface(&mut self, interface: &str) -> Result<(), BufferError> {
        self.read_int()?;
        let found = self.read_string()?;
        if found.as_deref() != Some(interface) {
            return Err(BufferError::InterfaceMismatch {
                expected: interface.to_owned(),
                found,
            });
        }
        Ok(())
    }
}
