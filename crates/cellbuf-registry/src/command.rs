//! Operation dispatch table.
//!
//! [`Op`] names every handle-based primitive as a tagged variant, so callers
//! can script a sequence of operations against one handle and get back one
//! [`Receipt`] per operation. A batch stops at the first failure.

use std::fmt;

use cellbuf_core::{BinderRef, BufferError, BufferHandle, Value};
use cellbuf_wire::WireError;
use tracing::warn;

use crate::registry::HandleRegistry;
use crate::status::BufferStatus;

/// One buffer operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Write a byte.
    WriteByte(i8),
    /// Write an int.
    WriteInt(i32),
    /// Write a long.
    WriteLong(i64),
    /// Write a float.
    WriteFloat(f32),
    /// Write a double.
    WriteDouble(f64),
    /// Write a possibly absent string.
    WriteString(Option<String>),
    /// Write a whole, possibly absent byte array.
    WriteByteArray(Option<Vec<u8>>),
    /// Write a whole, possibly absent blob.
    WriteBlob(Option<Vec<u8>>),
    /// Write a possibly absent binder reference.
    WriteStrongBinder(Option<BinderRef>),
    /// Write an interface token.
    WriteInterfaceToken(String),
    /// Read a byte.
    ReadByte,
    /// Read an int.
    ReadInt,
    /// Read a long.
    ReadLong,
    /// Read a float.
    ReadFloat,
    /// Read a double.
    ReadDouble,
    /// Read a string.
    ReadString,
    /// Read a byte array.
    ReadByteArray,
    /// Read a blob.
    ReadBlob,
    /// Read a binder reference.
    ReadStrongBinder,
    /// Consume an interface token naming the given interface.
    EnforceInterface(String),
    /// Query the data size.
    DataSize,
    /// Query the bytes remaining after the cursor.
    DataAvailable,
    /// Query the cursor.
    DataPosition,
    /// Query the capacity.
    DataCapacity,
    /// Set the data size.
    SetDataSize(u32),
    /// Move the cursor.
    SetDataPosition(u32),
    /// Grow the capacity.
    SetDataCapacity(u32),
    /// Append a range of another buffer (or this one) at the end.
    AppendFrom {
        /// Source buffer.
        src: BufferHandle,
        /// Start of the source range.
        offset: u32,
        /// Length of the source range.
        length: u32,
    },
    /// Encode the buffer.
    Marshall,
    /// Replace the buffer with decoded bytes.
    Unmarshall(Vec<u8>),
    /// Reset the buffer to empty.
    FreeBuffer,
}

/// The successful result of an [`Op`].
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The operation has no result.
    Done,
    /// A scalar, string, or binder read.
    Value(Value),
    /// A byte array or blob read; `None` when absent.
    Bytes(Option<Vec<u8>>),
    /// A size, position, or capacity query.
    Size(u32),
    /// Marshalled bytes.
    Marshalled(Vec<u8>),
}

/// Why an [`Op`] failed.
#[derive(Debug)]
pub enum OpError {
    /// The buffer or registry refused the operation.
    Buffer(BufferError),
    /// Marshalling or unmarshalling failed.
    Wire(WireError),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(e) => write!(f, "{e}"),
            Self::Wire(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            Self::Wire(e) => Some(e),
        }
    }
}

impl From<BufferError> for OpError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<WireError> for OpError {
    fn from(e: WireError) -> Self {
        Self::Wire(e)
    }
}

impl From<&OpError> for BufferStatus {
    fn from(e: &OpError) -> Self {
        match e {
            OpError::Buffer(e) => BufferStatus::from(e),
            OpError::Wire(e) => BufferStatus::from(e),
        }
    }
}

/// Result record for one operation in a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    /// Index of the operation within the submitted batch.
    pub index: usize,
    /// `Ok` on success, otherwise the failure code.
    pub status: BufferStatus,
    /// The result on success.
    pub outcome: Option<Outcome>,
    /// Error message on failure.
    pub detail: Option<String>,
}

/// Narrow an in-memory payload length to the `u32` the buffer API takes.
fn payload_len(len: usize) -> Result<u32, BufferError> {
    u32::try_from(len).map_err(|_| BufferError::OutOfBounds {
        what: "payload length",
        value: len as u64,
        limit: u64::from(u32::MAX),
    })
}

fn whole(bytes: &Option<Vec<u8>>) -> Result<(Option<&[u8]>, u32), BufferError> {
    match bytes {
        Some(b) => Ok((Some(b.as_slice()), payload_len(b.len())?)),
        None => Ok((None, 0)),
    }
}

impl HandleRegistry {
    /// Apply one operation to the buffer behind `handle`.
    pub fn apply(&self, handle: BufferHandle, op: &Op) -> Result<Outcome, OpError> {
        let done = |r: Result<(), BufferError>| r.map(|()| Outcome::Done).map_err(OpError::from);
        let value = |v: Result<Value, BufferError>| v.map(Outcome::Value).map_err(OpError::from);
        let size = |s: Result<u32, BufferError>| s.map(Outcome::Size).map_err(OpError::from);
        match op {
            Op::WriteByte(v) => done(self.write_byte(handle, *v)),
            Op::WriteInt(v) => done(self.write_int(handle, *v)),
            Op::WriteLong(v) => done(self.write_long(handle, *v)),
            Op::WriteFloat(v) => done(self.write_float(handle, *v)),
            Op::WriteDouble(v) => done(self.write_double(handle, *v)),
            Op::WriteString(s) => done(self.write_string(handle, s.as_deref())),
            Op::WriteByteArray(bytes) => {
                let (bytes, len) = whole(bytes)?;
                done(self.write_byte_array(handle, bytes, 0, len))
            }
            Op::WriteBlob(bytes) => {
                let (bytes, len) = whole(bytes)?;
                done(self.write_blob(handle, bytes, 0, len))
            }
            Op::WriteStrongBinder(b) => done(self.write_strong_binder(handle, *b)),
            Op::WriteInterfaceToken(name) => done(self.write_interface_token(handle, name)),
            Op::ReadByte => value(self.read_byte(handle).map(Value::Byte)),
            Op::ReadInt => value(self.read_int(handle).map(Value::Int)),
            Op::ReadLong => value(self.read_long(handle).map(Value::Long)),
            Op::ReadFloat => value(self.read_float(handle).map(Value::Float)),
            Op::ReadDouble => value(self.read_double(handle).map(Value::Double)),
            Op::ReadString => value(self.read_string(handle).map(Value::String)),
            Op::ReadStrongBinder => value(self.read_strong_binder(handle).map(Value::Binder)),
            Op::ReadByteArray => Ok(Outcome::Bytes(self.read_byte_array(handle)?)),
            Op::ReadBlob => Ok(Outcome::Bytes(self.read_blob(handle)?)),
            Op::EnforceInterface(name) => done(self.enforce_interface(handle, name)),
            Op::DataSize => size(self.data_size(handle)),
            Op::DataAvailable => size(self.data_available(handle)),
            Op::DataPosition => size(self.data_position(handle)),
            Op::DataCapacity => size(self.data_capacity(handle)),
            Op::SetDataSize(n) => done(self.set_data_size(handle, *n)),
            Op::SetDataPosition(n) => done(self.set_data_position(handle, *n)),
            Op::SetDataCapacity(n) => done(self.set_data_capacity(handle, *n)),
            Op::AppendFrom {
                src,
                offset,
                length,
            } => done(self.append_from(handle, *src, *offset, *length)),
            Op::Marshall => Ok(Outcome::Marshalled(self.marshall(handle)?)),
            Op::Unmarshall(bytes) => {
                self.unmarshall(handle, bytes, 0, payload_len(bytes.len())?)?;
                Ok(Outcome::Done)
            }
            Op::FreeBuffer => done(self.free_buffer(handle)),
        }
    }

    /// Apply `ops` in order, stopping after the first failure.
    ///
    /// Returns one receipt per attempted operation; the last receipt carries
    /// the failure, if any.
    pub fn apply_batch(&self, handle: BufferHandle, ops: &[Op]) -> Vec<Receipt> {
        let mut receipts = Vec::with_capacity(ops.len());
        for (index, op) in ops.iter().enumerate() {
            match self.apply(handle, op) {
                Ok(outcome) => receipts.push(Receipt {
                    index,
                    status: BufferStatus::Ok,
                    outcome: Some(outcome),
                    detail: None,
                }),
                Err(e) => {
                    warn!(%handle, index, op = ?op, error = %e, "batch stopped");
                    receipts.push(Receipt {
                        index,
                        status: BufferStatus::from(&e),
                        outcome: None,
                        detail: Some(e.to_string()),
                    });
                    break;
                }
            }
        }
        receipts
    }
}
