//! The handle registry and its handle-based buffer API.
//!
//! Each live buffer sits behind its own `Arc<Mutex<_>>`, so the registry's
//! table lock is only held for lookup, insert, and remove. Different handles
//! can be driven from different threads concurrently.

use std::sync::{Arc, Mutex, MutexGuard};

use cellbuf_buffer::TaggedCellBuffer;
use cellbuf_core::{BinderRef, BufferError, BufferHandle, ConfigError};
use cellbuf_wire::WireError;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::{DestroyPolicy, RegistryConfig};

type BufferArc = Arc<Mutex<TaggedCellBuffer>>;

struct Table {
    next_handle: u64,
    live: IndexMap<BufferHandle, BufferArc>,
}

/// Maps monotonic [`BufferHandle`]s to live buffers.
///
/// Handles are never reused within one registry, so a destroyed handle
/// stays invalid.
pub struct HandleRegistry {
    config: RegistryConfig,
    table: Mutex<Table>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("config", &self.config)
            .field("live", &self.live_count().ok())
            .finish()
    }
}

impl HandleRegistry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Create an empty registry after validating `config`.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        let table = Table {
            next_handle: config.first_handle,
            live: IndexMap::new(),
        };
        Self {
            config,
            table: Mutex::new(table),
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn table(&self) -> Result<MutexGuard<'_, Table>, BufferError> {
        self.table.lock().map_err(|_| BufferError::RegistryPoisoned)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Register a fresh empty buffer and return its handle.
    pub fn create(&self) -> Result<BufferHandle, BufferError> {
        let buffer = TaggedCellBuffer::with_config(self.config.buffer.clone());
        let mut table = self.table()?;
        let handle = BufferHandle(table.next_handle);
        table.next_handle = handle.0.checked_add(1).ok_or(BufferError::OutOfBounds {
            what: "next handle",
            value: handle.0,
            limit: u64::MAX - 1,
        })?;
        table.live.insert(handle, Arc::new(Mutex::new(buffer)));
        debug!(%handle, live = table.live.len(), "created buffer");
        Ok(handle)
    }

    /// Resolve a handle to its buffer.
    pub fn lookup(&self, handle: BufferHandle) -> Result<BufferArc, BufferError> {
        self.table()?
            .live
            .get(&handle)
            .cloned()
            .ok_or(BufferError::HandleNotFound { handle })
    }

    /// Remove a handle and release its buffer.
    ///
    /// An unknown handle fails under [`DestroyPolicy::Strict`] and is a
    /// logged no-op under [`DestroyPolicy::Lenient`].
    pub fn destroy(&self, handle: BufferHandle) -> Result<(), BufferError> {
        let mut table = self.table()?;
        if table.live.shift_remove(&handle).is_some() {
            debug!(%handle, live = table.live.len(), "destroyed buffer");
            return Ok(());
        }
        match self.config.destroy_policy {
            DestroyPolicy::Strict => Err(BufferError::HandleNotFound { handle }),
            DestroyPolicy::Lenient => {
                warn!(%handle, "destroy of unknown handle ignored");
                Ok(())
            }
        }
    }

    /// Whether `handle` is live.
    pub fn contains(&self, handle: BufferHandle) -> Result<bool, BufferError> {
        Ok(self.table()?.live.contains_key(&handle))
    }

    /// Number of live handles.
    pub fn live_count(&self) -> Result<usize, BufferError> {
        Ok(self.table()?.live.len())
    }

    /// Live handles in creation order.
    pub fn handles(&self) -> Result<Vec<BufferHandle>, BufferError> {
        Ok(self.table()?.live.keys().copied().collect())
    }

    /// Run `f` against the buffer behind `handle`, holding only that
    /// buffer's lock.
    pub fn with_buffer<R, E>(
        &self,
        handle: BufferHandle,
        f: impl FnOnce(&mut TaggedCellBuffer) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<BufferError>,
    {
        let buffer = self.lookup(handle)?;
        let mut guard = buffer.lock().map_err(|_| BufferError::RegistryPoisoned)?;
        f(&mut guard)
    }

    /// Reset a buffer to empty while keeping its handle live.
    pub fn free_buffer(&self, handle: BufferHandle) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| {
            b.clear();
            Ok(())
        })
    }

    // ── Position, size, capacity ────────────────────────────────

    /// Bytes of data written.
    pub fn data_size(&self, handle: BufferHandle) -> Result<u32, BufferError> {
        self.with_buffer(handle, |b| Ok(b.data_size()))
    }

    /// Bytes between the cursor and the data size.
    pub fn data_available(&self, handle: BufferHandle) -> Result<u32, BufferError> {
        self.with_buffer(handle, |b| Ok(b.data_available()))
    }

    /// Current cursor.
    pub fn data_position(&self, handle: BufferHandle) -> Result<u32, BufferError> {
        self.with_buffer(handle, |b| Ok(b.data_position()))
    }

    /// Current capacity.
    pub fn data_capacity(&self, handle: BufferHandle) -> Result<u32, BufferError> {
        self.with_buffer(handle, |b| Ok(b.data_capacity()))
    }

    /// Set the data size, truncating or extending.
    pub fn set_data_size(&self, handle: BufferHandle, size: u32) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.set_data_size(size))
    }

    /// Move the cursor.
    pub fn set_data_position(&self, handle: BufferHandle, pos: u32) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.set_data_position(pos))
    }

    /// Grow capacity to at least `capacity`.
    pub fn set_data_capacity(&self, handle: BufferHandle, capacity: u32) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.set_data_capacity_at_least(capacity))
    }

    // ── Primitive writes ────────────────────────────────────────

    /// Write a byte.
    pub fn write_byte(&self, handle: BufferHandle, v: i8) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_byte(v))
    }

    /// Write an int.
    pub fn write_int(&self, handle: BufferHandle, v: i32) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_int(v))
    }

    /// Write a long.
    pub fn write_long(&self, handle: BufferHandle, v: i64) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_long(v))
    }

    /// Write a float.
    pub fn write_float(&self, handle: BufferHandle, v: f32) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_float(v))
    }

    /// Write a double.
    pub fn write_double(&self, handle: BufferHandle, v: f64) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_double(v))
    }

    /// Write a possibly absent string.
    pub fn write_string(&self, handle: BufferHandle, s: Option<&str>) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_string(s))
    }

    /// Write `bytes[offset..offset + length]` with its length prefix.
    pub fn write_byte_array(
        &self,
        handle: BufferHandle,
        bytes: Option<&[u8]>,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_byte_array(bytes, offset, length))
    }

    /// Write a blob.
    pub fn write_blob(
        &self,
        handle: BufferHandle,
        bytes: Option<&[u8]>,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_blob(bytes, offset, length))
    }

    /// Write a possibly absent binder reference.
    pub fn write_strong_binder(
        &self,
        handle: BufferHandle,
        binder: Option<BinderRef>,
    ) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_strong_binder(binder))
    }

    /// Write an interface token.
    pub fn write_interface_token(
        &self,
        handle: BufferHandle,
        interface: &str,
    ) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.write_interface_token(interface))
    }

    // ── Primitive reads ─────────────────────────────────────────

    /// Read a byte.
    pub fn read_byte(&self, handle: BufferHandle) -> Result<i8, BufferError> {
        self.with_buffer(handle, |b| b.read_byte())
    }

    /// Read an int.
    pub fn read_int(&self, handle: BufferHandle) -> Result<i32, BufferError> {
        self.with_buffer(handle, |b| b.read_int())
    }

    /// Read a long.
    pub fn read_long(&self, handle: BufferHandle) -> Result<i64, BufferError> {
        self.with_buffer(handle, |b| b.read_long())
    }

    /// Read a float.
    pub fn read_float(&self, handle: BufferHandle) -> Result<f32, BufferError> {
        self.with_buffer(handle, |b| b.read_float())
    }

    /// Read a double.
    pub fn read_double(&self, handle: BufferHandle) -> Result<f64, BufferError> {
        self.with_buffer(handle, |b| b.read_double())
    }

    /// Read a possibly absent string.
    pub fn read_string(&self, handle: BufferHandle) -> Result<Option<String>, BufferError> {
        self.with_buffer(handle, |b| b.read_string())
    }

    /// Read a possibly absent byte array.
    pub fn read_byte_array(&self, handle: BufferHandle) -> Result<Option<Vec<u8>>, BufferError> {
        self.with_buffer(handle, |b| b.read_byte_array())
    }

    /// Read a byte array into `dest`, which must match its length.
    pub fn read_byte_array_into(
        &self,
        handle: BufferHandle,
        dest: &mut [u8],
    ) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.read_byte_array_into(dest))
    }

    /// Read a blob.
    pub fn read_blob(&self, handle: BufferHandle) -> Result<Option<Vec<u8>>, BufferError> {
        self.with_buffer(handle, |b| b.read_blob())
    }

    /// Read a possibly absent binder reference.
    pub fn read_strong_binder(
        &self,
        handle: BufferHandle,
    ) -> Result<Option<BinderRef>, BufferError> {
        self.with_buffer(handle, |b| b.read_strong_binder())
    }

    /// Consume an interface token naming `interface`.
    pub fn enforce_interface(&self, handle: BufferHandle, interface: &str) -> Result<(), BufferError> {
        self.with_buffer(handle, |b| b.enforce_interface(interface))
    }

    // ── Append and marshalling ──────────────────────────────────

    /// Append `src[offset..offset + length)` to the end of `dest`.
    ///
    /// `dest` and `src` may be the same handle. The two buffers are never
    /// locked at the same time.
    pub fn append_from(
        &self,
        dest: BufferHandle,
        src: BufferHandle,
        offset: u32,
        length: u32,
    ) -> Result<(), BufferError> {
        let segment = self.with_buffer(src, |b| b.export_range(offset, length))?;
        self.with_buffer(dest, |b| b.append_segment(segment))
    }

    /// Encode the buffer's cells.
    pub fn marshall(&self, handle: BufferHandle) -> Result<Vec<u8>, WireError> {
        self.with_buffer(handle, |b| cellbuf_wire::marshall(b))
    }

    /// Replace the buffer with one decoded from `bytes[offset..offset + length]`.
    ///
    /// The buffer is left untouched if decoding fails.
    pub fn unmarshall(
        &self,
        handle: BufferHandle,
        bytes: &[u8],
        offset: u32,
        length: u32,
    ) -> Result<(), WireError> {
        let end = u64::from(offset) + u64::from(length);
        if end > bytes.len() as u64 {
            return Err(BufferError::OutOfBounds {
                what: "unmarshall range end",
                value: end,
                limit: bytes.len() as u64,
            }
            .into());
        }
        let slice = &bytes[offset as usize..end as usize];
        self.with_buffer(handle, |b| {
            *b = cellbuf_wire::unmarshall(slice, self.config.buffer.clone())?;
            debug!(%handle, size = b.data_size(), "unmarshalled into buffer");
            Ok(())
        })
    }
}
