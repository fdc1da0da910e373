//! Registry configuration.

use cellbuf_buffer::BufferConfig;
use cellbuf_core::error::ConfigError;

/// What [`HandleRegistry::destroy`](crate::HandleRegistry::destroy) does
/// with a handle that is not live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DestroyPolicy {
    /// Fail with `HandleNotFound`.
    #[default]
    Strict,
    /// Log a warning and succeed.
    Lenient,
}

/// Configuration for a [`HandleRegistry`](crate::HandleRegistry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// The first handle issued. Handle `0` is reserved.
    ///
    /// Default: `1`.
    pub first_handle: u64,

    /// Behavior when destroying an unknown handle.
    ///
    /// Default: [`DestroyPolicy::Strict`].
    pub destroy_policy: DestroyPolicy,

    /// Configuration applied to every buffer the registry creates or
    /// unmarshalls.
    pub buffer: BufferConfig,
}

impl RegistryConfig {
    /// Default first handle.
    pub const DEFAULT_FIRST_HANDLE: u64 = 1;

    /// Check structural invariants, including the nested buffer config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_handle == 0 {
            return Err(ConfigError::ZeroFirstHandle);
        }
        self.buffer.validate()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            first_handle: Self::DEFAULT_FIRST_HANDLE,
            destroy_policy: DestroyPolicy::default(),
            buffer: BufferConfig::default(),
        }
    }
}
