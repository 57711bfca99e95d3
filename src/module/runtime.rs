//! The computation module contract
//!
//! A runtime compiles module binaries; a compiled module can be
//! instantiated any number of times; an instance exposes a handful of
//! exported calls plus one linear memory, which is the only channel for
//! input, key/seed material, output and saved state.

use super::ModuleBinary;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Host capable of compiling one module format
#[async_trait]
pub trait ModuleRuntime: Send + Sync {
    /// Short runtime name used in logs and errors
    fn name(&self) -> &str;

    /// Whether this host can execute the module format at all
    fn is_supported(&self) -> bool;

    /// Compile a module binary into a shareable artifact
    async fn compile(&self, binary: &ModuleBinary) -> Result<Arc<dyn CompiledModule>>;
}

/// A compiled, shareable module artifact
#[async_trait]
pub trait CompiledModule: Send + Sync {
    /// Algorithm identifier of the compiled binary
    fn name(&self) -> &str;

    /// Create a fresh instance with its own linear memory
    async fn instantiate(&self) -> Result<Box<dyn ModuleInstance>>;
}

/// The exports of one live module instance
///
/// Offsets are byte offsets into [`ModuleInstance::memory`]. A call that
/// would touch memory outside the instance fails with a module fault.
pub trait ModuleInstance: Send {
    /// The whole linear memory
    fn memory(&self) -> &[u8];

    /// The whole linear memory, writable
    fn memory_mut(&mut self) -> &mut [u8];

    /// Size the I/O buffer to `bytes`; may move the buffer
    fn set_memory_size(&mut self, bytes: u32) -> Result<()>;

    /// Offset of the I/O buffer
    fn buffer_offset(&self) -> u32;

    /// Reset the algorithm state
    fn init(&mut self, param: u32) -> Result<()>;

    /// Absorb `byte_count` bytes from the start of the I/O buffer
    fn update(&mut self, byte_count: u32) -> Result<()>;

    /// Combined init, update and finalize over the I/O buffer
    fn calculate(&mut self, byte_count: u32, init_param: u32, digest_param: u32) -> Result<()>;

    /// Finish the computation, writing the digest to the start of the I/O buffer
    fn finalize(&mut self, padding: u32) -> Result<()>;

    /// Offset of the internal state region
    fn state_offset(&self) -> u32;

    /// Location of the little-endian `u32` holding the state size
    fn state_size_location(&self) -> u32;
}
