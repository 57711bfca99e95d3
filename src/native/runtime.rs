//! In-process module runtime
//!
//! Native binaries are small self-describing blobs naming a reference
//! kernel and a build tag. Instances get a private linear memory laid out
//! like this:
//!
//! ```text
//! [0..4)          state size (u32, little-endian)
//! [8..8+S)        kernel state
//! [buffer..)      I/O buffer, sized by set_memory_size
//! ```

use super::Kernel;
use crate::error::{EngineError, Result};
use crate::module::{CompiledModule, ModuleBinary, ModuleInstance, ModuleRuntime};
use async_trait::async_trait;
use std::sync::Arc;

/// Magic prefix of a native module blob
pub const NATIVE_MAGIC: [u8; 4] = *b"\0nhk";

/// Native blob format version
pub const NATIVE_FORMAT_VERSION: u8 = 1;

const STATE_SIZE_LOCATION: usize = 0;
const STATE_OFFSET: usize = 8;
const INITIAL_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 256 * 1024 * 1024;

/// Encode a native module blob for `kernel`
pub fn encode_blob(kernel: Kernel, build_tag: &str) -> Vec<u8> {
    let name = kernel.name().as_bytes();
    let mut blob = Vec::with_capacity(6 + name.len() + build_tag.len());
    blob.extend_from_slice(&NATIVE_MAGIC);
    blob.push(NATIVE_FORMAT_VERSION);
    blob.push(name.len() as u8);
    blob.extend_from_slice(name);
    blob.extend_from_slice(build_tag.as_bytes());
    blob
}

/// Resolve the kernel a native blob refers to
pub fn decode_blob(blob: &[u8]) -> std::result::Result<Kernel, String> {
    if blob.len() < 6 || blob[..4] != NATIVE_MAGIC {
        return Err("not a native module blob".to_string());
    }
    if blob[4] != NATIVE_FORMAT_VERSION {
        return Err(format!("unsupported native format version {}", blob[4]));
    }
    let name_len = blob[5] as usize;
    let name = blob
        .get(6..6 + name_len)
        .ok_or_else(|| "truncated kernel name".to_string())?;
    let name = std::str::from_utf8(name).map_err(|_| "kernel name is not UTF-8".to_string())?;
    Kernel::from_name(name).ok_or_else(|| format!("unknown kernel '{}'", name))
}

/// Runtime executing the built-in reference kernels
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a native runtime
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleRuntime for NativeRuntime {
    fn name(&self) -> &str {
        "native"
    }

    fn is_supported(&self) -> bool {
        true
    }

    async fn compile(&self, binary: &ModuleBinary) -> Result<Arc<dyn CompiledModule>> {
        let kernel =
            decode_blob(binary.data()).map_err(|e| EngineError::compile(binary.name(), e))?;
        tracing::debug!(
            "Compiled native module '{}' (kernel {}, fingerprint {})",
            binary.name(),
            kernel.name(),
            binary.fingerprint()
        );
        Ok(Arc::new(NativeModule {
            name: binary.name().to_string(),
            kernel,
        }))
    }
}

/// Compiled native module
#[derive(Debug)]
pub struct NativeModule {
    name: String,
    kernel: Kernel,
}

#[async_trait]
impl CompiledModule for NativeModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn instantiate(&self) -> Result<Box<dyn ModuleInstance>> {
        Ok(Box::new(NativeInstance::new(self.kernel)))
    }
}

/// One live native instance with its own linear memory
#[derive(Debug)]
pub struct NativeInstance {
    kernel: Kernel,
    memory: Vec<u8>,
    buffer_offset: usize,
}

impl NativeInstance {
    fn new(kernel: Kernel) -> Self {
        let state_size = kernel.state_size();
        let buffer_offset = (STATE_OFFSET + state_size + 7) & !7;
        let mut memory = vec![0u8; buffer_offset + INITIAL_BUFFER];
        memory[STATE_SIZE_LOCATION..STATE_SIZE_LOCATION + 4]
            .copy_from_slice(&(state_size as u32).to_le_bytes());
        Self {
            kernel,
            memory,
            buffer_offset,
        }
    }

    fn fault(&self, message: impl Into<String>) -> EngineError {
        EngineError::fault(self.kernel.name(), message)
    }

    /// Kernel state region and I/O buffer
    fn regions(&mut self) -> (&mut [u8], &mut [u8]) {
        let state_size = self.kernel.state_size();
        let (head, buffer) = self.memory.split_at_mut(self.buffer_offset);
        (&mut head[STATE_OFFSET..STATE_OFFSET + state_size], buffer)
    }

    fn check_input(&self, byte_count: u32) -> Result<()> {
        let available = self.memory.len() - self.buffer_offset;
        if byte_count as usize > available {
            return Err(self.fault(format!(
                "out of bounds memory access ({} bytes requested, buffer holds {})",
                byte_count, available
            )));
        }
        Ok(())
    }

    fn check_output(&self) -> Result<()> {
        let available = self.memory.len() - self.buffer_offset;
        if available < self.kernel.output_len() {
            return Err(self.fault("buffer too small for digest output"));
        }
        Ok(())
    }
}

impl ModuleInstance for NativeInstance {
    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    fn set_memory_size(&mut self, bytes: u32) -> Result<()> {
        if bytes as usize > MAX_BUFFER {
            return Err(self.fault(format!("memory limit exceeded ({} bytes)", bytes)));
        }
        self.memory.resize(self.buffer_offset + bytes as usize, 0);
        Ok(())
    }

    fn buffer_offset(&self) -> u32 {
        self.buffer_offset as u32
    }

    fn init(&mut self, param: u32) -> Result<()> {
        let kernel = self.kernel;
        let (state, buffer) = self.regions();
        kernel.init(state, buffer, param);
        Ok(())
    }

    fn update(&mut self, byte_count: u32) -> Result<()> {
        self.check_input(byte_count)?;
        let kernel = self.kernel;
        let (state, buffer) = self.regions();
        kernel.update(state, &buffer[..byte_count as usize]);
        Ok(())
    }

    fn calculate(&mut self, byte_count: u32, init_param: u32, digest_param: u32) -> Result<()> {
        self.check_input(byte_count)?;
        self.check_output()?;
        self.init(init_param)?;
        self.update(byte_count)?;
        self.finalize(digest_param)
    }

    fn finalize(&mut self, padding: u32) -> Result<()> {
        self.check_output()?;
        let kernel = self.kernel;
        let (state, buffer) = self.regions();
        kernel.finalize(state, buffer, padding);
        Ok(())
    }

    fn state_offset(&self) -> u32 {
        STATE_OFFSET as u32
    }

    fn state_size_location(&self) -> u32 {
        STATE_SIZE_LOCATION as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_roundtrip() {
        let blob = encode_blob(Kernel::Blake2s, "test-build");
        assert_eq!(decode_blob(&blob).unwrap(), Kernel::Blake2s);
    }

    #[test]
    fn test_decode_rejects_foreign_blobs() {
        assert!(decode_blob(b"\0asm\x01\0\0\0").is_err());
        assert!(decode_blob(b"").is_err());

        let mut blob = encode_blob(Kernel::Md5, "x");
        blob[4] = 9;
        assert!(decode_blob(&blob).unwrap_err().contains("version"));

        let mut blob = encode_blob(Kernel::Md5, "");
        blob[5] = 200;
        assert!(decode_blob(&blob).is_err());
    }

    #[tokio::test]
    async fn test_compile_rejects_bad_blob() {
        let binary = ModuleBinary::build("bogus", b"not a module".to_vec());
        let err = NativeRuntime::new().compile(&binary).await.err().unwrap();
        assert!(matches!(err, EngineError::Compile { .. }));
    }

    #[test]
    fn test_instance_layout() {
        let instance = NativeInstance::new(Kernel::Md5);
        let location = instance.state_size_location() as usize;
        let size = u32::from_le_bytes(instance.memory()[location..location + 4].try_into().unwrap());
        assert_eq!(size as usize, Kernel::Md5.state_size());
        assert!(instance.buffer_offset() as usize >= instance.state_offset() as usize + size as usize);
        assert_eq!(instance.buffer_offset() % 8, 0);
    }

    #[test]
    fn test_update_out_of_bounds_faults() {
        let mut instance = NativeInstance::new(Kernel::Crc32);
        instance.set_memory_size(64).unwrap();
        instance.init(0).unwrap();
        let err = instance.update(65).unwrap_err();
        assert!(matches!(err, EngineError::ModuleFault { .. }));
    }

    #[test]
    fn test_calculate_matches_streaming_exports() {
        let mut instance = NativeInstance::new(Kernel::Md5);
        let offset = instance.buffer_offset() as usize;
        instance.memory_mut()[offset..offset + 3].copy_from_slice(b"abc");

        instance.calculate(3, 0, 0).unwrap();
        let one_shot = instance.memory()[offset..offset + 16].to_vec();

        instance.memory_mut()[offset..offset + 3].copy_from_slice(b"abc");
        instance.init(0).unwrap();
        instance.update(3).unwrap();
        instance.finalize(0).unwrap();
        assert_eq!(instance.memory()[offset..offset + 16], one_shot[..]);
        assert_eq!(hex::encode(one_shot), "900150983cd24fb0d6963f7d28e17f72");
    }
}
