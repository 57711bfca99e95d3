//! Streaming engine over one module instance
//!
//! Owns the instance, its memory arena and the readiness flag, and
//! drives `init -> update* -> digest` plus `save`/`load` and the
//! single-shot `calculate`.

use super::{snapshot, DigestOutput, FastPathPolicy, OutputKind};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::module::{ModuleBinary, ModuleInstance};
use std::fmt;
use std::sync::Arc;

/// Streaming state of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// `init` required before `update`, `digest` or `save`
    Uninitialized,
    /// Accepting input
    Ready,
}

/// Live binding of one module instance, its arena and readiness flag
pub struct Engine {
    binary: Arc<ModuleBinary>,
    instance: Box<dyn ModuleInstance>,
    digest_size: usize,
    chunk_size: usize,
    arena_offset: usize,
    arena_len: usize,
    ready: bool,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("module", &self.binary.name())
            .field("digest_size", &self.digest_size)
            .field("arena_offset", &self.arena_offset)
            .field("arena_len", &self.arena_len)
            .field("ready", &self.ready)
            .finish()
    }
}

impl Engine {
    /// Bind a fresh instance and negotiate its arena
    pub fn bind(
        binary: Arc<ModuleBinary>,
        instance: Box<dyn ModuleInstance>,
        digest_size: usize,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        if digest_size == 0 || digest_size > config.arena_capacity {
            return Err(EngineError::invalid(format!(
                "digest size {} does not fit the arena",
                digest_size
            )));
        }

        let mut engine = Self {
            binary,
            instance,
            digest_size,
            chunk_size: config.arena_capacity,
            arena_offset: 0,
            arena_len: 0,
            ready: false,
        };
        engine.set_memory_size(config.arena_capacity)?;
        Ok(engine)
    }

    /// Module identifier
    pub fn name(&self) -> &str {
        self.binary.name()
    }

    /// Bound module binary
    pub fn binary(&self) -> &Arc<ModuleBinary> {
        &self.binary
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Current streaming state
    pub fn state(&self) -> EngineState {
        if self.ready {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    /// Whether `init` has been called since the last `digest`
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Arena capacity in bytes
    pub fn arena_capacity(&self) -> usize {
        self.arena_len
    }

    /// Ask the module for `total` bytes of buffer and remap the arena
    ///
    /// The module may move its buffer, so any previously read offset is
    /// stale afterwards.
    pub fn set_memory_size(&mut self, total: usize) -> Result<()> {
        if total < self.chunk_size {
            return Err(EngineError::invalid(format!(
                "memory size {} is smaller than the {} byte streaming chunk",
                total, self.chunk_size
            )));
        }
        let bytes = u32::try_from(total)
            .map_err(|_| EngineError::invalid(format!("memory size {} exceeds 32 bits", total)))?;

        self.instance.set_memory_size(bytes)?;
        let offset = self.instance.buffer_offset() as usize;
        if offset + total > self.instance.memory().len() {
            return Err(EngineError::fault(
                self.name(),
                format!("buffer at {} does not hold {} bytes", offset, total),
            ));
        }

        self.arena_offset = offset;
        self.arena_len = total;
        tracing::debug!(
            "Negotiated {} byte arena at offset {} for '{}'",
            total,
            offset,
            self.binary.name()
        );
        Ok(())
    }

    /// Read-only view of the arena
    pub fn arena(&self) -> &[u8] {
        &self.instance.memory()[self.arena_offset..self.arena_offset + self.arena_len]
    }

    fn arena_mut(&mut self) -> &mut [u8] {
        let (start, end) = (self.arena_offset, self.arena_offset + self.arena_len);
        &mut self.instance.memory_mut()[start..end]
    }

    /// Stage bytes (key or seed material) in the arena
    pub fn write_arena(&mut self, data: &[u8], offset: usize) -> Result<()> {
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= self.arena_len)
            .ok_or_else(|| {
                EngineError::invalid(format!(
                    "{} bytes at offset {} overflow the {} byte arena",
                    data.len(),
                    offset,
                    self.arena_len
                ))
            })?;
        self.arena_mut()[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Reset the algorithm state; valid in any state
    pub fn init(&mut self, param: u32) -> Result<()> {
        self.ready = false;
        self.instance.init(param)?;
        self.ready = true;
        Ok(())
    }

    /// Absorb `data`, one arena-sized chunk at a time
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if !self.ready {
            return Err(EngineError::sequence("update", "before init()"));
        }

        let mut chunks = 0usize;
        for chunk in data.chunks(self.chunk_size) {
            self.arena_mut()[..chunk.len()].copy_from_slice(chunk);
            if let Err(e) = self.instance.update(chunk.len() as u32) {
                self.ready = false;
                return Err(e);
            }
            chunks += 1;
        }
        tracing::trace!("Absorbed {} bytes in {} chunks into '{}'", data.len(), chunks, self.name());
        Ok(())
    }

    /// Finish the computation and return the digest
    pub fn digest(&mut self, kind: OutputKind, digest_param: u32) -> Result<DigestOutput> {
        if !self.ready {
            return Err(EngineError::sequence("digest", "before init()"));
        }
        self.ready = false;

        self.instance.finalize(digest_param)?;
        Ok(self.read_digest(kind))
    }

    fn read_digest(&self, kind: OutputKind) -> DigestOutput {
        let bytes = &self.arena()[..self.digest_size];
        match kind {
            OutputKind::Binary => DigestOutput::Binary(bytes.to_vec()),
            OutputKind::Hex => DigestOutput::Hex(hex::encode(bytes)),
        }
    }

    /// Single-shot digest as lowercase hex
    ///
    /// Takes the combined native call when `policy` allows it, otherwise
    /// runs the full `init/update/digest` sequence. Either way the engine
    /// ends up `Uninitialized`.
    pub fn calculate(
        &mut self,
        data: &[u8],
        policy: FastPathPolicy,
        init_param: u32,
        digest_param: u32,
    ) -> Result<String> {
        if !policy.allows(data.len(), init_param, self.chunk_size) {
            tracing::trace!("Fast path declined for '{}' ({} bytes)", self.name(), data.len());
            self.init(init_param)?;
            self.update(data)?;
            return Ok(self.digest(OutputKind::Hex, digest_param)?.into_hex());
        }

        if data.len() > self.arena_len {
            return Err(EngineError::invalid(format!(
                "{} byte input does not fit the {} byte arena",
                data.len(),
                self.arena_len
            )));
        }

        self.ready = false;
        self.arena_mut()[..data.len()].copy_from_slice(data);
        self.instance
            .calculate(data.len() as u32, init_param, digest_param)?;
        Ok(self.read_digest(OutputKind::Hex).into_hex())
    }

    fn state_size(&self) -> Result<usize> {
        let location = self.instance.state_size_location() as usize;
        let bytes = self
            .instance
            .memory()
            .get(location..location + 4)
            .ok_or_else(|| EngineError::fault(self.name(), "state size location out of bounds"))?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    }

    fn state_range(&self) -> Result<(usize, usize)> {
        let offset = self.instance.state_offset() as usize;
        let size = self.state_size()?;
        if offset + size > self.instance.memory().len() {
            return Err(EngineError::fault(self.name(), "state region out of bounds"));
        }
        Ok((offset, size))
    }

    /// Serialize the in-progress state
    pub fn save(&self) -> Result<Vec<u8>> {
        if !self.ready {
            return Err(EngineError::sequence(
                "save",
                "outside init() ... digest()",
            ));
        }
        let (offset, size) = self.state_range()?;
        let state = &self.instance.memory()[offset..offset + size];
        Ok(snapshot::encode(self.binary.fingerprint(), state))
    }

    /// Restore a state produced by `save`; valid in any state
    pub fn load(&mut self, snapshot_bytes: &[u8]) -> Result<()> {
        let (offset, size) = self.state_range()?;
        let state = match snapshot::decode(snapshot_bytes, self.binary.fingerprint(), size) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Rejected snapshot for '{}': {}", self.name(), e);
                return Err(e);
            }
        };
        self.instance.memory_mut()[offset..offset + size].copy_from_slice(state);
        self.ready = true;
        Ok(())
    }
}
