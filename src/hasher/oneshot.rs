//! Single-shot helpers over shared engines
//!
//! Each (algorithm, digest length) pair gets one engine per registry,
//! reused by every caller. The shared engine's lock is held for the whole
//! compute sequence.

use super::Binding;
use crate::error::Result;
use crate::registry::ModuleRegistry;

/// Hex digest of `data` under `binding`, on the given registry
pub async fn calculate_with(registry: &ModuleRegistry, binding: &Binding, data: &[u8]) -> Result<String> {
    let algorithm = binding.algorithm();
    let shared = registry
        .shared_engine(algorithm.artifact(), binding.digest_size())
        .await?;

    shared.with(|engine| {
        if let Some(staged) = binding.staged() {
            engine.write_arena(staged, 0)?;
        }
        engine.calculate(
            data,
            algorithm.fast_path(),
            binding.init_param(),
            binding.digest_param(),
        )
    })
}

/// Hex digest of `data` under `binding`, on the global registry
pub async fn calculate(binding: &Binding, data: &[u8]) -> Result<String> {
    calculate_with(ModuleRegistry::global(), binding, data).await
}

/// MD5 of `data` as lowercase hex
pub async fn md5(data: impl AsRef<[u8]>) -> Result<String> {
    calculate(&Binding::md5(), data.as_ref()).await
}

/// SHA-224 of `data` as lowercase hex
pub async fn sha224(data: impl AsRef<[u8]>) -> Result<String> {
    calculate(&Binding::sha224(), data.as_ref()).await
}

/// SHA-256 of `data` as lowercase hex
pub async fn sha256(data: impl AsRef<[u8]>) -> Result<String> {
    calculate(&Binding::sha256(), data.as_ref()).await
}

/// CRC-32 of `data` as lowercase hex
pub async fn crc32(data: impl AsRef<[u8]>) -> Result<String> {
    calculate(&Binding::crc32(), data.as_ref()).await
}

/// CRC-32C of `data` as lowercase hex
pub async fn crc32c(data: impl AsRef<[u8]>) -> Result<String> {
    calculate(&Binding::crc32c(), data.as_ref()).await
}

/// BLAKE2s of `data` with `bits` of output, optionally keyed
pub async fn blake2s(data: impl AsRef<[u8]>, bits: u32, key: Option<&[u8]>) -> Result<String> {
    calculate(&Binding::blake2s(bits, key)?, data.as_ref()).await
}

/// xxHash64 of `data` with `seed`
pub async fn xxhash64(data: impl AsRef<[u8]>, seed: u64) -> Result<String> {
    calculate(&Binding::xxhash64(seed), data.as_ref()).await
}
