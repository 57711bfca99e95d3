//! Streaming hasher objects

use super::{Algorithm, Binding};
use crate::engine::{DigestOutput, Engine, OutputKind};
use crate::error::Result;
use crate::registry::ModuleRegistry;
use std::io;

/// A private streaming hasher
///
/// Owns its own engine instance, so any number of hashers can run side
/// by side. Created already initialized.
#[derive(Debug)]
pub struct Hasher {
    binding: Binding,
    engine: Engine,
}

impl Hasher {
    /// Instantiate `binding` through `registry` and initialize it
    pub async fn create(registry: &ModuleRegistry, binding: Binding) -> Result<Self> {
        let engine = registry
            .create_engine(binding.algorithm().artifact(), binding.digest_size())
            .await?;
        let mut hasher = Self { binding, engine };
        hasher.init()?;
        Ok(hasher)
    }

    /// Restart the computation, re-staging any key or seed
    pub fn init(&mut self) -> Result<&mut Self> {
        if let Some(staged) = self.binding.staged() {
            self.engine.write_arena(staged, 0)?;
        }
        self.engine.init(self.binding.init_param())?;
        Ok(self)
    }

    /// Feed more input
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> Result<&mut Self> {
        self.engine.update(data.as_ref())?;
        Ok(self)
    }

    /// Finish and return the digest; `init` is required before reuse
    pub fn digest(&mut self, kind: OutputKind) -> Result<DigestOutput> {
        self.engine.digest(kind, self.binding.digest_param())
    }

    /// Finish and return the lowercase hex digest
    pub fn digest_hex(&mut self) -> Result<String> {
        Ok(self.digest(OutputKind::Hex)?.into_hex())
    }

    /// Finish and return the raw digest bytes
    pub fn digest_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.digest(OutputKind::Binary)?.into_bytes())
    }

    /// Snapshot the in-progress state
    pub fn save(&self) -> Result<Vec<u8>> {
        self.engine.save()
    }

    /// Resume from a snapshot taken by a hasher of the same build
    pub fn load(&mut self, snapshot: &[u8]) -> Result<&mut Self> {
        self.engine.load(snapshot)?;
        Ok(self)
    }

    /// Bound algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.binding.algorithm()
    }

    /// Internal block size in bytes
    pub fn block_size(&self) -> usize {
        self.binding.algorithm().block_size()
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        self.binding.digest_size()
    }
}

impl io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.engine.update(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streaming MD5 hasher over the global registry
pub async fn create_md5() -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::md5()).await
}

/// Streaming SHA-224 hasher over the global registry
pub async fn create_sha224() -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::sha224()).await
}

/// Streaming SHA-256 hasher over the global registry
pub async fn create_sha256() -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::sha256()).await
}

/// Streaming CRC-32 hasher over the global registry
pub async fn create_crc32() -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::crc32()).await
}

/// Streaming CRC-32C hasher over the global registry
pub async fn create_crc32c() -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::crc32c()).await
}

/// Streaming BLAKE2s hasher over the global registry
pub async fn create_blake2s(bits: u32, key: Option<&[u8]>) -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::blake2s(bits, key)?).await
}

/// Streaming xxHash64 hasher over the global registry
pub async fn create_xxhash64(seed: u64) -> Result<Hasher> {
    Hasher::create(ModuleRegistry::global(), Binding::xxhash64(seed)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::io::Write;

    #[tokio::test]
    async fn test_chained_updates() {
        let mut hasher = create_md5().await.unwrap();
        let digest = hasher.update("a").unwrap().update(b"bc").unwrap().digest_hex().unwrap();
        assert_eq!(digest, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(hasher.block_size(), 64);
        assert_eq!(hasher.digest_size(), 16);
    }

    #[tokio::test]
    async fn test_reinit_after_digest() {
        let mut hasher = create_sha224().await.unwrap();
        hasher.update("x").unwrap();
        hasher.digest_hex().unwrap();
        assert!(hasher.digest_hex().unwrap_err().is_sequence_error());

        let digest = hasher.init().unwrap().update("a").unwrap().digest_hex().unwrap();
        assert_eq!(digest, "abd37534c7d9a2efb9465de931cd7055ffdb8879563ae98078d6d6d5");
    }

    #[tokio::test]
    async fn test_keyed_blake2s_survives_reinit() {
        let mut hasher = create_blake2s(256, Some(b"secret")).await.unwrap();
        hasher.update(vec![0u8; 50_000]).unwrap();
        hasher.digest_hex().unwrap();

        // The arena was overwritten by input; init must re-stage the key
        let digest = hasher.init().unwrap().update("a").unwrap().digest_hex().unwrap();
        assert_eq!(
            digest,
            "6252d094f32c706b6fa11529126bdf2910c4dd7638bf866348808df63f62531d"
        );
    }

    #[tokio::test]
    async fn test_xxhash64_seed_matches_reference() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7) as u8).collect();
        for seed in [0u64, 1, 0xdead_beef_cafe_f00d] {
            let mut hasher = create_xxhash64(seed).await.unwrap();
            let digest = hasher.update(&data).unwrap().digest_bytes().unwrap();
            let expected = xxhash_rust::xxh64::xxh64(&data, seed).to_be_bytes();
            assert_eq!(digest, expected.to_vec(), "seed {:#x}", seed);
        }
    }

    #[tokio::test]
    async fn test_save_load_across_hashers() {
        let mut first = create_sha256().await.unwrap();
        first.update(vec![1u8; 20_000]).unwrap();
        let snapshot = first.save().unwrap();

        let mut second = create_sha256().await.unwrap();
        second.load(&snapshot).unwrap().update(vec![2u8; 100]).unwrap();
        first.update(vec![2u8; 100]).unwrap();
        assert_eq!(first.digest_hex().unwrap(), second.digest_hex().unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_rejected_across_algorithms() {
        let mut md5 = create_md5().await.unwrap();
        md5.update("a").unwrap();
        let snapshot = md5.save().unwrap();

        let mut crc = create_crc32().await.unwrap();
        let err = crc.load(&snapshot).unwrap_err();
        assert!(matches!(err, EngineError::SnapshotLengthMismatch { .. }));
    }

    #[tokio::test]
    async fn test_io_write() {
        let mut hasher = create_crc32().await.unwrap();
        hasher.write_all(b"123456789").unwrap();
        hasher.flush().unwrap();
        assert_eq!(hasher.digest_hex().unwrap(), "cbf43926");

        let err = hasher.write(b"more").unwrap_err();
        assert!(err.to_string().contains("update() called before init()"));
    }
}
