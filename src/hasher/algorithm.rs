//! Supported algorithms

use crate::engine::FastPathPolicy;
use crate::error::{EngineError, Result};
use crate::module::ModuleBinary;
use crate::native::Kernel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Hash and checksum algorithms with a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// MD5 (128-bit)
    Md5,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// CRC-32 (IEEE 802.3)
    Crc32,
    /// CRC-32C (Castagnoli)
    Crc32c,
    /// BLAKE2s with 8..=256 bit output, optionally keyed
    Blake2s,
    /// xxHash64 with a 64-bit seed
    Xxhash64,
}

impl Algorithm {
    /// Every algorithm
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Md5,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Crc32,
        Algorithm::Crc32c,
        Algorithm::Blake2s,
        Algorithm::Xxhash64,
    ];

    /// Lowercase identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Crc32 => "crc32",
            Self::Crc32c => "crc32c",
            Self::Blake2s => "blake2s",
            Self::Xxhash64 => "xxhash64",
        }
    }

    /// Kernel implementing this algorithm; variants may share one
    pub fn kernel(&self) -> Kernel {
        match self {
            Self::Md5 => Kernel::Md5,
            Self::Sha224 | Self::Sha256 => Kernel::Sha256,
            Self::Crc32 | Self::Crc32c => Kernel::Crc32,
            Self::Blake2s => Kernel::Blake2s,
            Self::Xxhash64 => Kernel::XxHash64,
        }
    }

    /// Module binary the engine is bound to
    pub fn artifact(&self) -> Arc<ModuleBinary> {
        self.kernel().artifact()
    }

    /// Internal block size in bytes
    pub fn block_size(&self) -> usize {
        match self {
            Self::Md5 | Self::Sha224 | Self::Sha256 | Self::Blake2s => 64,
            Self::Crc32 | Self::Crc32c => 4,
            Self::Xxhash64 => 32,
        }
    }

    /// Digest length in bytes with default parameters
    pub fn default_digest_size(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha224 => 28,
            Self::Sha256 | Self::Blake2s => 32,
            Self::Crc32 | Self::Crc32c => 4,
            Self::Xxhash64 => 8,
        }
    }

    /// When `calculate` may take the single native call
    pub fn fast_path(&self) -> FastPathPolicy {
        match self {
            Self::Blake2s => FastPathPolicy::KeyedBlock,
            // The seed sits in the arena at every init
            Self::Xxhash64 => FastPathPolicy::Never,
            _ => FastPathPolicy::ShortInput,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == lower)
            .ok_or_else(|| EngineError::invalid(format!("Unknown algorithm: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("xxhash64".parse::<Algorithm>().unwrap(), Algorithm::Xxhash64);
        assert!("sha3".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_variants_share_kernels() {
        assert_eq!(Algorithm::Sha224.artifact().name(), "sha256");
        assert_eq!(Algorithm::Crc32c.kernel(), Kernel::Crc32);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Algorithm::Crc32c).unwrap();
        assert_eq!(json, "\"crc32c\"");
    }
}
