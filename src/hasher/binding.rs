//! Per-algorithm parameter encoding

use super::Algorithm;
use crate::error::{EngineError, Result};
use crate::native::{blake2s, crc32};
use serde::{Deserialize, Serialize};

/// Configuration record driving one generic engine
///
/// Produced by the validating constructors; fields are read-only once
/// built so the parameters always match the digest length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    algorithm: Algorithm,
    digest_size: usize,
    init_param: u32,
    digest_param: u32,
    /// Key or seed bytes written to the arena before every `init`
    staged: Option<Vec<u8>>,
}

impl Binding {
    fn plain(algorithm: Algorithm, init_param: u32) -> Self {
        Self {
            algorithm,
            digest_size: algorithm.default_digest_size(),
            init_param,
            digest_param: 0,
            staged: None,
        }
    }

    /// MD5
    pub fn md5() -> Self {
        Self::plain(Algorithm::Md5, 0)
    }

    /// SHA-224
    pub fn sha224() -> Self {
        Self::plain(Algorithm::Sha224, 224)
    }

    /// SHA-256
    pub fn sha256() -> Self {
        Self::plain(Algorithm::Sha256, 256)
    }

    /// CRC-32 with the IEEE polynomial
    pub fn crc32() -> Self {
        Self::plain(Algorithm::Crc32, crc32::POLY_IEEE)
    }

    /// CRC-32C with the Castagnoli polynomial
    pub fn crc32c() -> Self {
        Self::plain(Algorithm::Crc32c, crc32::POLY_CASTAGNOLI)
    }

    /// BLAKE2s with `bits` of output, optionally keyed
    ///
    /// `bits` must be a multiple of 8 in `8..=256`; keys are at most 32
    /// bytes. An empty key is the same as no key.
    pub fn blake2s(bits: u32, key: Option<&[u8]>) -> Result<Self> {
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(EngineError::invalid(format!(
                "Invalid variant! Valid values: 8, 16, ..., 256 (got {})",
                bits
            )));
        }

        let key = key.filter(|k| !k.is_empty());
        let key_len = key.map_or(0, <[u8]>::len);
        if key_len > blake2s::MAX_KEY_LEN {
            return Err(EngineError::KeyOrSeedLength {
                kind: "key",
                max: blake2s::MAX_KEY_LEN,
                actual: key_len,
            });
        }

        Ok(Self {
            algorithm: Algorithm::Blake2s,
            digest_size: (bits / 8) as usize,
            init_param: blake2s::init_param(bits, key_len),
            digest_param: 0,
            staged: key.map(<[u8]>::to_vec),
        })
    }

    /// xxHash64 with a 64-bit seed
    pub fn xxhash64(seed: u64) -> Self {
        let mut binding = Self::plain(Algorithm::Xxhash64, 0);
        binding.staged = Some(seed.to_le_bytes().to_vec());
        binding
    }

    /// Default binding for `algorithm`: unkeyed, seed 0, full output
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => Self::md5(),
            Algorithm::Sha224 => Self::sha224(),
            Algorithm::Sha256 => Self::sha256(),
            Algorithm::Crc32 => Self::crc32(),
            Algorithm::Crc32c => Self::crc32c(),
            Algorithm::Blake2s => Self::plain(Algorithm::Blake2s, blake2s::init_param(256, 0)),
            Algorithm::Xxhash64 => Self::xxhash64(0),
        }
    }

    /// Bound algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Parameter passed to `init`
    pub fn init_param(&self) -> u32 {
        self.init_param
    }

    /// Parameter passed to `digest`
    pub fn digest_param(&self) -> u32 {
        self.digest_param
    }

    /// Bytes staged in the arena before `init`
    pub fn staged(&self) -> Option<&[u8]> {
        self.staged.as_deref()
    }
}
