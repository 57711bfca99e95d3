//! Native reference modules
//!
//! A small in-process runtime whose kernels honour the same module
//! contract as any external build: every byte of algorithm state lives in
//! the instance's linear memory, inputs arrive through the I/O buffer and
//! digests leave through it.

pub mod blake2s;
pub mod crc32;
mod md5;
mod runtime;
mod sha256;
mod state;
pub mod xxhash64;

pub use runtime::*;

use crate::module::ModuleBinary;
use std::sync::{Arc, OnceLock};

/// Build tag baked into every native artifact of this crate version
pub const BUILD_TAG: &str = concat!("hashengine-native/", env!("CARGO_PKG_VERSION"), "/layout-1");

/// Reference kernels available to the native runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// MD5
    Md5,
    /// SHA-224 and SHA-256
    Sha256,
    /// CRC-32 with a caller-chosen polynomial
    Crc32,
    /// BLAKE2s, optionally keyed
    Blake2s,
    /// xxHash64 with a staged seed
    XxHash64,
}

impl Kernel {
    /// Every kernel, in declaration order
    pub const ALL: [Kernel; 5] = [
        Kernel::Md5,
        Kernel::Sha256,
        Kernel::Crc32,
        Kernel::Blake2s,
        Kernel::XxHash64,
    ];

    /// Module identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Crc32 => "crc32",
            Self::Blake2s => "blake2s",
            Self::XxHash64 => "xxhash64",
        }
    }

    /// Look a kernel up by module identifier
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Size of the kernel's state region in bytes
    pub fn state_size(&self) -> usize {
        match self {
            Self::Md5 => md5::STATE_SIZE,
            Self::Sha256 => sha256::STATE_SIZE,
            Self::Crc32 => crc32::STATE_SIZE,
            Self::Blake2s => blake2s::STATE_SIZE,
            Self::XxHash64 => xxhash64::STATE_SIZE,
        }
    }

    /// Bytes finalize writes to the I/O buffer
    pub fn output_len(&self) -> usize {
        match self {
            Self::Md5 => md5::OUTPUT_LEN,
            Self::Sha256 => sha256::OUTPUT_LEN,
            Self::Crc32 => crc32::OUTPUT_LEN,
            Self::Blake2s => blake2s::OUTPUT_LEN,
            Self::XxHash64 => xxhash64::OUTPUT_LEN,
        }
    }

    fn init(&self, state: &mut [u8], buffer: &[u8], param: u32) {
        match self {
            Self::Md5 => md5::init(state, buffer, param),
            Self::Sha256 => sha256::init(state, buffer, param),
            Self::Crc32 => crc32::init(state, buffer, param),
            Self::Blake2s => blake2s::init(state, buffer, param),
            Self::XxHash64 => xxhash64::init(state, buffer, param),
        }
    }

    fn update(&self, state: &mut [u8], data: &[u8]) {
        match self {
            Self::Md5 => md5::update(state, data),
            Self::Sha256 => sha256::update(state, data),
            Self::Crc32 => crc32::update(state, data),
            Self::Blake2s => blake2s::update(state, data),
            Self::XxHash64 => xxhash64::update(state, data),
        }
    }

    fn finalize(&self, state: &mut [u8], out: &mut [u8], param: u32) {
        match self {
            Self::Md5 => md5::finalize(state, out, param),
            Self::Sha256 => sha256::finalize(state, out, param),
            Self::Crc32 => crc32::finalize(state, out, param),
            Self::Blake2s => blake2s::finalize(state, out, param),
            Self::XxHash64 => xxhash64::finalize(state, out, param),
        }
    }

    /// The shipped artifact for this kernel
    ///
    /// Artifacts and their fingerprints are built once per process.
    pub fn artifact(&self) -> Arc<ModuleBinary> {
        static ARTIFACTS: OnceLock<[Arc<ModuleBinary>; 5]> = OnceLock::new();
        let artifacts = ARTIFACTS.get_or_init(|| {
            std::array::from_fn(|i| Arc::new(build_artifact(Kernel::ALL[i], BUILD_TAG)))
        });
        Arc::clone(&artifacts[*self as usize])
    }
}

/// Build a native artifact with an explicit build tag
pub fn build_artifact(kernel: Kernel, build_tag: &str) -> ModuleBinary {
    ModuleBinary::build(kernel.name(), encode_blob(kernel, build_tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_names_roundtrip() {
        for kernel in Kernel::ALL {
            assert_eq!(Kernel::from_name(kernel.name()), Some(kernel));
        }
        assert_eq!(Kernel::from_name("whirlpool"), None);
    }

    #[test]
    fn test_artifacts_are_memoized() {
        let a = Kernel::Sha256.artifact();
        let b = Kernel::Sha256.artifact();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "sha256");
    }

    #[test]
    fn test_build_tag_changes_fingerprint() {
        let shipped = Kernel::Md5.artifact();
        let rebuilt = build_artifact(Kernel::Md5, "hashengine-native/other");
        assert_eq!(shipped.name(), rebuilt.name());
        assert_ne!(shipped.fingerprint(), rebuilt.fingerprint());
    }

    #[test]
    fn test_state_sizes() {
        assert_eq!(Kernel::Md5.state_size(), 92);
        assert_eq!(Kernel::Sha256.state_size(), 108);
        assert_eq!(Kernel::Crc32.state_size(), 8);
        assert_eq!(Kernel::Blake2s.state_size(), 112);
        assert_eq!(Kernel::XxHash64.state_size(), 84);
    }
}
