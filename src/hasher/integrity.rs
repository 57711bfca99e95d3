//! Hashing readers and files through a streaming hasher

use super::{Algorithm, Binding, Hasher};
use crate::error::{EngineError, IoResultExt, Result};
use crate::registry::ModuleRegistry;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read buffer used by the file helpers (1 MB)
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Digest of a file or stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    /// The hash algorithm used
    pub algorithm: Algorithm,
    /// Digest as lowercase hex
    pub hash: String,
    /// Bytes hashed
    pub size: u64,
}

impl FileDigest {
    /// Whether two digests were taken with the same algorithm and agree
    pub fn verify(&self, other: &FileDigest) -> bool {
        self.algorithm == other.algorithm && self.hash == other.hash
    }
}

impl std::fmt::Display for FileDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hash)
    }
}

/// Feed everything `reader` yields into `hasher` and finish it
pub fn hash_reader<R: Read>(hasher: &mut Hasher, mut reader: R) -> Result<FileDigest> {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buffer[..bytes_read])?;
        size += bytes_read as u64;
    }

    Ok(FileDigest {
        algorithm: hasher.algorithm(),
        hash: hasher.digest_hex()?,
        size,
    })
}

/// Digest a file on the global registry
pub async fn hash_file(path: &Path, binding: Binding) -> Result<FileDigest> {
    hash_file_with_buffer(ModuleRegistry::global(), path, binding, READ_BUFFER_SIZE).await
}

/// Digest a file with a custom read buffer size
pub async fn hash_file_with_buffer(
    registry: &ModuleRegistry,
    path: &Path,
    binding: Binding,
    buffer_size: usize,
) -> Result<FileDigest> {
    if buffer_size == 0 {
        return Err(EngineError::invalid("read buffer size must be non-zero"));
    }

    let mut file = tokio::fs::File::open(path).await.with_path(path)?;
    let mut hasher = Hasher::create(registry, binding).await?;
    let mut buffer = vec![0u8; buffer_size];
    let mut size = 0u64;

    loop {
        let bytes_read = file.read(&mut buffer).await.with_path(path)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read])?;
        size += bytes_read as u64;
    }

    tracing::debug!("Hashed {} bytes of {} with {}", size, path.display(), hasher.algorithm());
    Ok(FileDigest {
        algorithm: hasher.algorithm(),
        hash: hasher.digest_hex()?,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{create_md5, sha256};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join("test.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_hash_file_matches_memory() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
        let path = create_test_file(dir.path(), &content);

        let file_digest = hash_file(&path, Binding::sha256()).await.unwrap();
        assert_eq!(file_digest.size, content.len() as u64);
        assert_eq!(file_digest.hash, sha256(&content).await.unwrap());
        assert_eq!(file_digest.algorithm, Algorithm::Sha256);
    }

    #[tokio::test]
    async fn test_small_buffer_same_digest() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), b"Test file content for hashing");

        let a = hash_file(&path, Binding::crc32c()).await.unwrap();
        let b = hash_file_with_buffer(ModuleRegistry::global(), &path, Binding::crc32c(), 3)
            .await
            .unwrap();
        assert!(a.verify(&b));
        assert!(hash_file_with_buffer(ModuleRegistry::global(), &path, Binding::crc32c(), 0)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.bin");
        let err = hash_file(&path, Binding::md5()).await.unwrap_err();
        assert!(err.to_string().contains("missing.bin"));
    }

    #[tokio::test]
    async fn test_hash_reader() {
        let mut hasher = create_md5().await.unwrap();
        let digest = hash_reader(&mut hasher, &b"abc"[..]).unwrap();
        assert_eq!(digest.hash, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(digest.size, 3);
        assert_eq!(digest.to_string(), "md5:900150983cd24fb0d6963f7d28e17f72");
    }
}
