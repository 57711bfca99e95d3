//! Module distribution artifacts
//!
//! A module ships as a named binary blob plus a precomputed 4-byte
//! fingerprint of that blob. The fingerprint is derived once, when the
//! artifact is built, and compared verbatim when snapshots are restored.

use crate::error::{EngineError, IoResultExt, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Length of a build fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 4;

/// Short identifier of one specific module build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wrap raw fingerprint bytes
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the fingerprint of a module blob (truncated SHA-256)
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(bytes)
    }

    /// Parse a fingerprint from its hex form (up to 8 hex characters)
    ///
    /// Shorter strings are left-aligned and zero padded, so a build that
    /// ships a truncated hash still compares byte for byte.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let decoded = hex::decode(hex_str)
            .map_err(|e| EngineError::Manifest(format!("invalid fingerprint '{}': {}", hex_str, e)))?;
        if decoded.len() > FINGERPRINT_LEN {
            return Err(EngineError::Manifest(format!(
                "fingerprint '{}' is longer than {} bytes",
                hex_str, FINGERPRINT_LEN
            )));
        }
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes[..decoded.len()].copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    /// Raw fingerprint bytes
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A named module binary with its build fingerprint
#[derive(Debug, Clone)]
pub struct ModuleBinary {
    name: String,
    data: Arc<[u8]>,
    fingerprint: Fingerprint,
}

impl ModuleBinary {
    /// Create a binary from parts, trusting the supplied fingerprint
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>, fingerprint: Fingerprint) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            fingerprint,
        }
    }

    /// Create a binary and derive its fingerprint from the blob
    pub fn build(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let fingerprint = Fingerprint::of(&data);
        Self::new(name, data, fingerprint)
    }

    /// Algorithm identifier used as the module cache key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw module blob
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Precomputed build fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Parse an artifact manifest (`{"name", "data", "hash"}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: ArtifactManifest = serde_json::from_str(json)?;
        manifest.into_binary()
    }

    /// Serialize to an artifact manifest
    pub fn to_json(&self) -> Result<String> {
        let manifest = ArtifactManifest {
            name: self.name.clone(),
            data: BASE64.encode(&self.data),
            hash: self.fingerprint.to_hex(),
        };
        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    /// Load an artifact manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_path(path)?;
        Self::from_json(&json)
    }

    /// Write an artifact manifest to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).with_path(path)?;
        Ok(())
    }
}

/// On-disk artifact format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactManifest {
    /// Algorithm identifier
    name: String,
    /// Base64-encoded module blob
    data: String,
    /// Hex-encoded build fingerprint
    hash: String,
}

impl ArtifactManifest {
    fn into_binary(self) -> Result<ModuleBinary> {
        if self.name.is_empty() {
            return Err(EngineError::Manifest("artifact has an empty name".to_string()));
        }
        let data = BASE64
            .decode(&self.data)
            .map_err(|e| EngineError::Manifest(format!("invalid data for '{}': {}", self.name, e)))?;
        let fingerprint = Fingerprint::from_hex(&self.hash)?;
        Ok(ModuleBinary::new(self.name, data, fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::of(b"module bytes");
        let b = Fingerprint::of(b"module bytes");
        let c = Fingerprint::of(b"module bytes v2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_hex().len(), 8);
    }

    #[test]
    fn test_fingerprint_hex() {
        let fp = Fingerprint::from_hex("0a1b2c3d").unwrap();
        assert_eq!(fp.as_bytes(), &[0x0a, 0x1b, 0x2c, 0x3d]);
        assert_eq!(fp.to_string(), "0a1b2c3d");

        let short = Fingerprint::from_hex("ff").unwrap();
        assert_eq!(short.as_bytes(), &[0xff, 0, 0, 0]);

        assert!(Fingerprint::from_hex("0011223344").is_err());
        assert!(Fingerprint::from_hex("zz").is_err());
    }

    #[test]
    fn test_manifest_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md5.json");

        let binary = ModuleBinary::build("md5", b"\0nhk payload".to_vec());
        binary.save(&path).unwrap();

        let loaded = ModuleBinary::load(&path).unwrap();
        assert_eq!(loaded.name(), "md5");
        assert_eq!(loaded.data(), binary.data());
        assert_eq!(loaded.fingerprint(), binary.fingerprint());
    }

    #[test]
    fn test_manifest_data_is_base64() {
        let binary = ModuleBinary::new("adler32", b"\0asm".to_vec(), Fingerprint::from_bytes([1, 2, 3, 4]));
        let json = binary.to_json().unwrap();
        assert!(json.contains("\"data\": \"AGFzbQ==\""));
        assert!(json.contains("\"hash\": \"01020304\""));
    }

    #[test]
    fn test_manifest_keeps_shipped_fingerprint() {
        let json = r#"{"name": "crc32", "data": "AAECAw==", "hash": "deadbeef"}"#;
        let binary = ModuleBinary::from_json(json).unwrap();
        assert_eq!(binary.fingerprint().to_hex(), "deadbeef");
        assert_eq!(binary.data(), &[0, 1, 2, 3]);
        assert_ne!(binary.fingerprint(), Fingerprint::of(binary.data()));
    }

    #[test]
    fn test_manifest_rejects_garbage() {
        assert!(ModuleBinary::from_json(r#"{"name": "", "data": "", "hash": ""}"#).is_err());
        assert!(ModuleBinary::from_json(r#"{"name": "x", "data": "not base64!", "hash": ""}"#).is_err());
        assert!(matches!(
            ModuleBinary::load(Path::new("/nonexistent/artifact.json")),
            Err(EngineError::Io { .. })
        ));
    }
}
