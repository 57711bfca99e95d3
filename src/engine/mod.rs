//! Streaming hash engine
//!
//! Binds one module instance to a fixed-size memory arena and exposes the
//! `init -> update* -> digest` state machine, the single-shot fast path
//! and state snapshots.

mod fast_path;
pub mod snapshot;
mod streaming;

pub use fast_path::*;
pub use streaming::*;

use serde::{Deserialize, Serialize};

/// Default arena capacity and streaming chunk size (16 KiB)
pub const MAX_HEAP: usize = 16 * 1024;

/// Output encoding requested from `digest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Raw digest bytes
    Binary,
    /// Lowercase hexadecimal string
    #[default]
    Hex,
}

/// A finished digest in the requested encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutput {
    /// Raw digest bytes
    Binary(Vec<u8>),
    /// Lowercase hexadecimal string
    Hex(String),
}

impl DigestOutput {
    /// Lowercase hex form, encoding raw bytes if needed
    pub fn into_hex(self) -> String {
        match self {
            Self::Binary(bytes) => hex::encode(bytes),
            Self::Hex(s) => s,
        }
    }

    /// Raw byte form, decoding hex if needed
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Binary(bytes) => bytes,
            // Produced by hex::encode, always valid
            Self::Hex(s) => hex::decode(&s).unwrap_or_default(),
        }
    }

    /// Digest length in bytes
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Hex(s) => s.len() / 2,
        }
    }

    /// Whether the digest is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for DigestOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary(bytes) => write!(f, "{}", hex::encode(bytes)),
            Self::Hex(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_output_conversions() {
        let binary = DigestOutput::Binary(vec![0xde, 0xad]);
        assert_eq!(binary.len(), 2);
        assert_eq!(binary.to_string(), "dead");
        assert_eq!(binary.clone().into_hex(), "dead");

        let hex = DigestOutput::Hex("beef".to_string());
        assert_eq!(hex.len(), 2);
        assert_eq!(hex.into_bytes(), vec![0xbe, 0xef]);
    }

    #[test]
    fn test_output_kind_serde() {
        assert_eq!(OutputKind::default(), OutputKind::Hex);
        let kind: OutputKind = serde_json::from_str("\"binary\"").unwrap();
        assert_eq!(kind, OutputKind::Binary);
    }
}
