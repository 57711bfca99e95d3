//! Configuration settings for HashEngine
//!
//! Defines the engine configuration, its defaults and validation.

use crate::engine::MAX_HEAP;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Smallest arena that still holds one block of every reference kernel
pub const MIN_ARENA_CAPACITY: usize = 64;

/// Runtime configuration shared by every engine a registry creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Arena capacity in bytes; also the streaming chunk size
    pub arena_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arena_capacity: MAX_HEAP, // 16KB
        }
    }
}

impl EngineConfig {
    /// Create a config with an arena size given as a human-readable string
    pub fn with_arena_size(size: &str) -> Result<Self> {
        let bytes = parse_size(size)
            .map_err(|e| EngineError::invalid(format!("Invalid arena size: {}", e)))?;
        let config = Self {
            arena_capacity: bytes as usize,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the arena can hold at least one full block
    pub fn validate(&self) -> Result<()> {
        if self.arena_capacity < MIN_ARENA_CAPACITY {
            return Err(EngineError::invalid(format!(
                "arena capacity {} is below the minimum of {} bytes",
                self.arena_capacity, MIN_ARENA_CAPACITY
            )));
        }
        if self.arena_capacity > u32::MAX as usize {
            return Err(EngineError::invalid(format!(
                "arena capacity {} does not fit a 32-bit module address space",
                self.arena_capacity
            )));
        }
        Ok(())
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(|c| c == 'M' || c == 'B'), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(|c| c == 'K' || c == 'B'), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("Size overflows: {}", size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("16K").unwrap(), 16 * 1024);
        assert_eq!(parse_size("16kb").unwrap(), 16 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("64B").unwrap(), 64);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_default_matches_max_heap() {
        let config = EngineConfig::default();
        assert_eq!(config.arena_capacity, 16384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_arena_size() {
        let config = EngineConfig::with_arena_size("4K").unwrap();
        assert_eq!(config.arena_capacity, 4096);

        let err = EngineConfig::with_arena_size("32").unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json(r#"{"arena_capacity": 1024}"#).unwrap();
        assert_eq!(config.arena_capacity, 1024);

        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());

        assert!(EngineConfig::from_json(r#"{"arena_capacity": 8}"#).is_err());
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(EngineError::Manifest(_))
        ));
    }
}
