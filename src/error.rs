//! Error types for HashEngine
//!
//! This module defines every error the engine can report, from host
//! capability checks through sequencing mistakes to snapshot rejection.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for HashEngine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The host cannot execute the module format at all
    #[error("Module format is not supported by runtime '{0}'")]
    EnvironmentUnsupported(String),

    /// An operation was called in the wrong streaming state
    #[error("{operation}() called {reason}")]
    Sequence {
        /// Operation that was refused
        operation: &'static str,
        /// Why it was refused
        reason: &'static str,
    },

    /// Key or seed material exceeds the algorithm's bound
    #[error("Invalid {kind} length: {actual} bytes (maximum is {max} bytes)")]
    KeyOrSeedLength {
        /// "key" or "seed"
        kind: &'static str,
        /// Largest accepted length in bytes
        max: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// Malformed bit-width, variant, seed encoding or size
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Snapshot has the wrong total length for the current configuration
    #[error("Bad state length (expected {expected} bytes, got {actual})")]
    SnapshotLengthMismatch {
        /// Fingerprint plus state size
        expected: usize,
        /// Length of the supplied snapshot
        actual: usize,
    },

    /// Snapshot was written by a different module build
    #[error("State was written by an incompatible module build (expected fingerprint {expected}, found {found})")]
    SnapshotIncompatibleBuild {
        /// Fingerprint of the bound module, hex
        expected: String,
        /// Fingerprint in the snapshot, hex
        found: String,
    },

    /// Module binary could not be compiled
    #[error("Failed to compile module '{module}': {message}")]
    Compile {
        /// Module identifier
        module: String,
        /// Runtime-reported cause
        message: String,
    },

    /// Compiled module could not be instantiated
    #[error("Failed to instantiate module '{module}': {message}")]
    Instantiate {
        /// Module identifier
        module: String,
        /// Runtime-reported cause
        message: String,
    },

    /// A module call trapped or touched memory out of bounds
    #[error("Module '{module}' faulted: {message}")]
    ModuleFault {
        /// Module identifier
        module: String,
        /// Runtime-reported cause
        message: String,
    },

    /// I/O error while reading artifacts or input
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File involved, empty when unknown
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Artifact manifest parsing/writing error
    #[error("Manifest error: {0}")]
    Manifest(String),
}

impl EngineError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a sequencing error
    pub fn sequence(operation: &'static str, reason: &'static str) -> Self {
        Self::Sequence { operation, reason }
    }

    /// Create an invalid parameter error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create a module fault error
    pub fn fault(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleFault {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a compilation error
    pub fn compile(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compile {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a streaming sequence violation
    pub fn is_sequence_error(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }

    /// Check if this error rejected a snapshot
    pub fn is_snapshot_error(&self) -> bool {
        matches!(
            self,
            Self::SnapshotLengthMismatch { .. } | Self::SnapshotIncompatibleBuild { .. }
        )
    }

    /// Check if this error came from loading or running a module
    pub fn is_module_error(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentUnsupported(_)
                | Self::Compile { .. }
                | Self::Instantiate { .. }
                | Self::ModuleFault { .. }
        )
    }
}

/// Result type alias for HashEngine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Manifest(err.to_string())
    }
}

impl From<EngineError> for std::io::Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Io { source, .. } => source,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| EngineError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = EngineError::io("/test/md5.json", io_err);
        assert!(err.to_string().contains("/test/md5.json"));
    }

    #[test]
    fn test_error_classification() {
        assert!(EngineError::sequence("update", "before init()").is_sequence_error());
        assert!(EngineError::SnapshotLengthMismatch { expected: 96, actual: 3 }.is_snapshot_error());
        assert!(EngineError::compile("md5", "bad magic").is_module_error());
        assert!(!EngineError::invalid("bits").is_module_error());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::sequence("digest", "before init()");
        assert_eq!(err.to_string(), "digest() called before init()");

        let err = EngineError::SnapshotLengthMismatch { expected: 96, actual: 4 };
        assert_eq!(err.to_string(), "Bad state length (expected 96 bytes, got 4)");
    }

    #[test]
    fn test_module_error_display() {
        let err = EngineError::fault("crc32", "out of bounds memory access");
        assert_eq!(err.to_string(), "Module 'crc32' faulted: out of bounds memory access");

        let err = EngineError::Instantiate {
            module: "md5".to_string(),
            message: "memory limit".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to instantiate module 'md5': memory limit");
        assert!(err.is_module_error());
    }

    #[test]
    fn test_into_io_error() {
        let err: std::io::Error = EngineError::invalid("oops").into();
        assert_eq!(err.kind(), std::io::ErrorKind::Other);
    }
}
