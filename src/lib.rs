//! # HashEngine - Streaming Hashes over Opaque Computation Modules
//!
//! HashEngine drives many hash and checksum algorithms through one uniform
//! streaming API. Each algorithm lives in a separately compiled module with
//! a small fixed memory footprint; the engine only talks to it through a
//! handful of exports and one linear memory.
//!
//! ## Features
//!
//! - **Streaming**: `init -> update* -> digest` with input of any size,
//!   fed through a bounded 16 KiB arena
//! - **Fast Path**: single native call for short single-shot inputs
//! - **Snapshots**: fingerprinted `save`/`load` of in-progress state
//! - **Module Cache**: each module compiles once per process, even under
//!   concurrent first use
//! - **Reference Kernels**: MD5, SHA-224/256, CRC-32/32C, BLAKE2s, xxHash64
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn demo() -> hashengine::Result<()> {
//! let digest = hashengine::hasher::sha256("abc").await?;
//! println!("{}", digest);
//!
//! let mut hasher = hashengine::hasher::create_md5().await?;
//! hasher.update("a")?;
//! let snapshot = hasher.save()?;
//! hasher.update("bc")?;
//! println!("{}", hasher.digest_hex()?);
//!
//! hasher.load(&snapshot)?.update("bc")?;
//! println!("{}", hasher.digest_hex()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod module;
pub mod native;
pub mod registry;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{DigestOutput, Engine, FastPathPolicy, OutputKind, MAX_HEAP};
pub use error::{EngineError, Result};
pub use hasher::{Algorithm, Binding, Hasher};
pub use registry::ModuleRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use hashengine::prelude::*;
    //! ```

    pub use crate::config::EngineConfig;
    pub use crate::engine::{DigestOutput, Engine, FastPathPolicy, OutputKind, MAX_HEAP};
    pub use crate::error::{EngineError, Result};
    pub use crate::hasher::{hash_file, Algorithm, Binding, FileDigest, Hasher};
    pub use crate::module::{Fingerprint, ModuleBinary, ModuleRuntime};
    pub use crate::native::NativeRuntime;
    pub use crate::registry::{ModuleRegistry, SharedEngine};
}
