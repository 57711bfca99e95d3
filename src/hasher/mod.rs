//! Per-algorithm bindings over the generic engine
//!
//! Each algorithm is a small configuration record (digest length, init
//! and digest parameters, staged key or seed bytes, fast-path policy)
//! consumed by one generic [`Hasher`]. The free functions are single-shot
//! helpers over the process-wide registry.

mod algorithm;
mod binding;
mod integrity;
mod oneshot;
mod streaming;

pub use algorithm::*;
pub use binding::*;
pub use integrity::*;
pub use oneshot::*;
pub use streaming::*;
