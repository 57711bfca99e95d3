//! Computation module contract and distribution artifacts
//!
//! The engine treats every hash algorithm as an opaque module driven
//! through a fixed set of exports and one linear memory.

mod binary;
mod runtime;

pub use binary::*;
pub use runtime::*;
