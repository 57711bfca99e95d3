//! Module cache, instantiation locks and shared single-shot engines

mod cache;
mod shared;

pub use cache::*;
pub use shared::*;
