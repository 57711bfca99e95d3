//! Configuration module for HashEngine
//!
//! Provides the engine configuration loaded from defaults, JSON or
//! human-readable size strings.

mod settings;

pub use settings::*;
