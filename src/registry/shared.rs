//! Process-wide engines reused by the single-shot helpers

use crate::engine::Engine;
use std::sync::{Arc, Mutex, PoisonError};

/// An engine shared between callers
///
/// Every use holds the lock for the whole compute sequence, so calls from
/// different threads never interleave on the same instance.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    /// Wrap an engine for sharing
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine
    ///
    /// A panic inside a previous call does not lock the engine out; every
    /// single-shot sequence starts with `init` anyway.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Whether two handles point at the same engine
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
