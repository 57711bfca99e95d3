//! Module cache and per-family instantiation mutex
//!
//! Compilation happens at most once per algorithm identifier for the
//! lifetime of a registry. Concurrent first users of the same family queue
//! on a FIFO async lock; the first one compiles and records the artifact,
//! the rest find it recorded.

use super::SharedEngine;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::module::{CompiledModule, ModuleBinary, ModuleRuntime};
use crate::native::NativeRuntime;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type FamilySlot = Arc<tokio::sync::Mutex<Option<Arc<dyn CompiledModule>>>>;

/// Registry of compiled modules and shared engines
pub struct ModuleRegistry {
    runtime: Arc<dyn ModuleRuntime>,
    config: EngineConfig,
    /// Algorithm identifier -> instantiation lock guarding its artifact
    families: Mutex<HashMap<String, FamilySlot>>,
    /// (algorithm identifier, digest length) -> shared engine
    shared: Mutex<HashMap<(String, usize), SharedEngine>>,
    compilations: AtomicUsize,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("runtime", &self.runtime.name())
            .field("config", &self.config)
            .field("compilations", &self.compilations())
            .finish()
    }
}

impl ModuleRegistry {
    /// Create a registry over `runtime` with the default config
    pub fn new(runtime: Arc<dyn ModuleRuntime>) -> Self {
        Self::with_config(runtime, EngineConfig::default())
    }

    /// Create a registry over `runtime` with an explicit config
    pub fn with_config(runtime: Arc<dyn ModuleRuntime>, config: EngineConfig) -> Self {
        Self {
            runtime,
            config,
            families: Mutex::new(HashMap::new()),
            shared: Mutex::new(HashMap::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    /// The process-wide registry over the native runtime
    ///
    /// Created on first use and never torn down.
    pub fn global() -> &'static ModuleRegistry {
        static GLOBAL: OnceLock<ModuleRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| ModuleRegistry::new(Arc::new(NativeRuntime::new())))
    }

    /// Engine configuration applied to every engine this registry creates
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of compilations performed so far
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::SeqCst)
    }

    fn family(&self, name: &str) -> FamilySlot {
        let mut families = self.families.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(families.entry(name.to_string()).or_default())
    }

    /// Whether a compiled artifact is recorded for `name`
    ///
    /// Reports `false` while a compilation for `name` is in flight.
    pub fn is_cached(&self, name: &str) -> bool {
        let families = self.families.lock().unwrap_or_else(PoisonError::into_inner);
        families
            .get(name)
            .and_then(|slot| slot.try_lock().ok().map(|artifact| artifact.is_some()))
            .unwrap_or(false)
    }

    /// Compiled artifact for `binary`, compiling it on first use
    pub async fn acquire_module(&self, binary: &ModuleBinary) -> Result<Arc<dyn CompiledModule>> {
        if !self.runtime.is_supported() {
            return Err(EngineError::EnvironmentUnsupported(format!(
                "runtime '{}' cannot execute modules on this host",
                self.runtime.name()
            )));
        }

        let slot = self.family(binary.name());
        let mut artifact = slot.lock().await;
        if let Some(compiled) = artifact.as_ref() {
            return Ok(Arc::clone(compiled));
        }

        tracing::debug!("Compiling module '{}' ({})", binary.name(), binary.fingerprint());
        let compiled = self.runtime.compile(binary).await?;
        self.compilations.fetch_add(1, Ordering::SeqCst);
        *artifact = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Create a private engine for `binary` with the given digest length
    pub async fn create_engine(&self, binary: Arc<ModuleBinary>, digest_size: usize) -> Result<Engine> {
        let compiled = self.acquire_module(&binary).await?;
        let instance = compiled.instantiate().await.map_err(|e| match e {
            EngineError::Instantiate { .. } => e,
            other => EngineError::Instantiate {
                module: binary.name().to_string(),
                message: other.to_string(),
            },
        })?;
        tracing::debug!(
            "Instantiated '{}' with {} byte digest",
            binary.name(),
            digest_size
        );
        Engine::bind(binary, instance, digest_size, &self.config)
    }

    /// The shared engine for `(binary, digest_size)`, created on first use
    ///
    /// A different digest length from the same family gets its own engine.
    pub async fn shared_engine(&self, binary: Arc<ModuleBinary>, digest_size: usize) -> Result<SharedEngine> {
        let key = (binary.name().to_string(), digest_size);
        let existing = self.lock_shared().get(&key).cloned();
        if let Some(engine) = existing {
            return Ok(engine);
        }

        let engine = SharedEngine::new(self.create_engine(binary, digest_size).await?);
        // A racing caller may have inserted first; keep whichever landed
        let engine = self.lock_shared().entry(key).or_insert(engine).clone();
        Ok(engine)
    }

    fn lock_shared(&self) -> std::sync::MutexGuard<'_, HashMap<(String, usize), SharedEngine>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every cached artifact and shared engine
    pub fn reset(&self) {
        self.families.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.lock_shared().clear();
        self.compilations.store(0, Ordering::SeqCst);
        tracing::debug!("Registry over '{}' reset", self.runtime.name());
    }
}
