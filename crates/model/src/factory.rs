//! Backend construction by name, plus the process-wide default port.

use std::sync::{Arc, OnceLock, RwLock};

use crate::backend::{BackendKind, BackendOptions};
use crate::error::ConfigurationError;
use crate::http::HttpBackend;
use crate::mock::MockBackend;
use crate::port::GenerationPort;

static DEFAULT_PORT: OnceLock<RwLock<Arc<dyn GenerationPort>>> = OnceLock::new();

/// Build a generation port from a backend name and its options.
pub fn create_backend(
    name: &str,
    options: &BackendOptions,
) -> Result<Arc<dyn GenerationPort>, ConfigurationError> {
    let kind: BackendKind = name.parse()?;
    let port: Arc<dyn GenerationPort> = match kind {
        BackendKind::Mock => Arc::new(MockBackend::new()),
        _ => Arc::new(HttpBackend::from_options(kind, options)?),
    };
    tracing::info!(backend = %kind, "generation backend created");
    Ok(port)
}

fn default_slot() -> &'static RwLock<Arc<dyn GenerationPort>> {
    DEFAULT_PORT.get_or_init(|| {
        tracing::info!(backend = %BackendKind::Mock, "initialising default generation backend");
        RwLock::new(Arc::new(MockBackend::new()))
    })
}

/// The shared default port. A mock backend is created on first use.
pub fn default_backend() -> Arc<dyn GenerationPort> {
    let slot = default_slot().read().unwrap_or_else(|e| e.into_inner());
    Arc::clone(&slot)
}

/// Replace the shared default port.
pub fn set_default_backend(port: Arc<dyn GenerationPort>) {
    let kind = port.kind();
    let mut slot = default_slot().write().unwrap_or_else(|e| e.into_inner());
    *slot = port;
    tracing::info!(backend = %kind, "default generation backend replaced");
}
