//! Application context owning the process-wide registry
//!
//! The registry is created lazily on first access; concurrent first accesses
//! race on a `OnceCell`, so exactly one instance is ever built and every
//! caller receives a handle to it.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

use crate::registry::ResourceRegistry;

#[derive(Debug, Default)]
pub struct AppContext {
    registry: OnceCell<Arc<ResourceRegistry>>,
}

impl AppContext {
    pub fn new() -> Self {
        AppContext::default()
    }

    /// Context whose registry is already in place
    pub fn with_registry(registry: Arc<ResourceRegistry>) -> Self {
        AppContext {
            registry: OnceCell::with_value(registry),
        }
    }

    /// The shared registry, created on first call
    pub fn registry(&self) -> Arc<ResourceRegistry> {
        Arc::clone(self.registry.get_or_init(|| {
            debug!("Creating resource registry");
            Arc::new(ResourceRegistry::new())
        }))
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.get().is_some()
    }
}
