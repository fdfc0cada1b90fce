//! Resource registry and dispatcher
//!
//! Maps resource identifiers (MRNs) to handler functions. Registration and
//! lookup share one `RwLock`; dispatch clones the handler out of the map and
//! releases the lock before invoking it, so handler bodies for concurrent
//! dispatches run in parallel.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::RegistryError;
use crate::request::{ExecuteRequest, ExecuteResponse, TypedRequest};

/// Type-erased handler body
pub type Handler = dyn Fn(&TypedRequest) -> anyhow::Result<serde_json::Value> + Send + Sync;

/// Metadata key carrying the operation tag set by [`ResourceRegistry::register_simple`]
pub const OPERATION_KEY: &str = "operation";

/// A handler plus the metadata copied into every successful response
#[derive(Clone)]
pub struct ResourceFunction {
    handler: Arc<Handler>,
    metadata: HashMap<String, String>,
}

impl ResourceFunction {
    pub fn new<F, T>(handler: F) -> Self
    where
        F: Fn(&TypedRequest) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize,
    {
        let erased = move |request: &TypedRequest| -> anyhow::Result<serde_json::Value> {
            let result = handler(request)?;
            serde_json::to_value(result)
                .map_err(|e| anyhow::anyhow!("failed to marshal result: {}", e))
        };
        ResourceFunction {
            handler: Arc::new(erased),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn call(&self, request: &TypedRequest) -> anyhow::Result<serde_json::Value> {
        (self.handler)(request)
    }
}

impl std::fmt::Debug for ResourceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFunction")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Thread-safe mapping from resource identifier to handler
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    functions: RwLock<HashMap<String, Arc<ResourceFunction>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        ResourceRegistry::default()
    }

    /// Register a handler with no metadata
    pub fn register<F, T>(&self, id: impl Into<String>, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&TypedRequest) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize,
    {
        self.register_function(id, ResourceFunction::new(handler))
    }

    /// Register a handler tagged with `operation=<operation>` metadata
    pub fn register_simple<F, T>(
        &self,
        id: impl Into<String>,
        handler: F,
        operation: &str,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&TypedRequest) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize,
    {
        self.register_function(
            id,
            ResourceFunction::new(handler).with_metadata(OPERATION_KEY, operation),
        )
    }

    /// Register a prepared function. An existing registration is never replaced.
    pub fn register_function(
        &self,
        id: impl Into<String>,
        function: ResourceFunction,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let mut functions = self.functions.write();
        if functions.contains_key(&id) {
            warn!("Rejected duplicate registration for {}", id);
            return Err(RegistryError::Duplicate(id));
        }
        debug!("Registered resource {}", id);
        functions.insert(id, Arc::new(function));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<ResourceFunction>> {
        self.functions.read().get(id).cloned()
    }

    /// Like [`get`](Self::get), but reports an unknown id as an error
    pub fn resolve(&self, id: &str) -> Result<Arc<ResourceFunction>, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::Unsupported(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.functions.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }

    /// All registered identifiers, sorted
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Route a request to its handler.
    ///
    /// Never fails: unknown resources, handler errors and unserializable
    /// results all come back in the response's `error` field.
    pub fn dispatch(&self, request: &ExecuteRequest) -> ExecuteResponse {
        let function = match self.resolve(&request.resource) {
            Ok(function) => function,
            Err(e) => {
                debug!("{}", e);
                return ExecuteResponse::failure(e.to_string());
            }
        };

        let typed = TypedRequest::new(request.clone());
        let value = match function.call(&typed) {
            Ok(value) => value,
            Err(e) => {
                debug!("Handler for {} failed: {:#}", request.resource, e);
                return ExecuteResponse::failure(format!("{:#}", e));
            }
        };

        match serde_json::to_vec(&value) {
            Ok(output) => ExecuteResponse::success(output, function.metadata().clone()),
            Err(e) => ExecuteResponse::failure(format!("failed to marshal result: {}", e)),
        }
    }

    /// Dispatch by resource id and raw parameters only
    pub fn invoke(&self, resource: &str, parameters: HashMap<String, Vec<u8>>) -> ExecuteResponse {
        let request = ExecuteRequest {
            resource: resource.to_string(),
            parameters,
            ..Default::default()
        };
        self.dispatch(&request)
    }
}
