//! Plugin-based zone client registry
//!
//! Backends register a factory under a name; the daemon builds its client
//! from [`ZoneBackendConfig`] without hardcoding the list of backends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ZoneClientRegistry;
//!
//! let registry = ZoneClientRegistry::with_builtin();
//! ddns_provider_route53::register(&registry);
//!
//! let client = registry.create_client(&config.backend).await?;
//! ```

use crate::config::ZoneBackendConfig;
use crate::error::{Error, Result};
use crate::traits::{ZoneClient, ZoneClientFactory};
use crate::zones::MemoryZoneFactory;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of zone client factories
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct ZoneClientRegistry {
    factories: RwLock<HashMap<String, Arc<dyn ZoneClientFactory>>>,
}

impl ZoneClientRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the core's own backends (`memory`)
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register("memory", Box::new(MemoryZoneFactory));
        registry
    }

    /// Register a zone client factory
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name (e.g., "route53", "memory")
    /// - `factory`: Factory object for creating client instances
    pub fn register(&self, name: impl Into<String>, factory: Box<dyn ZoneClientFactory>) {
        let name = name.into();
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.insert(name, Arc::from(factory));
    }

    /// Create a zone client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn ZoneClient>)`: Created client, shareable across requests
    /// - `Err(Error)`: If the backend is not registered or creation fails
    pub async fn create_client(&self, config: &ZoneBackendConfig) -> Result<Arc<dyn ZoneClient>> {
        let backend = config.type_name();

        let factory = {
            let factories = self
                .factories
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            factories
                .get(backend)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown zone backend: {}", backend)))?
        };

        // Lock released before the async create
        factory.create(config).await
    }

    /// List all registered backend names
    pub fn list_backends(&self) -> Vec<String> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.keys().cloned().collect()
    }

    /// Check if a backend is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        factories.contains_key(name)
    }
}
