//! Type-keyed service registry.
//!
//! Components that run inside the index session cannot take the content
//! definition service as a constructor argument, because that service is
//! itself built around the session. They receive the registry instead and
//! resolve what they need on first use.
//!
//! Services are stored as `Arc<T>` keyed by `T`, so trait objects register
//! and resolve as `Arc<dyn Trait>`:
//!
//! ```rust,ignore
//! registry.register::<dyn ContentDefinitionManager>(store.clone());
//! let defs = registry.get_required::<dyn ContentDefinitionManager>()?;
//! ```

use crate::{Result, TermIndexError};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Registry of shared services.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, replacing any previous registration for `T`.
    pub fn register<T>(&self, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut services = match self.services.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        services.insert(TypeId::of::<Arc<T>>(), Box::new(service));
        debug!("Registered service {}", type_name::<T>());
    }

    /// Resolve a service, or `None` if nothing is registered for `T`.
    pub fn resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let services = match self.services.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        services
            .get(&TypeId::of::<Arc<T>>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Resolve a service that must have been registered.
    pub fn get_required<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>()
            .ok_or_else(|| TermIndexError::ServiceUnavailable {
                service: type_name::<T>().to_string(),
            })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().is_some()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.services.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("ServiceRegistry")
            .field("services", &count)
            .finish()
    }
}
