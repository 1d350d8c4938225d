use crate::types::{KiroError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ServiceHandle = Arc<dyn Any + Send + Sync>;

/// Named service instances, looked up by name and concrete type.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, ServiceHandle>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `service` under `name`, replacing any previous entry.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, service: Arc<T>) {
        let name = name.into();
        let replaced = self
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), service)
            .is_some();

        if replaced {
            tracing::debug!("Replaced service '{}'", name);
        } else {
            tracing::debug!("Registered service '{}'", name);
        }
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let handle = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| KiroError::ServiceNotFound(name.to_string()))?;

        handle
            .downcast::<T>()
            .map_err(|_| KiroError::ServiceTypeMismatch(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
