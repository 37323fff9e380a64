//! In-memory template store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::prompt::TemplateStore;
use crate::domain::DomainError;

/// Thread-safe in-memory object store for templates
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: impl Into<String>, content: impl Into<String>) -> Self {
        if let Ok(objects) = self.objects.get_mut() {
            objects.insert(key.into(), content.into().into_bytes());
        }
        self
    }

    pub fn put(
        &self,
        key: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), DomainError> {
        let mut objects = self.objects.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        objects.insert(key.into(), content.into());
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn read_object(&self, key: &str) -> Result<Vec<u8>, DomainError> {
        let objects = self.objects.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        objects
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Object '{}' not found", key)))
    }

    fn store_name(&self) -> &'static str {
        "in_memory"
    }
}
