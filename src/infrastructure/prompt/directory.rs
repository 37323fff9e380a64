//! Local directory template store, the development stand-in for the prompt bucket

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::domain::prompt::TemplateStore;
use crate::domain::DomainError;

/// Reads template objects as files below a root directory
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore {
    root: PathBuf,
}

impl DirectoryTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object key to a path, refusing keys that escape the root
    fn object_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(key);

        let escapes = key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));

        if escapes {
            return Err(DomainError::validation(format!(
                "Invalid object key '{}'",
                key
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TemplateStore for DirectoryTemplateStore {
    async fn read_object(&self, key: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.object_path(key)?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                DomainError::not_found(format!("Object '{}' not found", path.display()))
            }
            _ => DomainError::storage(format!("Failed to read '{}': {}", path.display(), e)),
        })
    }

    fn store_name(&self) -> &'static str {
        "directory"
    }
}
