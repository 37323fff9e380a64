//! Template store trait

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Blob store holding prompt templates
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Read the full object content.
    ///
    /// Returns `DomainError::NotFound` when the object is absent and
    /// `DomainError::Storage` on transport failure. Decoding is left to the caller.
    async fn read_object(&self, key: &str) -> Result<Vec<u8>, DomainError>;

    /// Backend name for logs and metrics
    fn store_name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemplateStore({})", self.store_name())
    }
}
