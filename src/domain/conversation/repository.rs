//! Message store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{HistoryQuery, StoredMessage};
use crate::domain::DomainError;

/// Key-sorted message store, partitioned by conversation ID and sorted by timestamp
#[async_trait]
pub trait MessageStore: Send + Sync + Debug {
    /// Range query on the conversation partition, limited to `query.limit` items.
    ///
    /// Implementations may return records in any order; callers sort them.
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredMessage>, DomainError>;

    /// Append a message (used by the ingress, never by the workflow)
    async fn append(&self, message: StoredMessage) -> Result<(), DomainError>;

    /// Backend name for logs and metrics
    fn store_name(&self) -> &'static str;
}
