//! In-memory message store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::conversation::{
    ConversationId, HistoryQuery, HistoryWindow, MessageStore, StoredMessage,
};
use crate::domain::DomainError;

/// Thread-safe in-memory message store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    conversations: RwLock<HashMap<ConversationId, Vec<StoredMessage>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with messages
    pub fn with_messages(messages: Vec<StoredMessage>) -> Self {
        let mut map: HashMap<ConversationId, Vec<StoredMessage>> = HashMap::new();

        for message in messages {
            map.entry(message.conversation_id.clone())
                .or_default()
                .push(message);
        }

        Self {
            conversations: RwLock::new(map),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredMessage>, DomainError> {
        let conversations = self.conversations.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let Some(messages) = conversations.get(&query.conversation_id) else {
            return Ok(Vec::new());
        };

        let mut sorted = messages.clone();
        sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let page = match query.window {
            HistoryWindow::Earliest => sorted.into_iter().take(query.limit).collect(),
            HistoryWindow::Latest => {
                let skip = sorted.len().saturating_sub(query.limit);
                sorted.into_iter().skip(skip).collect()
            }
        };

        Ok(page)
    }

    async fn append(&self, message: StoredMessage) -> Result<(), DomainError> {
        let mut conversations = self.conversations.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        conversations
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message);

        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "in_memory"
    }
}
