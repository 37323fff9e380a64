//! Conversation domain entities

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum byte length of a conversation ID (partition key limit of the message store)
pub const MAX_CONVERSATION_ID_BYTES: usize = 2048;

/// Default number of historical messages read per execution
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Validated conversation identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Create a new validated conversation ID
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_conversation_id(&id)?;
        Ok(Self(id))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConversationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a conversation ID string
pub fn validate_conversation_id(id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::invalid_id("Conversation ID cannot be empty"));
    }

    if id.len() > MAX_CONVERSATION_ID_BYTES {
        return Err(DomainError::invalid_id(format!(
            "Conversation ID exceeds maximum length of {} bytes",
            MAX_CONVERSATION_ID_BYTES
        )));
    }

    if id.chars().any(char::is_control) {
        return Err(DomainError::invalid_id(
            "Conversation ID cannot contain control characters",
        ));
    }

    Ok(())
}

/// A message record as held by the message store.
///
/// `text` is optional because the store does not enforce its presence; a
/// record without text is rejected when the history is flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub conversation_id: ConversationId,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl StoredMessage {
    pub fn new(
        conversation_id: ConversationId,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            timestamp: timestamp.into(),
            text: Some(text.into()),
        }
    }

    /// A record whose text attribute is missing
    pub fn without_text(conversation_id: ConversationId, timestamp: impl Into<String>) -> Self {
        Self {
            conversation_id,
            timestamp: timestamp.into(),
            text: None,
        }
    }
}

/// Which end of a conversation the history window is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryWindow {
    /// Forward scan from the oldest message
    #[default]
    Earliest,
    /// Backward scan from the newest message, returned oldest-first
    Latest,
}

/// Range query against the message store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub conversation_id: ConversationId,
    pub limit: usize,
    pub window: HistoryWindow,
}

impl HistoryQuery {
    pub fn new(conversation_id: ConversationId, limit: usize) -> Self {
        Self {
            conversation_id,
            limit,
            window: HistoryWindow::default(),
        }
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }
}

/// Ordered, size-bounded set of messages for one execution.
///
/// Always ascending by timestamp and never longer than its page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBatch {
    messages: Vec<StoredMessage>,
    page_size: usize,
}

impl MessageBatch {
    /// Build a batch from store records.
    ///
    /// Records are sorted ascending by timestamp (stable, so duplicates keep
    /// their store order) and truncated to `page_size`.
    pub fn from_records(mut records: Vec<StoredMessage>, page_size: usize) -> Self {
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        records.truncate(page_size);

        Self {
            messages: records,
            page_size,
        }
    }

    pub fn empty(page_size: usize) -> Self {
        Self {
            messages: Vec::new(),
            page_size,
        }
    }

    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
