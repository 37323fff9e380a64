//! Conversation domain: message records, history batches and the message store

mod entity;
mod history;
mod repository;

pub use entity::{
    validate_conversation_id, ConversationId, HistoryQuery, HistoryWindow, MessageBatch,
    StoredMessage, DEFAULT_PAGE_SIZE, MAX_CONVERSATION_ID_BYTES,
};
pub use history::{flatten_history, HistoryTexts};
pub use repository::MessageStore;
