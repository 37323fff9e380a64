//! Trigger payload and execution identity

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::WorkflowError;
use crate::domain::conversation::ConversationId;

/// Start payload delivered by the change notification.
///
/// Only `conversation_id` drives the pipeline; `timestamp` and `message`
/// describe the appended message that caused the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    #[serde(alias = "Id")]
    #[validate(length(min = 1, max = 2048))]
    pub conversation_id: String,

    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub message: String,
}

impl TriggerPayload {
    pub fn new(
        conversation_id: impl Into<String>,
        timestamp: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }

    /// Validated conversation ID of the trigger
    pub fn conversation_id(&self) -> Result<ConversationId, WorkflowError> {
        ConversationId::new(self.conversation_id.as_str())
            .map_err(|e| WorkflowError::invalid_input(e.to_string()))
    }
}

/// Opaque execution identifier, supplied by whoever starts the execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExecutionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
