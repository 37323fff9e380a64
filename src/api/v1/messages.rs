//! Conversation message ingress
//!
//! Appending a message starts one execution for it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use super::ExecutionAccepted;
use crate::api::state::AppState;
use crate::api::types::{ApiError, JsonBody};
use crate::domain::{ConversationId, StoredMessage, TriggerPayload};

/// Request to append a message to a conversation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppendMessageRequest {
    pub message: String,

    /// Sort key of the message; defaults to the current time (RFC 3339)
    #[serde(default)]
    #[validate(length(min = 1, max = 1024))]
    pub timestamp: Option<String>,
}

/// POST /v1/conversations/{conversation_id}/messages
pub async fn append_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    JsonBody(request): JsonBody<AppendMessageRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let conversation_id = ConversationId::new(conversation_id)?;

    let timestamp = request
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    state
        .runtime
        .message_store()
        .append(StoredMessage::new(
            conversation_id.clone(),
            timestamp.clone(),
            request.message.clone(),
        ))
        .await?;

    debug!(conversation_id = %conversation_id, timestamp = %timestamp, "Message appended");

    let trigger = TriggerPayload::new(conversation_id.as_str(), timestamp, request.message);
    let handle = state.runtime.dispatch(trigger).await?;

    let body = ExecutionAccepted {
        execution_id: handle.execution_id().to_string(),
    };

    Ok((StatusCode::ACCEPTED, Json(body)).into_response())
}
