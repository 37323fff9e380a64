//! Execution endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use validator::Validate;

use super::ExecutionAccepted;
use crate::api::state::AppState;
use crate::api::types::{ApiError, JsonBody};
use crate::domain::{ExecutionId, TriggerPayload};

/// POST /v1/executions
pub async fn start_execution(
    State(state): State<AppState>,
    JsonBody(trigger): JsonBody<TriggerPayload>,
) -> Result<Response, ApiError> {
    trigger.validate()?;

    let handle = state.runtime.dispatch(trigger).await?;

    debug!(execution_id = %handle.execution_id(), "Execution accepted");

    let body = ExecutionAccepted {
        execution_id: handle.execution_id().to_string(),
    };

    Ok((StatusCode::ACCEPTED, Json(body)).into_response())
}

/// GET /v1/executions/{execution_id}
pub async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state
        .runtime
        .outcomes()
        .get(&ExecutionId::new(execution_id.as_str()))
        .await
        .ok_or_else(|| {
            ApiError::not_found(format!("Execution '{}' not found", execution_id))
        })?;

    Ok(Json(outcome.as_ref().clone()).into_response())
}
