//! v1 API endpoints

pub mod executions;
pub mod messages;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::state::AppState;

/// Body of a `202 Accepted` dispatch response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionAccepted {
    pub execution_id: String,
}

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations/{conversation_id}/messages",
            post(messages::append_message),
        )
        .route("/executions", post(executions::start_execution))
        .route("/executions/{execution_id}", get(executions::get_execution))
}
