//! Workflow executor trait

use async_trait::async_trait;

use super::result::ExecutionOutcome;
use super::trigger::{ExecutionId, TriggerPayload};

/// Runs one execution of the recap pipeline per trigger.
///
/// Failures are part of the returned outcome; this never retries.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync + std::fmt::Debug {
    async fn start(&self, execution_id: ExecutionId, trigger: TriggerPayload) -> ExecutionOutcome;
}
