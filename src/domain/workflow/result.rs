//! Execution outcome and per-stage result types

use serde::Serialize;

use super::error::{ErrorKind, WorkflowError};
use super::state::{ExecutionState, WorkflowStage};
use super::trigger::ExecutionId;
use crate::domain::llm::{InferenceReceipt, ModelRequest};

/// Result of executing a single stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepExecutionResult {
    pub stage: WorkflowStage,

    pub success: bool,

    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
}

impl StepExecutionResult {
    pub fn success(stage: WorkflowStage, execution_time_ms: u64) -> Self {
        Self {
            stage,
            success: true,
            error: None,
            execution_time_ms,
        }
    }

    pub fn failure(stage: WorkflowStage, error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            stage,
            success: false,
            error: Some(error.into()),
            execution_time_ms,
        }
    }
}

/// Where and why an execution failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionFailure {
    pub stage: WorkflowStage,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip)]
    pub cause: WorkflowError,
}

impl ExecutionFailure {
    pub fn new(stage: WorkflowStage, cause: WorkflowError) -> Self {
        Self {
            stage,
            kind: cause.kind(),
            message: cause.to_string(),
            cause,
        }
    }
}

/// Terminal outcome of one workflow execution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub execution_id: ExecutionId,

    /// Conversation ID as received in the trigger
    pub conversation_id: String,

    pub state: ExecutionState,

    pub step_results: Vec<StepExecutionResult>,

    pub execution_time_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composed_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_request: Option<ModelRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceReceipt>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.state == ExecutionState::Done
    }

    /// `Ok` with the inference receipt, or the failing stage and cause
    pub fn as_result(&self) -> Result<Option<&InferenceReceipt>, &ExecutionFailure> {
        match &self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.inference.as_ref()),
        }
    }

    pub fn failed_stage(&self) -> Option<WorkflowStage> {
        self.failure.as_ref().map(|f| f.stage)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_success() { "success" } else { "failure" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(state: ExecutionState, failure: Option<ExecutionFailure>) -> ExecutionOutcome {
        ExecutionOutcome {
            execution_id: ExecutionId::new("exec-1"),
            conversation_id: "c1".to_string(),
            state,
            step_results: vec![StepExecutionResult::success(WorkflowStage::Querying, 3)],
            execution_time_ms: 3,
            composed_prompt: None,
            model_request: None,
            inference: None,
            failure,
        }
    }

    #[test]
    fn test_step_result_success() {
        let result = StepExecutionResult::success(WorkflowStage::Composing, 1);
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_step_result_failure() {
        let result = StepExecutionResult::failure(WorkflowStage::Invoking, "boom", 10);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_failure_outcome() {
        let failure = ExecutionFailure::new(
            WorkflowStage::LoadingTemplate,
            WorkflowError::template_not_found("prompt.txt"),
        );
        let outcome = outcome(
            ExecutionState::Failed {
                stage: WorkflowStage::LoadingTemplate,
                kind: ErrorKind::TemplateNotFound,
            },
            Some(failure),
        );

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_stage(), Some(WorkflowStage::LoadingTemplate));
        assert_eq!(outcome.error_kind(), Some(ErrorKind::TemplateNotFound));
        assert!(outcome.as_result().is_err());
        assert_eq!(outcome.status_label(), "failure");
    }

    #[test]
    fn test_outcome_serialization() {
        let failure = ExecutionFailure::new(
            WorkflowStage::Querying,
            WorkflowError::store_unavailable("timeout"),
        );
        let outcome = outcome(
            ExecutionState::Failed {
                stage: WorkflowStage::Querying,
                kind: ErrorKind::StoreUnavailable,
            },
            Some(failure),
        );

        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["executionId"], "exec-1");
        assert_eq!(value["state"]["state"], "failed");
        assert_eq!(value["failure"]["kind"], "store_unavailable");
        assert_eq!(value["failure"]["stage"], "querying");
        assert!(value["failure"].get("cause").is_none());
        assert!(value.get("composedPrompt").is_none());
    }

    #[test]
    fn test_success_outcome() {
        let outcome = outcome(ExecutionState::Done, None);
        assert!(outcome.is_success());
        assert_eq!(outcome.as_result().unwrap(), None);
    }
}
