//! Workflow executor implementation

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info, warn, Instrument};

use super::stages::{Pipeline, RecapContext, Stage};
use crate::domain::{
    ExecutionFailure, ExecutionId, ExecutionOutcome, ExecutionState, StepExecutionResult,
    TriggerPayload, WorkflowError, WorkflowExecutor, WorkflowStage,
};
use crate::infrastructure::observability::{record_execution, record_stage};

/// Sequencer running the stages of a [`Pipeline`] in order
#[derive(Debug, Clone)]
pub struct RecapWorkflowExecutor {
    pipeline: Pipeline,
}

impl RecapWorkflowExecutor {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    async fn run(&self, execution_id: ExecutionId, trigger: TriggerPayload) -> ExecutionOutcome {
        let start = Instant::now();
        let conversation_id = trigger.conversation_id.clone();
        let mut context = RecapContext::new(trigger);
        let mut state = ExecutionState::default();
        let mut step_results = Vec::with_capacity(self.pipeline.stages().len());
        let mut failure = None;

        if self.pipeline.is_empty() {
            failure = Some(fail_at(
                &mut state,
                WorkflowStage::Querying,
                WorkflowError::internal("pipeline has no stages"),
            ));
        }

        for (index, descriptor) in self.pipeline.stages().iter().enumerate() {
            if failure.is_some() {
                break;
            }

            let stage = descriptor.stage();
            let step_start = Instant::now();

            let entered = if index == 0 {
                state.begin(stage)
            } else {
                state.enter(stage)
            };

            let result = match entered {
                Ok(()) => {
                    debug!(stage = %stage, "Stage started");
                    descriptor.run(&mut context).await
                }
                Err(e) => Err(e),
            };

            let elapsed = step_start.elapsed();
            record_stage(stage.as_str(), elapsed);

            match result {
                Ok(()) => {
                    let elapsed_ms = elapsed.as_millis() as u64;
                    debug!(stage = %stage, elapsed_ms, "Stage completed");
                    step_results.push(StepExecutionResult::success(stage, elapsed_ms));
                }
                Err(e) => {
                    step_results.push(StepExecutionResult::failure(
                        stage,
                        e.to_string(),
                        elapsed.as_millis() as u64,
                    ));
                    failure = Some(fail_at(&mut state, stage, e));
                }
            }
        }

        if failure.is_none() {
            if let Err(e) = state.complete() {
                failure = Some(fail_at(&mut state, WorkflowStage::Invoking, e));
            }
        }

        let elapsed = start.elapsed();

        match &failure {
            None => {
                record_execution("success", "none", "none", elapsed);
                info!(elapsed_ms = elapsed.as_millis() as u64, "Execution completed");
            }
            Some(f) => {
                record_execution("failure", f.stage.as_str(), f.kind.as_str(), elapsed);
                let (stage, kind, message) = (f.stage, f.kind, &f.message);
                if kind.is_client_error() {
                    warn!(%stage, %kind, error = %message, "Execution failed");
                } else {
                    error!(%stage, %kind, error = %message, "Execution failed");
                }
            }
        }

        ExecutionOutcome {
            execution_id,
            conversation_id,
            state,
            step_results,
            execution_time_ms: elapsed.as_millis() as u64,
            composed_prompt: context.composed_prompt,
            model_request: context.model_request,
            inference: context.receipt,
            failure,
        }
    }
}

/// Move `state` to `Failed` at `stage`
fn fail_at(
    state: &mut ExecutionState,
    stage: WorkflowStage,
    cause: WorkflowError,
) -> ExecutionFailure {
    if let Err(e) = state.fail(stage, cause.kind()) {
        debug!(stage = %stage, error = %e, "Execution already terminated");
    }
    ExecutionFailure::new(stage, cause)
}

#[async_trait]
impl WorkflowExecutor for RecapWorkflowExecutor {
    async fn start(&self, execution_id: ExecutionId, trigger: TriggerPayload) -> ExecutionOutcome {
        let span = tracing::info_span!(
            "execution",
            execution_id = %execution_id,
            conversation_id = %trigger.conversation_id,
        );

        self.run(execution_id, trigger).instrument(span).await
    }
}
