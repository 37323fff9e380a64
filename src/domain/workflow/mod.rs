//! Workflow domain module
//!
//! One execution turns a trigger into a model invocation through a fixed
//! sequence of stages:
//! - Querying: read the conversation history from the message store
//! - Flattening: map each message record to its text
//! - LoadingTemplate: read the prompt template blob
//! - Composing: substitute the history into the template
//! - Invoking: shape the vendor request and call the inference backend
//!
//! Any stage failure is terminal for the execution.

mod error;
mod executor;
mod result;
mod state;
mod trigger;

pub use error::{ErrorKind, WorkflowError};
pub use executor::WorkflowExecutor;
pub use result::{ExecutionFailure, ExecutionOutcome, StepExecutionResult};
pub use state::{ExecutionState, WorkflowStage};
pub use trigger::{ExecutionId, TriggerPayload};
