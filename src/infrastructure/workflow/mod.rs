//! Workflow engine: stage descriptors, the sequencer and execution dispatch

mod dispatcher;
mod executor_impl;
mod outcome_registry;
mod stages;

pub use dispatcher::{ExecutionDispatcher, ExecutionHandle};
pub use executor_impl::RecapWorkflowExecutor;
pub use outcome_registry::{OutcomeRegistry, OutcomeRegistryConfig};
pub use stages::{
    ComposePromptStage, FlattenHistoryStage, InvokeModelStage, LoadTemplateStage, Pipeline,
    QueryHistoryStage, RecapContext, Stage,
};
