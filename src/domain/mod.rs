//! Domain layer - Core business logic and entities

pub mod conversation;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod workflow;

pub use conversation::{
    flatten_history, ConversationId, HistoryQuery, HistoryWindow, MessageBatch, MessageStore,
    StoredMessage,
};
pub use error::DomainError;
pub use llm::{
    request_for_model, InferenceClient, InferenceReceipt, ModelFamily, ModelRequest,
};
pub use prompt::{PromptTemplate, TemplateError, TemplateStore};
pub use workflow::{
    ErrorKind, ExecutionFailure, ExecutionId, ExecutionOutcome, ExecutionState,
    StepExecutionResult, TriggerPayload, WorkflowError, WorkflowExecutor, WorkflowStage,
};
