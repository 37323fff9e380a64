//! Conversation Recap
//!
//! Event-driven workflow that turns each appended conversation message into
//! a model invocation:
//! - Reads a bounded window of the conversation history
//! - Flattens it into text and substitutes it into a stored prompt template
//! - Shapes a vendor-specific request and calls the inference backend

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{
    DomainError, ExecutionOutcome, InferenceClient, MessageStore, TemplateStore, TriggerPayload,
    WorkflowError,
};
use infrastructure::conversation::MessageStoreFactory;
use infrastructure::llm::InferenceClientFactory;
use infrastructure::prompt::TemplateStoreFactory;
use infrastructure::workflow::{
    ExecutionDispatcher, ExecutionHandle, OutcomeRegistry, OutcomeRegistryConfig, Pipeline,
    RecapWorkflowExecutor,
};
use tracing::info;

use crate::config::WorkflowConfig;

/// Process-wide state: the stores, the inference client and the dispatcher.
///
/// Built once per process and shared by every execution.
#[derive(Debug, Clone)]
pub struct RecapRuntime {
    workflow: WorkflowConfig,
    message_store: Arc<dyn MessageStore>,
    dispatcher: ExecutionDispatcher,
}

impl RecapRuntime {
    /// Build the runtime from injected backends
    pub fn new(
        workflow: WorkflowConfig,
        message_store: Arc<dyn MessageStore>,
        template_store: Arc<dyn TemplateStore>,
        inference: Arc<dyn InferenceClient>,
    ) -> Result<Self, DomainError> {
        workflow.validate()?;

        let pipeline = Pipeline::recap(
            message_store.clone(),
            template_store,
            inference,
            &workflow,
        );
        let executor = Arc::new(RecapWorkflowExecutor::new(pipeline));
        let registry = OutcomeRegistry::with_config(OutcomeRegistryConfig::from(&workflow));
        let dispatcher = ExecutionDispatcher::new(executor, registry)
            .serialize_by_conversation(workflow.serialize_by_conversation);

        Ok(Self {
            workflow,
            message_store,
            dispatcher,
        })
    }

    /// Build the runtime and its backends from configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let message_store = MessageStoreFactory::create(&config.message_store).await;
        let template_store = TemplateStoreFactory::create(&config.template_store).await;
        let inference = InferenceClientFactory::create(&config.inference).await;

        info!(
            message_store = message_store.store_name(),
            template_store = template_store.store_name(),
            inference = inference.provider_name(),
            model_id = %config.workflow.model_id,
            "Recap runtime initialized"
        );

        Ok(Self::new(
            config.workflow.clone(),
            message_store,
            template_store,
            inference,
        )?)
    }

    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    pub fn message_store(&self) -> &Arc<dyn MessageStore> {
        &self.message_store
    }

    pub fn outcomes(&self) -> &OutcomeRegistry {
        self.dispatcher.registry()
    }

    /// Start an execution without waiting for it
    pub async fn dispatch(
        &self,
        trigger: TriggerPayload,
    ) -> Result<ExecutionHandle, WorkflowError> {
        self.dispatcher.dispatch(trigger).await
    }

    /// Start an execution and wait for its terminal outcome
    pub async fn execute(
        &self,
        trigger: TriggerPayload,
    ) -> Result<ExecutionOutcome, WorkflowError> {
        self.dispatch(trigger).await?.outcome().await
    }

    /// Stop accepting executions and wait for in-flight ones
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
        info!("Recap runtime shutdown complete");
    }
}
