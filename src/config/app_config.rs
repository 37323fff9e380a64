use serde::Deserialize;

use crate::domain::conversation::{HistoryWindow, DEFAULT_PAGE_SIZE};
use crate::domain::{DomainError, ModelFamily};
use crate::infrastructure::conversation::MessageStoreConfig;
use crate::infrastructure::llm::InferenceConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::prompt::TemplateStoreConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub message_store: MessageStoreConfig,
    #[serde(default)]
    pub template_store: TemplateStoreConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings of the recap pipeline
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Model identifier (plain ID or ARN) sent to the inference backend
    pub model_id: String,
    /// Maximum number of historical messages per execution
    pub page_size: usize,
    pub history_window: HistoryWindow,
    /// Object key of the prompt template
    pub template_key: String,
    pub store_timeout_ms: u64,
    pub inference_timeout_ms: u64,
    /// Run executions of the same conversation one at a time
    pub serialize_by_conversation: bool,
    /// How long terminal outcomes stay queryable
    pub outcome_retention_secs: u64,
    pub outcome_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            model_id: "amazon.titan-text-lite-v1".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            history_window: HistoryWindow::default(),
            template_key: "prompt.txt".to_string(),
            store_timeout_ms: 5_000,
            inference_timeout_ms: 60_000,
            serialize_by_conversation: false,
            outcome_retention_secs: 3_600,
            outcome_capacity: 10_000,
        }
    }
}

impl WorkflowConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_size == 0 {
            return Err(DomainError::configuration("workflow.page_size must be positive"));
        }

        if self.store_timeout_ms == 0 || self.inference_timeout_ms == 0 {
            return Err(DomainError::configuration(
                "workflow timeouts must be positive",
            ));
        }

        if self.template_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "workflow.template_key cannot be empty",
            ));
        }

        ModelFamily::resolve(&self.model_id)
            .map_err(|e| DomainError::configuration(format!("workflow.model_id: {}", e)))?;

        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.workflow.validate()
    }
}
