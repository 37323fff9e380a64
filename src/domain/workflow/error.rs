//! Workflow error taxonomy

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::prompt::TemplateError;
use crate::domain::DomainError;

/// Errors that terminate a workflow execution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template malformed: {0}")]
    TemplateMalformed(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Inference failure: {0}")]
    InferenceFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable tag of a [`WorkflowError`], used for labels and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    StoreUnavailable,
    TemplateNotFound,
    TemplateMalformed,
    MalformedMessage,
    UnsupportedModel,
    InferenceFailure,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::StoreUnavailable => "store_unavailable",
            Self::TemplateNotFound => "template_not_found",
            Self::TemplateMalformed => "template_malformed",
            Self::MalformedMessage => "malformed_message",
            Self::UnsupportedModel => "unsupported_model",
            Self::InferenceFailure => "inference_failure",
            Self::Internal => "internal",
        }
    }

    /// Failures caused by the trigger itself rather than a dependency
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn template_not_found(message: impl Into<String>) -> Self {
        Self::TemplateNotFound(message.into())
    }

    pub fn template_malformed(message: impl Into<String>) -> Self {
        Self::TemplateMalformed(message.into())
    }

    pub fn malformed_message(message: impl Into<String>) -> Self {
        Self::MalformedMessage(message.into())
    }

    pub fn unsupported_model(message: impl Into<String>) -> Self {
        Self::UnsupportedModel(message.into())
    }

    pub fn inference_failure(message: impl Into<String>) -> Self {
        Self::InferenceFailure(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// A blocking store call exceeded its deadline
    pub fn store_timeout(operation: &str, timeout_ms: u64) -> Self {
        Self::StoreUnavailable(format!("{} timed out after {}ms", operation, timeout_ms))
    }

    /// The inference call exceeded its deadline
    pub fn inference_timeout(timeout_ms: u64) -> Self {
        Self::InferenceFailure(format!("inference call timed out after {}ms", timeout_ms))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::TemplateNotFound(_) => ErrorKind::TemplateNotFound,
            Self::TemplateMalformed(_) => ErrorKind::TemplateMalformed,
            Self::MalformedMessage(_) => ErrorKind::MalformedMessage,
            Self::UnsupportedModel(_) => ErrorKind::UnsupportedModel,
            Self::InferenceFailure(_) => ErrorKind::InferenceFailure,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Classify an error from a message or template store
    pub fn from_store(error: DomainError) -> Self {
        match error {
            DomainError::NotFound { message } => Self::TemplateNotFound(message),
            DomainError::InvalidId { message } | DomainError::Validation { message } => {
                Self::InvalidInput(message)
            }
            other => Self::StoreUnavailable(other.to_string()),
        }
    }

    /// Classify an error from the inference client
    pub fn from_inference(error: DomainError) -> Self {
        Self::InferenceFailure(error.to_string())
    }
}

impl From<TemplateError> for WorkflowError {
    fn from(error: TemplateError) -> Self {
        Self::TemplateMalformed(error.to_string())
    }
}
