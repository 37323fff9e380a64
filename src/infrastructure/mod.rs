//! Infrastructure layer - External service implementations

pub mod aws;
pub mod conversation;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod prompt;
pub mod workflow;
