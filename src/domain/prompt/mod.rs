//! Prompt domain: stored templates and history composition

pub mod repository;
mod template;

pub use repository::TemplateStore;
pub use template::{
    join_history, PromptTemplate, TemplateError, HISTORY_PLACEHOLDER, HISTORY_SEPARATOR,
};

#[cfg(test)]
pub use repository::MockTemplateStore;
