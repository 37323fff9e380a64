//! Prompt template and history composition
//!
//! A template carries exactly one `{history}` placeholder. Composition joins
//! the flattened history with [`HISTORY_SEPARATOR`] and substitutes it there.
//! There is no truncation: the history length is bounded by the page size.

use serde::Serialize;
use thiserror::Error;

/// Substitution point for the rendered history
pub const HISTORY_PLACEHOLDER: &str = "{history}";

/// Separator placed between consecutive message texts
pub const HISTORY_SEPARATOR: &str = " ";

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Template has no {{history}} placeholder")]
    MissingPlaceholder,

    #[error("Template has {count} {{history}} placeholders, expected exactly one")]
    DuplicatePlaceholder { count: usize },

    #[error("Template is not valid UTF-8: {0}")]
    InvalidEncoding(String),
}

/// Raw prompt template, an execution-scoped copy of the stored blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    content: String,
}

impl PromptTemplate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Decode a stored blob; the content must be UTF-8
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TemplateError> {
        String::from_utf8(bytes)
            .map(Self::new)
            .map_err(|e| TemplateError::InvalidEncoding(e.utf8_error().to_string()))
    }

    /// Get the original template content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn placeholder_count(&self) -> usize {
        self.content.matches(HISTORY_PLACEHOLDER).count()
    }

    /// Check that the template has exactly one placeholder
    pub fn validate(&self) -> Result<(), TemplateError> {
        match self.placeholder_count() {
            1 => Ok(()),
            0 => Err(TemplateError::MissingPlaceholder),
            count => Err(TemplateError::DuplicatePlaceholder { count }),
        }
    }

    /// Substitute the joined history into the placeholder
    pub fn compose<I, S>(&self, history: I) -> Result<String, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.validate()?;

        let rendered = join_history(history);

        Ok(self.content.replacen(HISTORY_PLACEHOLDER, &rendered, 1))
    }
}

/// Join message texts with the history separator
pub fn join_history<I, S>(history: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();

    for (i, text) in history.into_iter().enumerate() {
        if i > 0 {
            joined.push_str(HISTORY_SEPARATOR);
        }
        joined.push_str(text.as_ref());
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_decodes_utf8() {
        let template = PromptTemplate::from_bytes(b"Recap: {history}".to_vec()).unwrap();
        assert_eq!(template.content(), "Recap: {history}");
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let err = PromptTemplate::from_bytes(vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidEncoding(_)));
    }

    #[test]
    fn test_compose_joins_with_space() {
        let template = PromptTemplate::new("History: {history}");
        let prompt = template.compose(["hello", "how are you"]).unwrap();
        assert_eq!(prompt, "History: hello how are you");
    }

    #[test]
    fn test_compose_empty_history_keeps_literal_text() {
        let template = PromptTemplate::new("Summarize the following: {history}\nThanks.");
        let prompt = template.compose(Vec::<String>::new()).unwrap();
        assert_eq!(prompt, "Summarize the following: \nThanks.");
    }

    #[test]
    fn test_compose_placeholder_only() {
        let template = PromptTemplate::new("{history}");
        assert_eq!(template.compose(Vec::<&str>::new()).unwrap(), "");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let template = PromptTemplate::new("[{history}]");
        let history = vec!["a".to_string(), "b".to_string()];

        let first = template.compose(&history).unwrap();
        let second = template.compose(&history).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, "[a b]");
    }

    #[test]
    fn test_compose_does_not_rescan_substituted_history() {
        let template = PromptTemplate::new("H: {history}");
        let prompt = template.compose(["literal {history} in a message"]).unwrap();
        assert_eq!(prompt, "H: literal {history} in a message");
    }

    #[test]
    fn test_missing_placeholder() {
        let template = PromptTemplate::new("No substitution point here");
        assert_eq!(
            template.compose(["x"]).unwrap_err(),
            TemplateError::MissingPlaceholder
        );
    }

    #[test]
    fn test_duplicate_placeholder() {
        let template = PromptTemplate::new("{history} and {history}");
        assert_eq!(
            template.validate().unwrap_err(),
            TemplateError::DuplicatePlaceholder { count: 2 }
        );
    }

    #[test]
    fn test_join_history() {
        assert_eq!(join_history(Vec::<&str>::new()), "");
        assert_eq!(join_history(["one"]), "one");
        assert_eq!(join_history(["one", "two", "three"]), "one two three");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TemplateError::MissingPlaceholder.to_string(),
            "Template has no {history} placeholder"
        );
    }
}
