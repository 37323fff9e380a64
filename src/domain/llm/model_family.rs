//! Model families and model identifier resolution

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::request::ModelRequest;
use crate::domain::workflow::WorkflowError;

/// Splits a model identifier (plain id or ARN) into lowercase tokens
static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Token-to-family mapping used by [`ModelFamily::resolve`]
const FAMILY_TOKENS: &[(&str, ModelFamily)] = &[
    ("mistral", ModelFamily::Mistral),
    ("titan", ModelFamily::Titan),
];

/// A class of inference backends sharing a request body shape.
///
/// Every known family accepts a single prompt field; they differ only in the
/// name of that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Mistral,
    Titan,
}

impl ModelFamily {
    /// Resolve the family of a model identifier.
    ///
    /// The identifier is split on non-alphanumeric characters and each token
    /// is looked up in the family table. No match, or tokens of more than one
    /// family, is `UnsupportedModel`.
    pub fn resolve(model_id: &str) -> Result<Self, WorkflowError> {
        let lowered = model_id.to_ascii_lowercase();
        let mut resolved: Option<ModelFamily> = None;

        for token in TOKEN_SEPARATOR.split(&lowered) {
            let Some((_, family)) = FAMILY_TOKENS.iter().find(|(name, _)| *name == token) else {
                continue;
            };

            match resolved {
                Some(existing) if existing != *family => {
                    return Err(WorkflowError::unsupported_model(format!(
                        "model identifier '{}' is ambiguous: matches both {} and {}",
                        model_id, existing, family
                    )));
                }
                _ => resolved = Some(*family),
            }
        }

        resolved.ok_or_else(|| {
            WorkflowError::unsupported_model(format!(
                "model identifier '{}' matches no supported model family",
                model_id
            ))
        })
    }

    /// Field of the request body that carries the prompt
    pub fn prompt_field(&self) -> &'static str {
        match self {
            Self::Mistral => "prompt",
            Self::Titan => "inputText",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mistral => "mistral",
            Self::Titan => "titan",
        }
    }

    /// Shape the request body for this family
    pub fn build_request(&self, model_id: impl Into<String>, prompt: &str) -> ModelRequest {
        let body = match self {
            Self::Mistral => json!({ "prompt": prompt }),
            Self::Titan => json!({ "inputText": prompt }),
        };

        ModelRequest::new(model_id, *self, body)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Translate a generic `(model_id, prompt)` pair into the vendor request
pub fn request_for_model(model_id: &str, prompt: &str) -> Result<ModelRequest, WorkflowError> {
    let family = ModelFamily::resolve(model_id)?;
    Ok(family.build_request(model_id, prompt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::ErrorKind;

    #[test]
    fn test_resolve_titan() {
        assert_eq!(
            ModelFamily::resolve("amazon.titan-text-lite-v1").unwrap(),
            ModelFamily::Titan
        );
        assert_eq!(
            ModelFamily::resolve(
                "arn:aws:bedrock:us-east-1::foundation-model/amazon.titan-text-express-v1"
            )
            .unwrap(),
            ModelFamily::Titan
        );
    }

    #[test]
    fn test_resolve_mistral() {
        assert_eq!(
            ModelFamily::resolve("mistral.mistral-7b-instruct-v0:2").unwrap(),
            ModelFamily::Mistral
        );
        assert_eq!(
            ModelFamily::resolve("mistral.mixtral-8x7b-instruct-v0:1").unwrap(),
            ModelFamily::Mistral
        );
        assert_eq!(ModelFamily::resolve("MISTRAL.Large").unwrap(), ModelFamily::Mistral);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = ModelFamily::resolve("anthropic.claude-3-haiku-20240307-v1:0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedModel);

        assert!(ModelFamily::resolve("").is_err());
    }

    #[test]
    fn test_resolve_ambiguous() {
        let err = ModelFamily::resolve("custom.mistral-titan-blend").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedModel);
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_resolve_does_not_match_partial_tokens() {
        assert!(ModelFamily::resolve("acme.titanium-v1").is_err());
    }

    #[test]
    fn test_mistral_request_uses_prompt_field() {
        let request = request_for_model("mistral.mistral-large-2402-v1:0", "Recap: hi").unwrap();

        assert_eq!(request.family, ModelFamily::Mistral);
        assert_eq!(request.body, json!({ "prompt": "Recap: hi" }));
        assert_eq!(request.prompt(), Some("Recap: hi"));
    }

    #[test]
    fn test_titan_request_uses_input_text_field() {
        let request = request_for_model("amazon.titan-text-lite-v1", "Recap: hi").unwrap();

        assert_eq!(request.model_id, "amazon.titan-text-lite-v1");
        assert_eq!(request.body, json!({ "inputText": "Recap: hi" }));
        assert!(request.body.get("prompt").is_none());
    }

    #[test]
    fn test_unsupported_model_produces_no_request() {
        let result = request_for_model("meta.llama3-8b-instruct-v1:0", "Recap");
        assert!(matches!(result, Err(WorkflowError::UnsupportedModel(_))));
    }

    #[test]
    fn test_prompt_field_matches_body() {
        for family in [ModelFamily::Mistral, ModelFamily::Titan] {
            let request = family.build_request("m", "p");
            assert_eq!(request.body[family.prompt_field()], "p");
        }
    }
}
