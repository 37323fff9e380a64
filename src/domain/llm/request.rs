use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model_family::ModelFamily;
use crate::domain::DomainError;

/// Vendor-shaped inference request, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRequest {
    pub model_id: String,
    pub family: ModelFamily,
    pub body: Value,
}

impl ModelRequest {
    pub fn new(model_id: impl Into<String>, family: ModelFamily, body: Value) -> Self {
        Self {
            model_id: model_id.into(),
            family,
            body,
        }
    }

    /// The prompt carried in the family's prompt field
    pub fn prompt(&self) -> Option<&str> {
        self.body.get(self.family.prompt_field())?.as_str()
    }

    /// Serialize the body for the wire
    pub fn body_bytes(&self) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec(&self.body)
            .map_err(|e| DomainError::internal(format!("Failed to serialize request: {}", e)))
    }
}

/// Acknowledgement of a completed inference call.
///
/// The response body is opaque to the workflow; only its size is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceReceipt {
    pub model_id: String,
    pub response_bytes: usize,
}

impl InferenceReceipt {
    pub fn new(model_id: impl Into<String>, response_bytes: usize) -> Self {
        Self {
            model_id: model_id.into(),
            response_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_bytes() {
        let request = ModelRequest::new(
            "amazon.titan-text-lite-v1",
            ModelFamily::Titan,
            json!({ "inputText": "hi" }),
        );

        let bytes = request.body_bytes().unwrap();
        assert_eq!(bytes, br#"{"inputText":"hi"}"#.to_vec());
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let request = ModelRequest::new("m", ModelFamily::Mistral, json!({ "prompt": "p" }));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["modelId"], "m");
        assert_eq!(value["family"], "mistral");
        assert_eq!(value["body"]["prompt"], "p");
    }
}
