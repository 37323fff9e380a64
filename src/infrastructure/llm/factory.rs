use serde::Deserialize;
use std::sync::Arc;

use super::bedrock::{BedrockClient, BedrockInferenceClient};
use crate::domain::InferenceClient;
use crate::infrastructure::aws::load_sdk_config;

/// Inference backend configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InferenceConfig {
    Bedrock {
        #[serde(default)]
        region: Option<String>,
    },
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::Bedrock { region: None }
    }
}

/// Factory for the process-wide inference client
#[derive(Debug)]
pub struct InferenceClientFactory;

impl InferenceClientFactory {
    pub async fn create(config: &InferenceConfig) -> Arc<dyn InferenceClient> {
        match config {
            InferenceConfig::Bedrock { region } => {
                let sdk_config = load_sdk_config(region.as_deref()).await;
                Arc::new(BedrockInferenceClient::new(BedrockClient::new(&sdk_config)))
            }
        }
    }
}
