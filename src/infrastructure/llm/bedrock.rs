//! AWS Bedrock inference client

use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;

use crate::domain::{DomainError, InferenceClient, InferenceReceipt, ModelRequest};

/// AWS Bedrock runtime trait for dependency injection
#[async_trait]
pub trait BedrockClientTrait: Send + Sync + std::fmt::Debug {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, DomainError>;
}

/// Inference client that sends vendor-shaped requests to Bedrock
#[derive(Debug)]
pub struct BedrockInferenceClient<C: BedrockClientTrait> {
    client: C,
}

impl<C: BedrockClientTrait> BedrockInferenceClient<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: BedrockClientTrait> InferenceClient for BedrockInferenceClient<C> {
    async fn invoke(&self, request: &ModelRequest) -> Result<InferenceReceipt, DomainError> {
        let body = request.body_bytes()?;

        let response = self.client.invoke_model(&request.model_id, body).await?;

        Ok(InferenceReceipt::new(&request.model_id, response.len()))
    }

    fn provider_name(&self) -> &'static str {
        "bedrock"
    }
}

/// Real AWS Bedrock client implementation
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_bedrockruntime::Client::new(config);
        Self { client }
    }

    pub fn from_client(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BedrockClientTrait for BedrockClient {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, DomainError> {
        let blob = aws_sdk_bedrockruntime::primitives::Blob::new(body);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .body(blob)
            .content_type("application/json")
            .accept("application/json")
            .send()
            .await
            .map_err(|e| {
                DomainError::provider("bedrock", format!("API error: {}", DisplayErrorContext(&e)))
            })?;

        Ok(response.body.into_inner())
    }
}
