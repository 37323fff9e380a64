//! Inference client implementations

mod bedrock;
mod factory;

pub use bedrock::{BedrockClient, BedrockClientTrait, BedrockInferenceClient};
pub use factory::{InferenceClientFactory, InferenceConfig};
