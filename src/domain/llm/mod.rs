//! Inference domain: model families, vendor-shaped requests and the inference client

mod client;
mod model_family;
mod request;

pub use client::InferenceClient;
pub use model_family::{request_for_model, ModelFamily};
pub use request::{InferenceReceipt, ModelRequest};

#[cfg(test)]
pub use client::mock::MockInferenceClient;
