//! Inference client trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::request::{InferenceReceipt, ModelRequest};
use crate::domain::DomainError;

/// Synchronous model invocation against the inference backend.
///
/// One client is created per process and shared by every execution.
#[async_trait]
pub trait InferenceClient: Send + Sync + Debug {
    async fn invoke(&self, request: &ModelRequest) -> Result<InferenceReceipt, DomainError>;

    /// Backend name for logs and metrics
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Recording inference client
    #[derive(Debug, Default)]
    pub struct MockInferenceClient {
        requests: Mutex<Vec<ModelRequest>>,
        error: Option<String>,
        delay: Option<Duration>,
    }

    impl MockInferenceClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<ModelRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceClient for MockInferenceClient {
        async fn invoke(&self, request: &ModelRequest) -> Result<InferenceReceipt, DomainError> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            Ok(InferenceReceipt::new(&request.model_id, 2))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
