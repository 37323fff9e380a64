//! S3 template store

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;

use crate::domain::prompt::TemplateStore;
use crate::domain::DomainError;

/// Reads template objects from an S3 bucket
#[derive(Debug, Clone)]
pub struct S3TemplateStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3TemplateStore {
    pub fn new(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket: bucket.into(),
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl TemplateStore for S3TemplateStore {
    async fn read_object(&self, key: &str) -> Result<Vec<u8>, DomainError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetObjectError::NoSuchKey(_) => DomainError::not_found(format!(
                    "Object '{}' not found in bucket '{}'",
                    key, self.bucket
                )),
                other => DomainError::storage(format!(
                    "S3 get_object failed: {}",
                    DisplayErrorContext(&other)
                )),
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read object body: {}", e)))?;

        Ok(body.into_bytes().to_vec())
    }

    fn store_name(&self) -> &'static str {
        "s3"
    }
}
