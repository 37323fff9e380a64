use serde::Deserialize;
use std::sync::Arc;

use super::{DirectoryTemplateStore, S3TemplateStore};
use crate::domain::TemplateStore;
use crate::infrastructure::aws::load_sdk_config;

/// Template store backend configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateStoreConfig {
    Directory {
        #[serde(default = "default_directory")]
        path: String,
    },
    S3 {
        bucket: String,
        #[serde(default)]
        region: Option<String>,
    },
}

fn default_directory() -> String {
    "prompts".to_string()
}

impl Default for TemplateStoreConfig {
    fn default() -> Self {
        Self::Directory {
            path: default_directory(),
        }
    }
}

/// Factory for the process-wide template store
#[derive(Debug)]
pub struct TemplateStoreFactory;

impl TemplateStoreFactory {
    pub async fn create(config: &TemplateStoreConfig) -> Arc<dyn TemplateStore> {
        match config {
            TemplateStoreConfig::Directory { path } => {
                Arc::new(DirectoryTemplateStore::new(path.as_str()))
            }
            TemplateStoreConfig::S3 { bucket, region } => {
                let sdk_config = load_sdk_config(region.as_deref()).await;
                Arc::new(S3TemplateStore::new(&sdk_config, bucket.as_str()))
            }
        }
    }
}
