use serde::Deserialize;
use std::sync::Arc;

use super::{DynamoDbClient, DynamoDbMessageStore, DynamoDbTableLayout, InMemoryMessageStore};
use crate::domain::MessageStore;
use crate::infrastructure::aws::load_sdk_config;

/// Message store backend configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageStoreConfig {
    InMemory,
    DynamoDb {
        table_name: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default = "default_partition_key")]
        partition_key: String,
        #[serde(default = "default_sort_key")]
        sort_key: String,
        #[serde(default = "default_text_attribute")]
        text_attribute: String,
    },
}

fn default_partition_key() -> String {
    "Id".to_string()
}

fn default_sort_key() -> String {
    "timestamp".to_string()
}

fn default_text_attribute() -> String {
    "message".to_string()
}

impl Default for MessageStoreConfig {
    fn default() -> Self {
        Self::InMemory
    }
}

/// Factory for the process-wide message store
#[derive(Debug)]
pub struct MessageStoreFactory;

impl MessageStoreFactory {
    pub async fn create(config: &MessageStoreConfig) -> Arc<dyn MessageStore> {
        match config {
            MessageStoreConfig::InMemory => Arc::new(InMemoryMessageStore::new()),
            MessageStoreConfig::DynamoDb {
                table_name,
                region,
                partition_key,
                sort_key,
                text_attribute,
            } => {
                let sdk_config = load_sdk_config(region.as_deref()).await;
                let layout = DynamoDbTableLayout {
                    table_name: table_name.clone(),
                    partition_key: partition_key.clone(),
                    sort_key: sort_key.clone(),
                    text_attribute: text_attribute.clone(),
                };

                Arc::new(DynamoDbMessageStore::new(
                    DynamoDbClient::new(&sdk_config),
                    layout,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_dynamodb_defaults() {
        let config: MessageStoreConfig =
            serde_json::from_str(r#"{"type":"dynamo_db","table_name":"ConversationTable"}"#)
                .unwrap();

        match config {
            MessageStoreConfig::DynamoDb {
                table_name,
                partition_key,
                sort_key,
                text_attribute,
                region,
            } => {
                assert_eq!(table_name, "ConversationTable");
                assert_eq!(partition_key, "Id");
                assert_eq!(sort_key, "timestamp");
                assert_eq!(text_attribute, "message");
                assert!(region.is_none());
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let store = MessageStoreFactory::create(&MessageStoreConfig::InMemory).await;
        assert_eq!(store.store_name(), "in_memory");
    }
}
