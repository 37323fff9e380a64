//! DynamoDB message store

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::domain::conversation::{
    ConversationId, HistoryQuery, HistoryWindow, MessageStore, StoredMessage,
};
use crate::domain::DomainError;

/// A DynamoDB item as returned by the SDK
pub type Item = HashMap<String, AttributeValue>;

/// Attribute layout of the conversation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbTableLayout {
    pub table_name: String,
    pub partition_key: String,
    pub sort_key: String,
    pub text_attribute: String,
}

impl DynamoDbTableLayout {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: "Id".to_string(),
            sort_key: "timestamp".to_string(),
            text_attribute: "message".to_string(),
        }
    }
}

/// Key-condition query on one partition, `#pk = :id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionQuery {
    pub table_name: String,
    pub partition_key: String,
    pub partition_value: String,
    pub limit: i32,
    /// `ScanIndexForward`: ascending by sort key when true
    pub scan_forward: bool,
}

/// DynamoDB operations used by the message store, for dependency injection
#[async_trait]
pub trait DynamoDbClientTrait: Send + Sync + std::fmt::Debug {
    async fn query(&self, query: PartitionQuery) -> Result<Vec<Item>, DomainError>;

    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), DomainError>;
}

/// Message store backed by a DynamoDB table keyed by (conversation ID, timestamp)
#[derive(Debug)]
pub struct DynamoDbMessageStore<C: DynamoDbClientTrait> {
    client: C,
    layout: DynamoDbTableLayout,
}

impl<C: DynamoDbClientTrait> DynamoDbMessageStore<C> {
    pub fn new(client: C, layout: DynamoDbTableLayout) -> Self {
        Self { client, layout }
    }

    pub fn layout(&self) -> &DynamoDbTableLayout {
        &self.layout
    }

    fn partition_query(&self, query: &HistoryQuery) -> Result<PartitionQuery, DomainError> {
        let limit = i32::try_from(query.limit).map_err(|_| {
            DomainError::validation(format!("Query limit {} is out of range", query.limit))
        })?;

        Ok(PartitionQuery {
            table_name: self.layout.table_name.clone(),
            partition_key: self.layout.partition_key.clone(),
            partition_value: query.conversation_id.as_str().to_string(),
            limit,
            scan_forward: query.window == HistoryWindow::Earliest,
        })
    }

    fn record_from_item(
        &self,
        conversation_id: &ConversationId,
        item: &Item,
    ) -> Result<StoredMessage, DomainError> {
        let timestamp = item
            .get(&self.layout.sort_key)
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| {
                DomainError::storage(format!(
                    "Item in '{}' has no string '{}' attribute",
                    self.layout.table_name, self.layout.sort_key
                ))
            })?;

        let text = item
            .get(&self.layout.text_attribute)
            .and_then(|v| v.as_s().ok())
            .cloned();

        Ok(StoredMessage {
            conversation_id: conversation_id.clone(),
            timestamp: timestamp.clone(),
            text,
        })
    }
}

#[async_trait]
impl<C: DynamoDbClientTrait> MessageStore for DynamoDbMessageStore<C> {
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredMessage>, DomainError> {
        let mut items = self.client.query(self.partition_query(query)?).await?;
        items.truncate(query.limit);

        // A backward scan comes back newest-first
        if query.window == HistoryWindow::Latest {
            items.reverse();
        }

        items
            .iter()
            .map(|item| self.record_from_item(&query.conversation_id, item))
            .collect()
    }

    async fn append(&self, message: StoredMessage) -> Result<(), DomainError> {
        let mut item = Item::new();
        item.insert(
            self.layout.partition_key.clone(),
            AttributeValue::S(message.conversation_id.as_str().to_string()),
        );
        item.insert(
            self.layout.sort_key.clone(),
            AttributeValue::S(message.timestamp),
        );

        if let Some(text) = message.text {
            item.insert(self.layout.text_attribute.clone(), AttributeValue::S(text));
        }

        self.client.put_item(&self.layout.table_name, item).await
    }

    fn store_name(&self) -> &'static str {
        "dynamodb"
    }
}

/// Real DynamoDB client implementation
#[derive(Debug, Clone)]
pub struct DynamoDbClient {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoDbClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
        }
    }

    pub fn from_client(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DynamoDbClientTrait for DynamoDbClient {
    async fn query(&self, query: PartitionQuery) -> Result<Vec<Item>, DomainError> {
        let output = self
            .client
            .query()
            .table_name(query.table_name)
            .key_condition_expression("#pk = :id")
            .expression_attribute_names("#pk", query.partition_key)
            .expression_attribute_values(":id", AttributeValue::S(query.partition_value))
            .limit(query.limit)
            .scan_index_forward(query.scan_forward)
            .send()
            .await
            .map_err(|e| {
                DomainError::storage(format!("DynamoDB query failed: {}", DisplayErrorContext(&e)))
            })?;

        Ok(output.items.unwrap_or_default())
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), DomainError> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "DynamoDB put_item failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
