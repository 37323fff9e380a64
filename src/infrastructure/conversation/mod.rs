//! Message store implementations

mod dynamodb;
mod factory;
mod in_memory;

pub use dynamodb::{
    DynamoDbClient, DynamoDbClientTrait, DynamoDbMessageStore, DynamoDbTableLayout, Item,
    PartitionQuery,
};
pub use factory::{MessageStoreConfig, MessageStoreFactory};
pub use in_memory::InMemoryMessageStore;
