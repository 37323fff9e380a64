//! Template store implementations

mod directory;
mod factory;
mod in_memory;
mod s3;

pub use directory::DirectoryTemplateStore;
pub use factory::{TemplateStoreConfig, TemplateStoreFactory};
pub use in_memory::InMemoryTemplateStore;
pub use s3::S3TemplateStore;
