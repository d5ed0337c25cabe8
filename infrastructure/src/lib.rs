//! Infrastructure layer for ai-boardroom
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;
pub mod persistence;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileConfig, FileDiscussionConfig,
    FileLoggingConfig, FilePersonaConfig, FileResilienceConfig, FileStorageConfig,
};
pub use logging::JsonlConversationLogger;
pub use openrouter::OpenRouterGateway;
pub use persistence::{InMemoryDiscussionStore, JsonFileDiscussionStore};
