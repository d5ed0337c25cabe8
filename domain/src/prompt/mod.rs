//! Prompt domain
//!
//! Builds the message list a persona sees when it takes a turn.

mod template;

pub use template::{ContextWindow, PromptTemplate};
