//! Topic value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Longest topic accepted, in characters
pub const MAX_TOPIC_CHARS: usize = 500;

/// The subject a board discusses (Value Object)
///
/// Input arrives pre-sanitized; this type only enforces the shape the engine
/// relies on: trimmed, non-empty, bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Validate and create a topic
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTopic("topic cannot be empty".to_string()));
        }
        let chars = trimmed.chars().count();
        if chars > MAX_TOPIC_CHARS {
            return Err(DomainError::InvalidTopic(format!(
                "topic is {} characters, maximum is {}",
                chars, MAX_TOPIC_CHARS
            )));
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the topic content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Topic {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::try_new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.content
    }
}
