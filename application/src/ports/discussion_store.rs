//! Discussion persistence port
//!
//! Storage is an external collaborator: the engine saves snapshots, appends
//! committed turns, and can load a discussion back to resume it.

use async_trait::async_trait;
use boardroom_domain::{Discussion, DiscussionId, DiscussionStatus, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Discussion not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Listing entry for a stored discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionSummary {
    pub id: DiscussionId,
    pub topic: String,
    pub status: DiscussionStatus,
    pub turn_count: usize,
    pub created_at: DateTime<Utc>,
}

impl DiscussionSummary {
    pub fn of(discussion: &Discussion) -> Self {
        Self {
            id: discussion.id().clone(),
            topic: discussion.topic().content().to_string(),
            status: discussion.status(),
            turn_count: discussion.turns().len(),
            created_at: discussion.created_at(),
        }
    }
}

/// Persistence for discussions
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Write a full snapshot, replacing any previous one
    async fn save(&self, discussion: &Discussion) -> Result<(), StoreError>;

    /// Load a discussion, including turns appended after the last snapshot
    async fn load(&self, id: &DiscussionId) -> Result<Discussion, StoreError>;

    /// Durably append one committed turn
    async fn append_turn(&self, id: &DiscussionId, turn: &Turn) -> Result<(), StoreError>;

    /// Every stored discussion, newest first
    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError>;

    async fn delete(&self, id: &DiscussionId) -> Result<(), StoreError>;
}

/// Store that keeps nothing; `load` always reports not found
pub struct NoDiscussionStore;

#[async_trait]
impl DiscussionStore for NoDiscussionStore {
    async fn save(&self, _discussion: &Discussion) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load(&self, id: &DiscussionId) -> Result<Discussion, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn append_turn(&self, _id: &DiscussionId, _turn: &Turn) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: &DiscussionId) -> Result<(), StoreError> {
        Ok(())
    }
}
