//! In-process discussion store

use super::replay_pending;
use async_trait::async_trait;
use boardroom_application::{DiscussionStore, DiscussionSummary, StoreError};
use boardroom_domain::{Discussion, DiscussionId, Turn};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    snapshots: HashMap<DiscussionId, Discussion>,
    /// Appended turns, including those already folded into a snapshot
    turns: HashMap<DiscussionId, Vec<Turn>>,
}

/// Store that lives as long as the process.
///
/// Mirrors the file store's snapshot-plus-log behaviour so resume logic can
/// be exercised without touching disk.
#[derive(Default)]
pub struct InMemoryDiscussionStore {
    inner: Mutex<Inner>,
}

impl InMemoryDiscussionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DiscussionStore for InMemoryDiscussionStore {
    async fn save(&self, discussion: &Discussion) -> Result<(), StoreError> {
        self.lock()
            .snapshots
            .insert(discussion.id().clone(), discussion.clone());
        Ok(())
    }

    async fn load(&self, id: &DiscussionId) -> Result<Discussion, StoreError> {
        let inner = self.lock();
        let snapshot = inner
            .snapshots
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let logged = inner.turns.get(id).cloned().unwrap_or_default();
        drop(inner);

        replay_pending(snapshot, logged)
    }

    async fn append_turn(&self, id: &DiscussionId, turn: &Turn) -> Result<(), StoreError> {
        self.lock()
            .turns
            .entry(id.clone())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError> {
        let ids: Vec<DiscussionId> = self.lock().snapshots.keys().cloned().collect();
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            summaries.push(DiscussionSummary::of(&self.load(&id).await?));
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn delete(&self, id: &DiscussionId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.turns.remove(id);
        inner
            .snapshots
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
