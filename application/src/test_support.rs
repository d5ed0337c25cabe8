//! Shared test doubles for the application layer

use crate::ports::completion_gateway::{
    CompletionGateway, CompletionRequest, CompletionResponse, GatewayError,
};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::discussion_store::{DiscussionStore, DiscussionSummary, StoreError};
use async_trait::async_trait;
use boardroom_domain::{Discussion, DiscussionId, Model, TokenUsage, Turn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Outcome = Result<CompletionResponse, GatewayError>;

pub(crate) fn server_error() -> GatewayError {
    status(503, "service unavailable")
}

pub(crate) fn status(code: u16, message: &str) -> GatewayError {
    GatewayError::Status {
        status: code,
        message: message.to_string(),
    }
}

/// Scripted gateway.
///
/// Each model pops from its own queue of outcomes; once the queue is empty
/// the model fails permanently if marked with [`MockGateway::fail_always`],
/// hangs if marked with [`MockGateway::hang`], and answers otherwise.
pub(crate) struct MockGateway {
    scripts: Mutex<HashMap<Model, VecDeque<Outcome>>>,
    failing: Mutex<HashMap<Model, GatewayError>>,
    hanging: Mutex<HashSet<Model>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashMap::new()),
            hanging: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn script(&self, model: Model, outcomes: impl IntoIterator<Item = Outcome>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(model)
            .or_default()
            .extend(outcomes);
    }

    pub(crate) fn fail_always(&self, model: Model, error: GatewayError) {
        self.failing.lock().unwrap().insert(model, error);
    }

    pub(crate) fn recover(&self, model: &Model) {
        self.failing.lock().unwrap().remove(model);
    }

    pub(crate) fn hang(&self, model: Model) {
        self.hanging.lock().unwrap().insert(model);
    }

    pub(crate) fn calls_for(&self, model: &Model) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.model == model)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_outcome(&self, model: &Model) -> Option<Outcome> {
        if let Some(outcome) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(|q| q.pop_front())
        {
            return Some(outcome);
        }
        self.failing.lock().unwrap().get(model).cloned().map(Err)
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(outcome) = self.next_outcome(&request.model) {
            return outcome;
        }

        let hangs = self.hanging.lock().unwrap().contains(&request.model);
        if hangs {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            return Err(GatewayError::Timeout);
        }

        Ok(CompletionResponse {
            content: format!("Position from {}", request.model),
            served_model: Some(request.model.clone()),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
                cost_usd: None,
            }),
        })
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(vec![Model::Gpt4, Model::Claude3Sonnet, Model::GeminiPro])
    }
}

/// In-memory store that also records appended turn sequences
#[derive(Default)]
pub(crate) struct MemoryStore {
    discussions: Mutex<HashMap<DiscussionId, Discussion>>,
    appended: Mutex<HashMap<DiscussionId, Vec<u64>>>,
}

impl MemoryStore {
    pub(crate) fn appended(&self, id: &DiscussionId) -> Vec<u64> {
        self.appended
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DiscussionStore for MemoryStore {
    async fn save(&self, discussion: &Discussion) -> Result<(), StoreError> {
        self.discussions
            .lock()
            .unwrap()
            .insert(discussion.id().clone(), discussion.clone());
        Ok(())
    }

    async fn load(&self, id: &DiscussionId) -> Result<Discussion, StoreError> {
        self.discussions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn append_turn(&self, id: &DiscussionId, turn: &Turn) -> Result<(), StoreError> {
        self.appended
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .push(turn.sequence);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError> {
        Ok(self
            .discussions
            .lock()
            .unwrap()
            .values()
            .map(DiscussionSummary::of)
            .collect())
    }

    async fn delete(&self, id: &DiscussionId) -> Result<(), StoreError> {
        self.discussions.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Store whose every operation fails
pub(crate) struct FailingStore;

fn disk_full() -> StoreError {
    StoreError::Io(std::io::Error::other("disk full"))
}

#[async_trait]
impl DiscussionStore for FailingStore {
    async fn save(&self, _discussion: &Discussion) -> Result<(), StoreError> {
        Err(disk_full())
    }

    async fn load(&self, _id: &DiscussionId) -> Result<Discussion, StoreError> {
        Err(disk_full())
    }

    async fn append_turn(&self, _id: &DiscussionId, _turn: &Turn) -> Result<(), StoreError> {
        Err(disk_full())
    }

    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError> {
        Err(disk_full())
    }

    async fn delete(&self, _id: &DiscussionId) -> Result<(), StoreError> {
        Err(disk_full())
    }
}

/// Logger that keeps every event type it sees
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingLogger {
    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == event_type)
            .count()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}
