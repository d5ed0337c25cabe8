//! Run Discussion use case
//!
//! [`DiscussionOrchestrator`] composes the phase machine, the speaker
//! selector and the fallback router into one externally driven step,
//! [`DiscussionOrchestrator::advance`], that produces exactly one turn.

use crate::config::{CallerSettings, DiscussionSettings};
use crate::ports::completion_gateway::CompletionGateway;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::discussion_store::{DiscussionStore, DiscussionSummary, NoDiscussionStore, StoreError};
use crate::ports::progress::{DiscussionProgress, NoProgress};
use crate::resilience::fallback_router::{FallbackRouter, ModelFailure, RouterError};
use crate::resilience::model_caller::ModelCaller;
use crate::resilience::rate_limiter::RateLimiter;
use boardroom_domain::{
    Discussion, DiscussionId, DomainError, ErrorCategory, PersonaId, PersonaRegistry,
    PromptTemplate, SpeakerSelector, Topic, Turn, TurnDraft,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("Discussion not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl OrchestratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrchestratorError::Domain(e) => e.category(),
            OrchestratorError::Router(e) => e.category(),
            OrchestratorError::NotFound(_) => ErrorCategory::Validation,
            OrchestratorError::Storage(_) => ErrorCategory::State,
        }
    }
}

impl From<StoreError> for OrchestratorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => OrchestratorError::NotFound(id),
            other => OrchestratorError::Storage(other),
        }
    }
}

/// Everything an orchestrator shares with the rest of the process.
///
/// Built once at startup and passed in explicitly; the limiter is the only
/// piece shared across concurrently running discussions.
pub struct OrchestratorContext<G: CompletionGateway + 'static> {
    pub gateway: Arc<G>,
    pub registry: Arc<PersonaRegistry>,
    pub limiter: Arc<RateLimiter>,
    pub caller: CallerSettings,
    pub discussion: DiscussionSettings,
}

impl<G: CompletionGateway + 'static> OrchestratorContext<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<PersonaRegistry>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            gateway,
            registry,
            limiter,
            caller: CallerSettings::default(),
            discussion: DiscussionSettings::default(),
        }
    }

    pub fn with_caller_settings(mut self, caller: CallerSettings) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_discussion_settings(mut self, discussion: DiscussionSettings) -> Self {
        self.discussion = discussion;
        self
    }
}

/// Top-level coordinator of board discussions.
///
/// One orchestrator can drive many discussions concurrently, but a single
/// [`Discussion`] is advanced strictly sequentially: `advance` takes it by
/// `&mut`.
pub struct DiscussionOrchestrator<G: CompletionGateway + 'static> {
    registry: Arc<PersonaRegistry>,
    router: FallbackRouter<G>,
    selector: SpeakerSelector,
    settings: DiscussionSettings,
    store: Arc<dyn DiscussionStore>,
    logger: Arc<dyn ConversationLogger>,
    progress: Arc<dyn DiscussionProgress>,
}

impl<G: CompletionGateway + 'static> DiscussionOrchestrator<G> {
    pub fn new(context: OrchestratorContext<G>) -> Self {
        let caller = ModelCaller::new(context.gateway, context.limiter, context.caller);
        Self {
            registry: context.registry,
            router: FallbackRouter::new(caller),
            selector: SpeakerSelector::new(context.discussion.selector),
            settings: context.discussion,
            store: Arc::new(NoDiscussionStore),
            logger: Arc::new(NoConversationLogger),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DiscussionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn DiscussionProgress>) -> Self {
        self.progress = progress;
        self
    }

    // ==================== Lifecycle ====================

    /// Create a discussion in the Opening phase.
    ///
    /// Fails with a validation error for an empty or oversized topic, an
    /// empty or repeated persona list, or a persona the registry does not
    /// know.
    pub async fn start(
        &self,
        topic: &str,
        personas: Vec<PersonaId>,
    ) -> Result<Discussion, OrchestratorError> {
        let topic = Topic::try_new(topic)?;
        for id in &personas {
            self.registry.require(id)?;
        }

        let discussion = Discussion::new(
            DiscussionId::generate(),
            topic,
            personas,
            self.settings.phase_plan(),
        )?;

        info!(
            discussion = %discussion.id(),
            topic = %discussion.topic(),
            participants = discussion.participants().len(),
            "Discussion started"
        );
        self.logger.log(ConversationEvent::new(
            "discussion_started",
            json!({
                "discussion_id": discussion.id(),
                "topic": discussion.topic().content(),
                "participants": discussion.participants(),
                "plan": discussion.plan(),
            }),
        ));
        self.persist(&discussion, None).await;

        self.progress.on_discussion_start(&discussion);
        self.progress
            .on_phase_start(discussion.phase(), discussion.plan().target(discussion.phase()));
        Ok(discussion)
    }

    /// Load a stored discussion so it can be advanced further
    pub async fn resume(&self, id: &DiscussionId) -> Result<Discussion, OrchestratorError> {
        let discussion = self.store.load(id).await?;
        info!(
            discussion = %discussion.id(),
            turns = discussion.turns().len(),
            phase = %discussion.phase(),
            status = %discussion.status(),
            "Discussion resumed"
        );
        self.progress.on_discussion_start(&discussion);
        if discussion.is_active() {
            self.progress
                .on_phase_start(discussion.phase(), discussion.plan().target(discussion.phase()));
        }
        Ok(discussion)
    }

    /// Stored discussions, newest first
    pub async fn list(&self) -> Result<Vec<DiscussionSummary>, OrchestratorError> {
        Ok(self.store.list().await?)
    }

    /// Produce exactly one turn.
    ///
    /// On failure the discussion is left untouched and can be advanced
    /// again. Dropping the returned future before it completes (e.g. on
    /// Ctrl-C) also leaves the transcript unchanged.
    pub async fn advance(&self, discussion: &mut Discussion) -> Result<Turn, OrchestratorError> {
        if !discussion.is_active() || discussion.phase().is_terminal() {
            return Err(DomainError::DiscussionAlreadyDone(discussion.id().to_string()).into());
        }

        let speaker_id = self.selector.select(discussion, &self.registry)?;
        let persona = self.registry.require(&speaker_id)?;
        let phase = discussion.phase();
        debug!(
            discussion = %discussion.id(),
            speaker = %persona.id,
            phase = %phase,
            "Speaker selected"
        );

        let messages = PromptTemplate::build_messages(
            persona,
            discussion,
            &self.registry,
            &self.settings.context,
        );
        self.progress.on_turn_start(persona, phase);

        let invocation = match self.router.invoke(persona, &messages).await {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!(
                    discussion = %discussion.id(),
                    speaker = %persona.id,
                    error = %e,
                    "Turn failed, discussion left resumable"
                );
                self.log_fallbacks(discussion, persona.id.as_str(), e.failures());
                self.logger.log(ConversationEvent::new(
                    "turn_failed",
                    json!({
                        "discussion_id": discussion.id(),
                        "speaker": persona.id,
                        "phase": phase,
                        "error": e.to_string(),
                    }),
                ));
                return Err(e.into());
            }
        };

        self.log_fallbacks(discussion, persona.id.as_str(), &invocation.failures);
        for failure in &invocation.failures {
            self.progress
                .on_model_fallback(persona, &failure.model, &failure.error.to_string());
        }

        let turn = discussion
            .record_turn(TurnDraft {
                speaker: persona.id.clone(),
                content: invocation.response.content,
                model: invocation.model,
                primary_model: invocation.primary,
                latency: invocation.latency,
                usage: invocation.response.usage,
            })?
            .clone();

        info!(
            discussion = %discussion.id(),
            sequence = turn.sequence,
            speaker = %turn.speaker,
            phase = %turn.phase,
            model = %turn.model,
            latency_ms = turn.latency_ms,
            "Turn committed"
        );
        self.logger.log(ConversationEvent::new(
            "turn_committed",
            json!({
                "discussion_id": discussion.id(),
                "turn": &turn,
            }),
        ));
        self.persist(discussion, Some(&turn)).await;
        self.progress.on_turn_complete(persona, &turn);

        let next = discussion.phase();
        if next != phase {
            info!(discussion = %discussion.id(), from = %phase, to = %next, "Phase transition");
            if !next.is_terminal() {
                self.progress.on_phase_start(next, discussion.plan().target(next));
            }
        }
        if !discussion.is_active() {
            self.finished(discussion);
        }

        Ok(turn)
    }

    /// One step of a driven run: stop at the turn cap, otherwise advance.
    ///
    /// Returns `None` once the discussion is no longer active. In unbounded
    /// mode without `max_turns` only a failed turn or an external stop ends
    /// the run.
    pub async fn step(&self, discussion: &mut Discussion) -> Result<Option<Turn>, OrchestratorError> {
        if !discussion.is_active() {
            return Ok(None);
        }
        if let Some(cap) = self.settings.max_turns
            && discussion.turns().len() >= cap as usize
        {
            info!(discussion = %discussion.id(), cap, "Turn cap reached");
            self.stop(discussion).await;
            return Ok(None);
        }
        self.advance(discussion).await.map(Some)
    }

    /// Step until the discussion is no longer active
    pub async fn run_to_completion(
        &self,
        discussion: &mut Discussion,
    ) -> Result<Vec<Turn>, OrchestratorError> {
        let mut produced = Vec::new();
        while let Some(turn) = self.step(discussion).await? {
            produced.push(turn);
        }
        Ok(produced)
    }

    /// External stop: the discussion completes where it stands
    pub async fn stop(&self, discussion: &mut Discussion) {
        if !discussion.is_active() {
            return;
        }
        discussion.finish();
        info!(discussion = %discussion.id(), turns = discussion.turns().len(), "Discussion stopped");
        self.persist(discussion, None).await;
        self.finished(discussion);
    }

    /// Abandon the discussion
    pub async fn abort(&self, discussion: &mut Discussion, reason: &str) {
        if !discussion.is_active() {
            return;
        }
        discussion.fail(reason);
        warn!(discussion = %discussion.id(), reason, "Discussion aborted");
        self.persist(discussion, None).await;
        self.finished(discussion);
    }

    // ==================== Helpers ====================

    fn finished(&self, discussion: &Discussion) {
        info!(
            discussion = %discussion.id(),
            status = %discussion.status(),
            turns = discussion.turns().len(),
            "Discussion finished"
        );
        self.logger.log(ConversationEvent::new(
            "discussion_finished",
            json!({
                "discussion_id": discussion.id(),
                "status": discussion.status(),
                "turns": discussion.turns().len(),
                "failure": discussion.failure(),
            }),
        ));
        self.progress.on_discussion_end(discussion);
    }

    fn log_fallbacks(
        &self,
        discussion: &Discussion,
        speaker: &str,
        failures: &[ModelFailure],
    ) {
        for failure in failures {
            self.logger.log(ConversationEvent::new(
                "model_fallback",
                json!({
                    "discussion_id": discussion.id(),
                    "speaker": speaker,
                    "model": failure.model,
                    "category": failure.error.category(),
                    "error": failure.error.to_string(),
                }),
            ));
        }
    }

    /// Write-through to the store. Failures are logged and the discussion
    /// carries on in memory.
    async fn persist(&self, discussion: &Discussion, turn: Option<&Turn>) {
        if let Some(turn) = turn
            && let Err(e) = self.store.append_turn(discussion.id(), turn).await
        {
            warn!(discussion = %discussion.id(), error = %e, "Failed to append turn");
        }
        if let Err(e) = self.store.save(discussion).await {
            warn!(discussion = %discussion.id(), error = %e, "Failed to save discussion");
        }
    }
}
