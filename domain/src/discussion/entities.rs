//! Discussion domain entities

use super::phase::{Phase, PhaseController, PhasePlan};
use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::core::topic::Topic;
use crate::persona::entities::PersonaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Unique identifier of a discussion (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscussionId(String);

impl DiscussionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(format!("discussion-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiscussionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DiscussionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle of a discussion. Anything but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    Active,
    Completed,
    Failed,
}

impl DiscussionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionStatus::Active => "active",
            DiscussionStatus::Completed => "completed",
            DiscussionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token accounting reported by the upstream API
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// Cost estimate in USD when the upstream reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

/// One immutable transcript entry (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based, strictly increasing, gapless
    pub sequence: u64,
    pub speaker: PersonaId,
    /// Phase the speaker was in; never [`Phase::Done`]
    pub phase: Phase,
    pub content: String,
    /// Model that actually produced the content
    pub model: Model,
    /// Head of the speaker's fallback chain at the time
    pub primary_model: Model,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl Turn {
    /// Whether a fallback model answered instead of the primary one
    pub fn used_fallback(&self) -> bool {
        self.model != self.primary_model
    }
}

/// Everything about a turn that the caller decides; the discussion fills in
/// sequence, phase and timestamp when recording it.
#[derive(Debug, Clone)]
pub struct TurnDraft {
    pub speaker: PersonaId,
    pub content: String,
    pub model: Model,
    pub primary_model: Model,
    pub latency: Duration,
    pub usage: Option<TokenUsage>,
}

/// A multi-party board discussion (Aggregate root)
///
/// The transcript is append-only: turns are only ever added through
/// [`Discussion::record_turn`], which keeps the sequence gapless and the
/// phase controller in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    id: DiscussionId,
    topic: Topic,
    participants: Vec<PersonaId>,
    phases: PhaseController,
    turns: Vec<Turn>,
    status: DiscussionStatus,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl Discussion {
    /// Create an active discussion in the Opening phase.
    ///
    /// Fails with [`DomainError::InvalidPersonaSet`] when `participants` is
    /// empty, repeats an id, or leaves a restricted phase with nobody
    /// allowed to speak, and with [`DomainError::InvalidPhasePlan`]
    /// when the plan has a zero target.
    pub fn new(
        id: DiscussionId,
        topic: Topic,
        participants: Vec<PersonaId>,
        plan: PhasePlan,
    ) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::InvalidPersonaSet(
                "at least one persona is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for id in &participants {
            if !seen.insert(id) {
                return Err(DomainError::InvalidPersonaSet(format!(
                    "persona '{}' listed more than once",
                    id
                )));
            }
        }
        plan.validate()?;
        for phase in Phase::SPEAKING {
            if let Some(allowed) = plan.eligible_for(phase)
                && !participants.iter().any(|id| allowed.contains(id))
            {
                return Err(DomainError::InvalidPersonaSet(format!(
                    "no participant may speak in the {} phase",
                    phase
                )));
            }
        }

        Ok(Self {
            id,
            topic,
            participants,
            phases: PhaseController::new(plan),
            turns: Vec::new(),
            status: DiscussionStatus::Active,
            created_at: Utc::now(),
            failure: None,
        })
    }

    pub fn id(&self) -> &DiscussionId {
        &self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn participants(&self) -> &[PersonaId] {
        &self.participants
    }

    pub fn phase(&self) -> Phase {
        self.phases.current_phase()
    }

    pub fn turns_in_phase(&self) -> u32 {
        self.phases.turns_in_phase()
    }

    pub fn plan(&self) -> &PhasePlan {
        self.phases.plan()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn status(&self) -> DiscussionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == DiscussionStatus::Active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Sequence number the next recorded turn will get
    pub fn next_sequence(&self) -> u64 {
        self.turns.len() as u64 + 1
    }

    /// Turns spoken by `speaker` in `phase`
    pub fn turns_in(&self, phase: Phase, speaker: &PersonaId) -> usize {
        self.turns
            .iter()
            .filter(|t| t.phase == phase && &t.speaker == speaker)
            .count()
    }

    /// Sequence of the most recent turn by `speaker`, if any
    pub fn last_spoken(&self, speaker: &PersonaId) -> Option<u64> {
        self.turns
            .iter()
            .rev()
            .find(|t| &t.speaker == speaker)
            .map(|t| t.sequence)
    }

    /// The most recent `n` turns, oldest first
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Append a turn and advance the phase machine.
    ///
    /// This is the only way the transcript grows. A turn that completes the
    /// last phase also completes the discussion.
    pub fn record_turn(&mut self, draft: TurnDraft) -> Result<&Turn, DomainError> {
        if !self.is_active() || self.phases.is_done() {
            return Err(DomainError::DiscussionAlreadyDone(self.id.to_string()));
        }
        if !self.participants.contains(&draft.speaker) {
            return Err(DomainError::UnknownPersona(draft.speaker.to_string()));
        }

        let turn = Turn {
            sequence: self.next_sequence(),
            speaker: draft.speaker,
            phase: self.phases.current_phase(),
            content: draft.content,
            model: draft.model,
            primary_model: draft.primary_model,
            timestamp: Utc::now(),
            latency_ms: draft.latency.as_millis() as u64,
            usage: draft.usage,
        };

        self.phases.record_turn()?;
        self.turns.push(turn);
        if self.phases.is_done() {
            self.status = DiscussionStatus::Completed;
        }

        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Re-apply a turn read back from an append-only log.
    ///
    /// The turn must carry exactly the next sequence number and the current
    /// phase; anything else means the log and the snapshot disagree.
    pub fn replay_turn(&mut self, turn: Turn) -> Result<(), DomainError> {
        if turn.sequence != self.next_sequence() || turn.phase != self.phase() {
            return Err(DomainError::TranscriptMismatch(format!(
                "turn {} ({}) does not continue discussion {} at turn {} ({})",
                turn.sequence,
                turn.phase,
                self.id,
                self.next_sequence(),
                self.phase()
            )));
        }
        if !self.is_active() {
            return Err(DomainError::DiscussionAlreadyDone(self.id.to_string()));
        }

        self.phases.record_turn()?;
        self.turns.push(turn);
        if self.phases.is_done() {
            self.status = DiscussionStatus::Completed;
        }
        Ok(())
    }

    /// Explicit external stop: the discussion completes where it stands
    pub fn finish(&mut self) {
        if self.is_active() {
            self.phases.finish();
            self.status = DiscussionStatus::Completed;
        }
    }

    /// Abandon the discussion
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_active() {
            self.status = DiscussionStatus::Failed;
            self.failure = Some(reason.into());
        }
    }
}
