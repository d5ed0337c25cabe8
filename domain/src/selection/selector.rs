//! Next-speaker selection

use super::relevance::{TOPIC_WEIGHT, relevance_score};
use crate::core::error::DomainError;
use crate::discussion::entities::Discussion;
use crate::persona::entities::PersonaId;
use crate::persona::registry::PersonaRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Score deducted in Debate from members who spoke within the cool-down
/// window. Worth three topic matches: it rotates the floor among members
/// of similar relevance, and a clearly more relevant member still wins.
pub const COOLDOWN_PENALTY: i64 = 3 * TOPIC_WEIGHT as i64;

/// Tuning for [`SpeakerSelector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// How many recent turns feed the relevance score
    pub recent_window: usize,
    /// In Debate, members who spoke in this many latest turns lose
    /// [`COOLDOWN_PENALTY`]. Capped at `pool size - 1`.
    pub repeat_cooldown: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            recent_window: 3,
            repeat_cooldown: 2,
        }
    }
}

/// A candidate with the values it was ranked by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSpeaker {
    pub id: PersonaId,
    pub score: i64,
    pub relevance: u32,
    pub last_spoken: Option<u64>,
    pub position: usize,
}

/// Chooses who speaks next.
///
/// Ranking is by score (relevance, minus the soft Debate cool-down
/// penalty), then least-recently-spoken, then registry order. In Opening and
/// Synthesis only members with the fewest turns in the current phase are
/// candidates, so everyone speaks once before anyone speaks twice.
#[derive(Debug, Clone, Default)]
pub struct SpeakerSelector {
    config: SelectorConfig,
}

impl SpeakerSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Pick the next speaker
    pub fn select(
        &self,
        discussion: &Discussion,
        registry: &PersonaRegistry,
    ) -> Result<PersonaId, DomainError> {
        let ranked = self.rank(discussion, registry)?;
        match ranked.into_iter().next() {
            Some(best) => Ok(best.id),
            None => Err(DomainError::NoEligibleSpeaker(discussion.phase())),
        }
    }

    /// Every candidate for the next turn, best first
    pub fn rank(
        &self,
        discussion: &Discussion,
        registry: &PersonaRegistry,
    ) -> Result<Vec<RankedSpeaker>, DomainError> {
        let phase = discussion.phase();
        if !discussion.is_active() || phase.is_terminal() {
            return Err(DomainError::DiscussionAlreadyDone(
                discussion.id().to_string(),
            ));
        }

        let restriction = discussion.plan().eligible_for(phase);
        let mut pool: Vec<&PersonaId> = discussion
            .participants()
            .iter()
            .filter(|id| restriction.is_none_or(|allowed| allowed.contains(*id)))
            .filter(|id| registry.get(id).is_some())
            .collect();

        if pool.is_empty() {
            return Err(DomainError::NoEligibleSpeaker(phase));
        }

        if phase.requires_rotation() {
            let fewest = pool
                .iter()
                .map(|id| discussion.turns_in(phase, id))
                .min()
                .unwrap_or(0);
            pool.retain(|id| discussion.turns_in(phase, id) == fewest);
        }

        let cooling: HashSet<&PersonaId> = if phase.requires_rotation() {
            HashSet::new()
        } else {
            let window = self.config.repeat_cooldown.min(pool.len() - 1);
            discussion
                .recent_turns(window)
                .iter()
                .map(|t| &t.speaker)
                .collect()
        };

        let recent: Vec<&str> = discussion
            .recent_turns(self.config.recent_window)
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        let topic = discussion.topic().content();

        let mut ranked: Vec<RankedSpeaker> = pool
            .into_iter()
            .filter_map(|id| {
                let persona = registry.get(id)?;
                let relevance = relevance_score(topic, &recent, &persona.expertise);
                let penalty = if cooling.contains(id) {
                    COOLDOWN_PENALTY
                } else {
                    0
                };
                Some(RankedSpeaker {
                    id: id.clone(),
                    score: i64::from(relevance) - penalty,
                    relevance,
                    last_spoken: discussion.last_spoken(id),
                    position: registry.position(id).unwrap_or(usize::MAX),
                })
            })
            .collect();

        // `None` (never spoken) sorts before any sequence number.
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.last_spoken.cmp(&b.last_spoken))
                .then(a.position.cmp(&b.position))
        });

        Ok(ranked)
    }
}
