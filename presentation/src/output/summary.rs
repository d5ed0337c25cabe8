//! Participation statistics for a discussion

use boardroom_domain::{Discussion, DiscussionStatus, Phase, PersonaId, PersonaRegistry};
use serde::Serialize;
use std::collections::BTreeMap;

/// How much one board member contributed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantStats {
    pub id: PersonaId,
    pub name: String,
    pub role: String,
    pub turns: usize,
    pub by_phase: BTreeMap<Phase, usize>,
    pub words: usize,
    /// Turns answered by a fallback model
    pub fallback_turns: usize,
}

/// Who spoke how often, in which phase, through which models
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipationSummary {
    pub topic: String,
    pub status: DiscussionStatus,
    pub total_turns: usize,
    /// In seating order
    pub participants: Vec<ParticipantStats>,
    pub by_phase: BTreeMap<Phase, usize>,
    /// Model id to turns it produced
    pub models_used: BTreeMap<String, usize>,
    pub fallback_turns: usize,
    pub total_words: usize,
    pub avg_words_per_turn: f64,
    pub total_tokens: u64,
}

impl ParticipationSummary {
    pub fn of(discussion: &Discussion, registry: &PersonaRegistry) -> Self {
        let mut participants: Vec<ParticipantStats> = discussion
            .participants()
            .iter()
            .map(|id| {
                let (name, role) = registry
                    .get(id)
                    .map(|p| (p.name.clone(), p.role.clone()))
                    .unwrap_or_else(|| (id.to_string(), String::new()));
                ParticipantStats {
                    id: id.clone(),
                    name,
                    role,
                    turns: 0,
                    by_phase: BTreeMap::new(),
                    words: 0,
                    fallback_turns: 0,
                }
            })
            .collect();

        let mut by_phase = BTreeMap::new();
        let mut models_used = BTreeMap::new();
        let mut fallback_turns = 0;
        let mut total_words = 0;
        let mut total_tokens = 0u64;

        for turn in discussion.turns() {
            let words = turn.content.split_whitespace().count();
            total_words += words;
            *by_phase.entry(turn.phase).or_insert(0) += 1;
            *models_used.entry(turn.model.to_string()).or_insert(0) += 1;
            if turn.used_fallback() {
                fallback_turns += 1;
            }
            if let Some(usage) = &turn.usage {
                total_tokens += u64::from(usage.total_tokens);
            }

            if let Some(stats) = participants.iter_mut().find(|s| s.id == turn.speaker) {
                stats.turns += 1;
                stats.words += words;
                *stats.by_phase.entry(turn.phase).or_insert(0) += 1;
                if turn.used_fallback() {
                    stats.fallback_turns += 1;
                }
            }
        }

        let total_turns = discussion.turns().len();
        let avg_words_per_turn = if total_turns == 0 {
            0.0
        } else {
            // One decimal place
            (total_words as f64 / total_turns as f64 * 10.0).round() / 10.0
        };

        Self {
            topic: discussion.topic().content().to_string(),
            status: discussion.status(),
            total_turns,
            participants,
            by_phase,
            models_used,
            fallback_turns,
            total_words,
            avg_words_per_turn,
            total_tokens,
        }
    }
}
