//! Output formatter trait

use boardroom_domain::{Discussion, PersonaRegistry, Turn};

/// Trait for rendering a discussion transcript
pub trait TranscriptFormatter {
    /// Render the whole discussion
    fn format(&self, discussion: &Discussion, registry: &PersonaRegistry) -> String;
}

/// `Name - Role` for a turn's speaker, or the raw id if the persona is
/// no longer configured
pub fn speaker_label(turn: &Turn, registry: &PersonaRegistry) -> String {
    registry
        .get(&turn.speaker)
        .map(|p| format!("{} - {}", p.name, p.role))
        .unwrap_or_else(|| turn.speaker.to_string())
}

/// Model line for a turn, noting when a fallback answered
pub fn model_note(turn: &Turn) -> String {
    if turn.used_fallback() {
        format!("{}, fallback from {}", turn.model, turn.primary_model)
    } else {
        turn.model.to_string()
    }
}

/// Consecutive runs of turns sharing a phase
pub fn phase_groups(turns: &[Turn]) -> Vec<&[Turn]> {
    turns.chunk_by(|a, b| a.phase == b.phase).collect()
}
