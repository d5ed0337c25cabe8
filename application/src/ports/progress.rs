//! Progress notification port
//!
//! Defines the interface for reporting progress while a discussion runs.

use boardroom_domain::{Discussion, Model, Persona, Phase, Turn};

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, plain log lines, etc.)
pub trait DiscussionProgress: Send + Sync {
    /// Called once when a discussion starts or resumes
    fn on_discussion_start(&self, discussion: &Discussion);

    /// Called when a phase begins accepting turns
    fn on_phase_start(&self, phase: Phase, target: Option<u32>);

    /// Called when a persona is about to speak
    fn on_turn_start(&self, persona: &Persona, phase: Phase);

    /// Called when a turn is committed
    fn on_turn_complete(&self, persona: &Persona, turn: &Turn);

    /// Called when the router moves past a failed model
    fn on_model_fallback(&self, _persona: &Persona, _failed: &Model, _reason: &str) {}

    /// Called when the discussion reaches a terminal status
    fn on_discussion_end(&self, _discussion: &Discussion) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgress for NoProgress {
    fn on_discussion_start(&self, _discussion: &Discussion) {}
    fn on_phase_start(&self, _phase: Phase, _target: Option<u32>) {}
    fn on_turn_start(&self, _persona: &Persona, _phase: Phase) {}
    fn on_turn_complete(&self, _persona: &Persona, _turn: &Turn) {}
}
