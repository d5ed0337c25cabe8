//! Discussion shape settings.

use boardroom_domain::{ContextWindow, Phase, PersonaId, PhasePlan, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a discussion is structured: phase targets, who gets the floor, and
/// how much transcript each speaker sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscussionSettings {
    pub opening_turns: u32,
    pub debate_turns: u32,
    pub synthesis_turns: u32,
    /// Stay in Debate until an explicit stop
    pub unbounded: bool,
    /// Hard cap on turns in unbounded mode, enforced by the driver loop
    pub max_turns: Option<u32>,
    pub selector: SelectorConfig,
    pub context: ContextWindow,
    /// Optional per-phase speaker restriction
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub eligible: BTreeMap<Phase, Vec<PersonaId>>,
}

impl Default for DiscussionSettings {
    fn default() -> Self {
        let plan = PhasePlan::default();
        Self {
            opening_turns: plan.opening,
            debate_turns: plan.debate.unwrap_or(4),
            synthesis_turns: plan.synthesis,
            unbounded: false,
            max_turns: None,
            selector: SelectorConfig::default(),
            context: ContextWindow::default(),
            eligible: BTreeMap::new(),
        }
    }
}

impl DiscussionSettings {
    /// Phase plan described by these settings
    pub fn phase_plan(&self) -> PhasePlan {
        let mut plan =
            PhasePlan::new(self.opening_turns, self.debate_turns, self.synthesis_turns);
        for (phase, speakers) in &self.eligible {
            plan = plan.with_eligible(*phase, speakers.clone());
        }
        if self.unbounded { plan.unbounded() } else { plan }
    }
}
