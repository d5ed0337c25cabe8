//! Discussion phases and the state machine that walks through them

use crate::core::error::DomainError;
use crate::persona::entities::PersonaId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stage of a discussion
///
/// `Opening → Debate → Synthesis → Done`, strictly forward. `Done` is
/// terminal and never appears on a recorded turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Each member states an initial position
    Opening,
    /// Members engage with and challenge each other
    Debate,
    /// Members converge on recommendations
    Synthesis,
    /// No further turns
    Done,
}

impl Phase {
    /// Phases that accept turns, in order
    pub const SPEAKING: [Phase; 3] = [Phase::Opening, Phase::Debate, Phase::Synthesis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Debate => "debate",
            Phase::Synthesis => "synthesis",
            Phase::Done => "done",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Opening => "Opening",
            Phase::Debate => "Debate",
            Phase::Synthesis => "Synthesis",
            Phase::Done => "Done",
        }
    }

    /// The phase that follows this one
    pub fn next(&self) -> Phase {
        match self {
            Phase::Opening => Phase::Debate,
            Phase::Debate => Phase::Synthesis,
            Phase::Synthesis | Phase::Done => Phase::Done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done)
    }

    /// Phases where every eligible member speaks once before anyone repeats
    pub fn requires_rotation(&self) -> bool {
        matches!(self, Phase::Opening | Phase::Synthesis)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turn targets and speaker eligibility per phase
///
/// A `debate` target of `None` runs the discussion unbounded: it stays in
/// Debate until an explicit external stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub opening: u32,
    pub debate: Option<u32>,
    pub synthesis: u32,
    /// Optional per-phase speaker restriction; phases absent here are
    /// open to every participant.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub eligible: BTreeMap<Phase, Vec<PersonaId>>,
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self {
            opening: 2,
            debate: Some(4),
            synthesis: 2,
            eligible: BTreeMap::new(),
        }
    }
}

impl PhasePlan {
    pub fn new(opening: u32, debate: u32, synthesis: u32) -> Self {
        Self {
            opening,
            debate: Some(debate),
            synthesis,
            eligible: BTreeMap::new(),
        }
    }

    /// Debate without a turn target; only an external stop ends it
    pub fn unbounded(mut self) -> Self {
        self.debate = None;
        self
    }

    /// Restrict who may speak in `phase`
    pub fn with_eligible(mut self, phase: Phase, speakers: Vec<PersonaId>) -> Self {
        self.eligible.insert(phase, speakers);
        self
    }

    /// Target turn count for `phase`, `None` when unbounded or terminal
    pub fn target(&self, phase: Phase) -> Option<u32> {
        match phase {
            Phase::Opening => Some(self.opening),
            Phase::Debate => self.debate,
            Phase::Synthesis => Some(self.synthesis),
            Phase::Done => None,
        }
    }

    /// Declared total turn budget, `None` in unbounded mode
    pub fn total_turns(&self) -> Option<u32> {
        self.debate.map(|d| {
            self.opening
                .saturating_add(d)
                .saturating_add(self.synthesis)
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.debate.is_none()
    }

    pub fn eligible_for(&self, phase: Phase) -> Option<&[PersonaId]> {
        self.eligible.get(&phase).map(|v| v.as_slice())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.opening == 0 || self.synthesis == 0 || self.debate == Some(0) {
            return Err(DomainError::InvalidPhasePlan(
                "every phase target must be at least 1".to_string(),
            ));
        }
        if self.eligible.contains_key(&Phase::Done) {
            return Err(DomainError::InvalidPhasePlan(
                "the done phase has no speakers".to_string(),
            ));
        }
        Ok(())
    }
}

/// Finite-state machine over [`Phase`]s
///
/// Counts turns in the active phase and moves to the next phase the moment
/// the count reaches the phase target. The counter restarts at zero on
/// every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseController {
    plan: PhasePlan,
    current: Phase,
    turns_in_phase: u32,
}

impl PhaseController {
    pub fn new(plan: PhasePlan) -> Self {
        Self {
            plan,
            current: Phase::Opening,
            turns_in_phase: 0,
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.current
    }

    pub fn turns_in_phase(&self) -> u32 {
        self.turns_in_phase
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    pub fn is_done(&self) -> bool {
        self.current.is_terminal()
    }

    /// Count one turn in the active phase.
    ///
    /// Returns `true` when this turn completed the phase and the controller
    /// moved on.
    pub fn record_turn(&mut self) -> Result<bool, DomainError> {
        if self.is_done() {
            return Err(DomainError::PhasesExhausted);
        }

        self.turns_in_phase += 1;
        match self.plan.target(self.current) {
            Some(target) if self.turns_in_phase >= target => {
                self.current = self.current.next();
                self.turns_in_phase = 0;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// External stop: jump straight to `Done`
    pub fn finish(&mut self) {
        self.current = Phase::Done;
        self.turns_in_phase = 0;
    }
}
