//! Domain layer for ai-boardroom
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Board discussion
//!
//! A [`Discussion`] is a phase-structured conversation between personas:
//!
//! - **Opening**: every member states a position once before anyone repeats
//! - **Debate**: the most relevant member speaks, with a cool-down on repeats
//! - **Synthesis**: every member converges on recommendations once more
//!
//! The [`PhaseController`] walks the phases; the [`SpeakerSelector`] picks
//! who holds the floor.
//!
//! ## Personas
//!
//! A [`Persona`] carries expertise tags used for relevance scoring and an
//! ordered model fallback chain. The [`PersonaRegistry`] is validated once
//! at startup and immutable afterwards.
//!
//! ## Resilience policy
//!
//! [`RetryPolicy`] and [`ModelHealth`] are pure policy objects consumed by
//! the model invocation client in the application layer.

pub mod core;
pub mod discussion;
pub mod persona;
pub mod prompt;
pub mod resilience;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use core::{
    error::{DomainError, ErrorCategory},
    model::Model,
    topic::{MAX_TOPIC_CHARS, Topic},
};
pub use discussion::{
    entities::{
        Discussion, DiscussionId, DiscussionStatus, TokenUsage, Turn, TurnDraft,
    },
    phase::{Phase, PhaseController, PhasePlan},
};
pub use persona::{
    entities::{Persona, PersonaId},
    registry::PersonaRegistry,
};
pub use prompt::{ContextWindow, PromptTemplate};
pub use resilience::{
    health::{ModelCandidate, ModelHealth, order_candidates},
    retry_policy::RetryPolicy,
};
pub use selection::{
    relevance::{keywords, relevance_score},
    selector::{RankedSpeaker, SelectorConfig, SpeakerSelector},
};
pub use session::entities::{Message, Role};
