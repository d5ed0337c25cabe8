//! Domain error types

use crate::discussion::phase::Phase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every error in the workspace.
///
/// Callers branch on the category instead of matching individual variants:
/// configuration problems are fatal at startup, validation problems are
/// reported back to whoever asked, call failures feed the retry and
/// fallback machinery, and state errors indicate misuse of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad persona/model setup, fatal at startup
    Config,
    /// Bad topic or persona set; the discussion is not created
    Validation,
    /// Timeout, rate limit or server-side failure; retried per policy
    TransientCall,
    /// Auth or malformed request; not retried, triggers fallback
    PermanentCall,
    /// Every fallback candidate failed; the discussion stays resumable
    AllModelsExhausted,
    /// Advancing a finished discussion or selecting from an empty pool
    State,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Validation => "validation",
            ErrorCategory::TransientCall => "transient_call",
            ErrorCategory::PermanentCall => "permanent_call",
            ErrorCategory::AllModelsExhausted => "all_models_exhausted",
            ErrorCategory::State => "state",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid persona configuration: {0}")]
    InvalidPersonaConfig(String),

    #[error("Invalid phase plan: {0}")]
    InvalidPhasePlan(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid persona set: {0}")]
    InvalidPersonaSet(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("No eligible speaker in {0} phase")]
    NoEligibleSpeaker(Phase),

    #[error("Discussion {0} is already done")]
    DiscussionAlreadyDone(String),

    #[error("No turns are accepted once all phases are done")]
    PhasesExhausted,

    #[error("Transcript mismatch: {0}")]
    TranscriptMismatch(String),
}

impl DomainError {
    /// Taxonomy bucket for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::InvalidPersonaConfig(_) | DomainError::InvalidPhasePlan(_) => {
                ErrorCategory::Config
            }
            DomainError::InvalidTopic(_)
            | DomainError::InvalidPersonaSet(_)
            | DomainError::UnknownPersona(_) => ErrorCategory::Validation,
            DomainError::NoEligibleSpeaker(_)
            | DomainError::DiscussionAlreadyDone(_)
            | DomainError::PhasesExhausted
            | DomainError::TranscriptMismatch(_) => ErrorCategory::State,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::NoEligibleSpeaker(Phase::Debate);
        assert_eq!(error.to_string(), "No eligible speaker in debate phase");

        let error = DomainError::DiscussionAlreadyDone("d-1".to_string());
        assert_eq!(error.to_string(), "Discussion d-1 is already done");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            DomainError::InvalidPersonaConfig("x".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            DomainError::InvalidTopic("x".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            DomainError::InvalidPersonaSet("x".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            DomainError::NoEligibleSpeaker(Phase::Opening).category(),
            ErrorCategory::State
        );
        assert_eq!(
            DomainError::DiscussionAlreadyDone("x".into()).category(),
            ErrorCategory::State
        );
    }
}
