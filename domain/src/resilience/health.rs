//! Advisory model health and fallback candidates

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Last-known health of a model.
///
/// Advisory only: it reorders a fallback chain but never removes a model
/// from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelHealth {
    #[default]
    Healthy,
    /// Last call failed transiently
    Degraded,
    /// Last call failed permanently
    Unavailable,
}

impl ModelHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelHealth::Healthy => "healthy",
            ModelHealth::Degraded => "degraded",
            ModelHealth::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for ModelHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a persona's fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub model: Model,
    /// Position in the configured chain, 0 = primary
    pub rank: usize,
    pub health: ModelHealth,
}

/// Order a fallback chain for an attempt: healthier models first,
/// configured rank within equal health. Every model stays in the list.
pub fn order_candidates<F>(models: &[Model], health_of: F) -> Vec<ModelCandidate>
where
    F: Fn(&Model) -> ModelHealth,
{
    let mut candidates: Vec<ModelCandidate> = models
        .iter()
        .enumerate()
        .map(|(rank, model)| ModelCandidate {
            model: model.clone(),
            rank,
            health: health_of(model),
        })
        .collect();
    candidates.sort_by_key(|c| (c.health, c.rank));
    candidates
}
