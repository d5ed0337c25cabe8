//! Persona entities

use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier of a persona (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A configured board member (Entity)
///
/// Immutable once loaded into a [`PersonaRegistry`](super::registry::PersonaRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Registry key, e.g. `ceo`
    pub id: PersonaId,
    /// Display name, e.g. `Alexandra Stone`
    pub name: String,
    /// Role title, e.g. `CEO`
    pub role: String,
    /// Lowercased expertise tags used for relevance scoring
    pub expertise: BTreeSet<String>,
    /// Fallback chain, most preferred first
    pub models: Vec<Model>,
    /// Voice and personality directives injected into the system prompt
    pub style: String,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: PersonaId::new(id),
            name: name.into(),
            role: role.into(),
            expertise: BTreeSet::new(),
            models: Vec::new(),
            style: String::new(),
        }
    }

    pub fn with_expertise<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expertise.extend(
            tags.into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    pub fn with_models(mut self, models: impl IntoIterator<Item = Model>) -> Self {
        self.models.extend(models);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Primary model of the fallback chain
    pub fn primary_model(&self) -> Option<&Model> {
        self.models.first()
    }

    /// Expertise tags joined for display in prompts
    pub fn expertise_summary(&self) -> String {
        self.expertise.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// `Name (Role)` label used in transcripts
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}
