//! Immutable persona catalog

use super::entities::{Persona, PersonaId};
use crate::core::error::DomainError;
use crate::core::model::Model;
use std::collections::HashMap;

/// Read-only catalog of personas, built once at startup.
///
/// Construction validates every entry; after that the registry never
/// changes, so lookups cannot fail for ids that were accepted.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
    index: HashMap<PersonaId, usize>,
}

impl PersonaRegistry {
    /// Build a registry, rejecting duplicate ids, blank ids and empty
    /// fallback chains with [`DomainError::InvalidPersonaConfig`].
    pub fn new(personas: Vec<Persona>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(personas.len());

        for (i, persona) in personas.iter().enumerate() {
            if persona.id.as_str().trim().is_empty() {
                return Err(DomainError::InvalidPersonaConfig(format!(
                    "persona #{} has an empty id",
                    i + 1
                )));
            }
            if persona.models.is_empty() {
                return Err(DomainError::InvalidPersonaConfig(format!(
                    "persona '{}' has an empty fallback model list",
                    persona.id
                )));
            }
            if persona.models.iter().any(|m| m.as_str().trim().is_empty()) {
                return Err(DomainError::InvalidPersonaConfig(format!(
                    "persona '{}' lists an empty model name",
                    persona.id
                )));
            }
            if index.insert(persona.id.clone(), i).is_some() {
                return Err(DomainError::InvalidPersonaConfig(format!(
                    "duplicate persona id '{}'",
                    persona.id
                )));
            }
        }

        Ok(Self { personas, index })
    }

    /// The stock three-member executive board
    pub fn default_board() -> Self {
        let personas = vec![
            Persona::new("ceo", "Alexandra Stone", "CEO")
                .with_style(
                    "Strategic visionary with strong leadership skills. Focuses on big-picture \
                     thinking, company vision, and stakeholder value. Decisive but collaborative \
                     in decision-making.",
                )
                .with_expertise([
                    "business strategy",
                    "leadership",
                    "market analysis",
                    "financial oversight",
                    "stakeholder management",
                    "hiring",
                ])
                .with_models([Model::Gpt4, Model::Gpt4Turbo, Model::Gpt35Turbo]),
            Persona::new("cto", "Marcus Chen", "CTO")
                .with_style(
                    "Technical innovator with a pragmatic approach. Balances cutting-edge \
                     technology with practical implementation. Detail-oriented and risk-aware.",
                )
                .with_expertise([
                    "software architecture",
                    "technology trends",
                    "system scalability",
                    "cybersecurity",
                    "technical team management",
                    "developers",
                ])
                .with_models([Model::Claude3Sonnet, Model::Claude3Haiku, Model::Gpt35Turbo]),
            Persona::new("cmo", "Sofia Rodriguez", "CMO")
                .with_style(
                    "Creative strategist with deep market insights. Data-driven yet intuitive \
                     about customer behavior. Enthusiastic about brand building and customer \
                     engagement.",
                )
                .with_expertise([
                    "marketing strategy",
                    "brand management",
                    "customer acquisition",
                    "digital marketing",
                    "market research",
                ])
                .with_models([Model::GeminiPro, Model::Gpt35Turbo, Model::Claude3Haiku]),
        ];

        match Self::new(personas) {
            Ok(registry) => registry,
            Err(e) => unreachable!("default board is valid: {}", e),
        }
    }

    pub fn get(&self, id: &PersonaId) -> Option<&Persona> {
        self.index.get(id).map(|&i| &self.personas[i])
    }

    /// Look up a persona, failing with [`DomainError::UnknownPersona`]
    pub fn require(&self, id: &PersonaId) -> Result<&Persona, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::UnknownPersona(id.to_string()))
    }

    /// Case-insensitive lookup by role title
    pub fn find_by_role(&self, role: &str) -> Option<&Persona> {
        self.personas
            .iter()
            .find(|p| p.role.eq_ignore_ascii_case(role))
    }

    /// Resolve an id or a role title
    pub fn resolve(&self, key: &str) -> Option<&Persona> {
        self.get(&PersonaId::new(key))
            .or_else(|| self.find_by_role(key))
    }

    /// All personas in insertion order
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    pub fn ids(&self) -> Vec<PersonaId> {
        self.personas.iter().map(|p| p.id.clone()).collect()
    }

    /// Insertion position, used as the final selection tie-break
    pub fn position(&self, id: &PersonaId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(id: &str) -> Persona {
        Persona::new(id, id.to_uppercase(), id.to_uppercase()).with_models([Model::Gpt4])
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let registry =
            PersonaRegistry::new(vec![persona("b"), persona("a"), persona("c")]).unwrap();
        let ids: Vec<_> = registry.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(registry.position(&"a".into()), Some(1));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = PersonaRegistry::new(vec![persona("a"), persona("a")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPersonaConfig(_)));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_fallback_list_rejected() {
        let bare = Persona::new("x", "X", "X");
        let err = PersonaRegistry::new(vec![bare]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPersonaConfig(_)));
    }

    #[test]
    fn test_default_board() {
        let registry = PersonaRegistry::default_board();
        assert_eq!(registry.len(), 3);
        let cto = registry.find_by_role("cto").unwrap();
        assert_eq!(cto.name, "Marcus Chen");
        assert_eq!(
            cto.models,
            vec![Model::Claude3Sonnet, Model::Claude3Haiku, Model::Gpt35Turbo]
        );
    }

    #[test]
    fn test_resolve_by_id_or_role() {
        let registry = PersonaRegistry::default_board();
        assert_eq!(registry.resolve("cmo").unwrap().role, "CMO");
        assert_eq!(registry.resolve("CEO").unwrap().id.as_str(), "ceo");
        assert!(registry.resolve("cfo").is_none());
        assert!(matches!(
            registry.require(&"cfo".into()),
            Err(DomainError::UnknownPersona(_))
        ));
    }
}
