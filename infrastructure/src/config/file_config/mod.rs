//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application settings
//! once validated.

mod api;
mod discussion;
mod paths;
mod personas;
mod resilience;

pub use api::FileApiConfig;
pub use discussion::FileDiscussionConfig;
pub use paths::{FileLoggingConfig, FileStorageConfig};
pub use personas::FilePersonaConfig;
pub use resilience::FileResilienceConfig;

use boardroom_application::{CallerSettings, DiscussionSettings, RateLimitConfig};
use boardroom_domain::{DomainError, ErrorCategory, Phase, PersonaId, PersonaRegistry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("resilience.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("resilience.requests_per_window cannot be 0")]
    InvalidQuota,

    #[error("resilience.window_ms cannot be 0")]
    InvalidWindow,

    #[error("discussion.{0} cannot be 0")]
    ZeroPhaseTarget(&'static str),

    #[error("persona '{persona}': model name cannot be empty")]
    EmptyModelName { persona: String },

    #[error(transparent)]
    Personas(#[from] DomainError),

    #[error("discussion.eligible.{phase}: unknown persona '{persona}'")]
    UnknownEligiblePersona { phase: Phase, persona: String },

    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),
}

impl ConfigValidationError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Config
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Upstream endpoint
    pub api: FileApiConfig,
    /// Timeouts, retries and rate limits
    pub resilience: FileResilienceConfig,
    /// Phase targets and context window
    pub discussion: FileDiscussionConfig,
    /// Board members; the stock board when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<FilePersonaConfig>,
    pub storage: FileStorageConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    ///
    /// The API key is not checked here; see [`FileApiConfig::api_key`].
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.resilience.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.resilience.requests_per_window == 0 {
            issues.push(ConfigValidationError::InvalidQuota);
        }
        if self.resilience.window_ms == 0 {
            issues.push(ConfigValidationError::InvalidWindow);
        }

        issues.extend(
            self.discussion
                .zero_targets()
                .into_iter()
                .map(ConfigValidationError::ZeroPhaseTarget),
        );

        let mut blank_models = false;
        for persona in self.personas.iter().filter(|p| p.has_empty_model_name()) {
            blank_models = true;
            issues.push(ConfigValidationError::EmptyModelName {
                persona: persona.id.clone(),
            });
        }

        // Registry rules (duplicate ids, empty chains) only once the model
        // names themselves are sound
        if !blank_models {
            match self.persona_registry() {
                Ok(registry) => issues.extend(self.unknown_eligible(&registry)),
                Err(e) => issues.push(e),
            }
        }

        issues
    }

    /// Per-phase speaker ids the registry does not know
    fn unknown_eligible(&self, registry: &PersonaRegistry) -> Vec<ConfigValidationError> {
        self.discussion
            .eligible
            .iter()
            .flat_map(|(phase, ids)| {
                ids.iter()
                    .filter(|id| registry.get(&PersonaId::new(id.as_str())).is_none())
                    .map(|id| ConfigValidationError::UnknownEligiblePersona {
                        phase: *phase,
                        persona: id.clone(),
                    })
            })
            .collect()
    }

    /// First validation issue, if any
    pub fn ensure_valid(&self) -> Result<(), ConfigValidationError> {
        match self.validate().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    /// Build the persona catalog
    pub fn persona_registry(&self) -> Result<PersonaRegistry, ConfigValidationError> {
        if self.personas.is_empty() {
            return Ok(PersonaRegistry::default_board());
        }
        let personas = self.personas.iter().map(|p| p.to_persona()).collect();
        Ok(PersonaRegistry::new(personas)?)
    }

    pub fn caller_settings(&self) -> CallerSettings {
        self.resilience
            .caller_settings(self.discussion.max_tokens, self.discussion.temperature)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        self.resilience.rate_limit()
    }

    pub fn discussion_settings(&self) -> DiscussionSettings {
        self.discussion.to_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_domain::Model;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[api]
base_url = "http://localhost:8080/v1"
api_key_env = "LOCAL_KEY"

[resilience]
timeout_seconds = 10
max_retries = 1

[discussion]
debate_turns = 6
temperature = 0.3

[[personas]]
id = "cfo"
name = "Dana Whitfield"
role = "CFO"
expertise = ["finance"]
models = ["openai/gpt-4", "openai/gpt-3.5-turbo"]

[[personas]]
id = "coo"
name = "Sam Ortiz"
role = "COO"
models = ["google/gemini-pro"]

[storage]
directory = "/var/lib/boardroom"

[logging]
file = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_empty());
        assert_eq!(config.api.base_url, "http://localhost:8080/v1");
        assert_eq!(config.caller_settings().timeout_ms, 10_000);
        assert_eq!(config.caller_settings().retry.max_retries, 1);
        assert!((config.caller_settings().temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.discussion_settings().debate_turns, 6);
        assert_eq!(
            config.storage.resolved_directory(),
            PathBuf::from("/var/lib/boardroom")
        );
        assert!(!config.logging.file);

        let registry = config.persona_registry().unwrap();
        assert_eq!(registry.len(), 2);
        let cfo = registry.require(&PersonaId::new("cfo")).unwrap();
        assert_eq!(cfo.primary_model(), Some(&Model::Gpt4));
    }

    #[test]
    fn test_default_config_is_valid_and_uses_stock_board() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.persona_registry().unwrap().len(), 3);
        assert_eq!(config.discussion_settings(), DiscussionSettings::default());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[resilience]
timeout_seconds = 0
requests_per_window = 0

[discussion]
synthesis_turns = 0

[[personas]]
id = "cfo"
models = ["openai/gpt-4", ""]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(issues.contains(&ConfigValidationError::InvalidTimeout));
        assert!(issues.contains(&ConfigValidationError::InvalidQuota));
        assert!(issues.contains(&ConfigValidationError::ZeroPhaseTarget(
            "synthesis_turns"
        )));
        assert!(issues.contains(&ConfigValidationError::EmptyModelName {
            persona: "cfo".to_string()
        }));
        assert!(issues.iter().all(|i| i.category() == ErrorCategory::Config));
    }

    #[test]
    fn test_registry_rules_surface_as_config_errors() {
        let toml_str = r#"
[[personas]]
id = "cfo"
models = ["openai/gpt-4"]

[[personas]]
id = "cfo"
models = ["openai/gpt-4"]

[[personas]]
id = "coo"
models = []
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let err = config.ensure_valid().unwrap_err();
        assert!(matches!(err, ConfigValidationError::Personas(_)));
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_unknown_eligible_persona_rejected() {
        let toml_str = r#"
[discussion.eligible]
opening = ["ceo", "cto"]
synthesis = ["cfo"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(
            issues,
            vec![ConfigValidationError::UnknownEligiblePersona {
                phase: Phase::Synthesis,
                persona: "cfo".to_string(),
            }]
        );
        assert_eq!(issues[0].category(), ErrorCategory::Config);
        assert!(config.ensure_valid().is_err());
    }
}
