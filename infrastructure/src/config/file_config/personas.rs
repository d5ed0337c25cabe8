//! Board members from TOML (`[[personas]]` array)

use boardroom_domain::{Model, Persona};
use serde::{Deserialize, Serialize};

/// One board member.
///
/// When no `[[personas]]` entries are configured the stock executive board
/// is used.
///
/// # Example
///
/// ```toml
/// [[personas]]
/// id = "cfo"
/// name = "Dana Whitfield"
/// role = "CFO"
/// expertise = ["finance", "budget", "risk"]
/// models = ["openai/gpt-4", "openai/gpt-3.5-turbo"]
/// style = "Numbers first. Skeptical of spend without a payback period."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonaConfig {
    pub id: String,
    pub name: String,
    pub role: String,
    pub expertise: Vec<String>,
    /// Fallback chain, most preferred first
    pub models: Vec<String>,
    pub style: String,
}

impl FilePersonaConfig {
    /// Whether any entry of the fallback chain is blank
    pub fn has_empty_model_name(&self) -> bool {
        self.models.iter().any(|m| m.trim().is_empty())
    }

    pub fn to_persona(&self) -> Persona {
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        let role = if self.role.trim().is_empty() {
            self.id.to_uppercase()
        } else {
            self.role.clone()
        };

        Persona::new(self.id.trim(), name, role)
            .with_expertise(&self.expertise)
            .with_models(self.models.iter().map(|m| Model::from(m.trim())))
            .with_style(self.style.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_persona() {
        let config: FilePersonaConfig = toml::from_str(
            r#"
id = "cfo"
name = "Dana Whitfield"
role = "CFO"
expertise = ["Finance", "budget"]
models = ["openai/gpt-4", "mistral/mixtral"]
"#,
        )
        .unwrap();

        let persona = config.to_persona();
        assert_eq!(persona.id.as_str(), "cfo");
        assert_eq!(persona.label(), "Dana Whitfield (CFO)");
        assert!(persona.expertise.contains("finance"));
        assert_eq!(
            persona.models,
            vec![Model::Gpt4, Model::Custom("mistral/mixtral".to_string())]
        );
    }

    #[test]
    fn test_missing_name_and_role_fall_back_to_id() {
        let config = FilePersonaConfig {
            id: "coo".to_string(),
            models: vec!["openai/gpt-4".to_string()],
            ..Default::default()
        };
        let persona = config.to_persona();
        assert_eq!(persona.name, "coo");
        assert_eq!(persona.role, "COO");
    }

    #[test]
    fn test_empty_model_name_detected() {
        let config = FilePersonaConfig {
            id: "coo".to_string(),
            models: vec!["openai/gpt-4".to_string(), "  ".to_string()],
            ..Default::default()
        };
        assert!(config.has_empty_model_name());
    }
}
