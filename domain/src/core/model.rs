//! Model value object representing an upstream completion model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upstream completion models (Value Object)
///
/// Identifiers follow the `provider/name` convention used by OpenRouter.
/// Anything not in the well-known list is carried as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Model {
    // OpenAI models
    Gpt4,
    Gpt4Turbo,
    Gpt35Turbo,
    // Anthropic models
    Claude3Opus,
    Claude3Sonnet,
    Claude3Haiku,
    // Google models
    GeminiPro,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4 => "openai/gpt-4",
            Model::Gpt4Turbo => "openai/gpt-4-turbo",
            Model::Gpt35Turbo => "openai/gpt-3.5-turbo",
            Model::Claude3Opus => "anthropic/claude-3-opus",
            Model::Claude3Sonnet => "anthropic/claude-3-sonnet",
            Model::Claude3Haiku => "anthropic/claude-3-haiku",
            Model::GeminiPro => "google/gemini-pro",
            Model::Custom(s) => s,
        }
    }

    /// Provider prefix of the identifier (`openai` for `openai/gpt-4`).
    ///
    /// Identifiers without a prefix belong to the `default` tier.
    pub fn provider(&self) -> &str {
        match self.as_str().split_once('/') {
            Some((provider, _)) if !provider.is_empty() => provider,
            _ => "default",
        }
    }

    /// Check if this is an OpenAI model
    pub fn is_openai(&self) -> bool {
        self.provider() == "openai"
    }

    /// Check if this is an Anthropic model
    pub fn is_anthropic(&self) -> bool {
        self.provider() == "anthropic"
    }

    /// Check if this is a Google model
    pub fn is_google(&self) -> bool {
        self.provider() == "google"
    }
}

impl Default for Model {
    /// Returns the default model (GPT-3.5 Turbo, the common fallback)
    fn default() -> Self {
        Model::Gpt35Turbo
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "openai/gpt-4" => Model::Gpt4,
            "openai/gpt-4-turbo" => Model::Gpt4Turbo,
            "openai/gpt-3.5-turbo" => Model::Gpt35Turbo,
            "anthropic/claude-3-opus" => Model::Claude3Opus,
            "anthropic/claude-3-sonnet" => Model::Claude3Sonnet,
            "anthropic/claude-3-haiku" => Model::Claude3Haiku,
            "google/gemini-pro" => Model::GeminiPro,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
