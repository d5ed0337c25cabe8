//! Upstream API configuration from TOML (`[api]` section)

use serde::{Deserialize, Serialize};

/// OpenRouter-compatible endpoint settings.
///
/// # Example
///
/// ```toml
/// [api]
/// base_url = "https://openrouter.ai/api/v1"
/// api_key_env = "OPENROUTER_API_KEY"
/// referer = "https://ai-boardroom.local"
/// title = "AI Boardroom"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL; `/chat/completions` and `/models` are appended
    pub base_url: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            referer: "https://ai-boardroom.local".to_string(),
            title: "AI Boardroom".to_string(),
        }
    }
}

impl FileApiConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// Blank values count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_defaults() {
        let config = FileApiConfig::default();
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.title, "AI Boardroom");
    }

    #[test]
    fn test_api_key_missing_variable() {
        let config = FileApiConfig {
            api_key_env: "BOARDROOM_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
    }
}
