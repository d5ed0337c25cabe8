//! Discussion shape from TOML (`[discussion]` section)

use boardroom_application::{CallerSettings, DiscussionSettings};
use boardroom_domain::{ContextWindow, Phase, PersonaId, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Phase targets, context window and generation parameters.
///
/// # Example
///
/// ```toml
/// [discussion]
/// opening_turns = 2
/// debate_turns = 4
/// synthesis_turns = 2
/// context_turns = 10
/// max_chars_per_turn = 1200
/// relevance_window = 3
/// repeat_cooldown = 2
/// max_tokens = 500
/// temperature = 0.7
///
/// [discussion.eligible]
/// synthesis = ["ceo"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub opening_turns: u32,
    pub debate_turns: u32,
    pub synthesis_turns: u32,
    /// Keep debating until stopped
    pub unbounded: bool,
    /// Turn cap for unbounded runs
    pub max_turns: Option<u32>,
    /// Most recent turns shown to each speaker
    pub context_turns: usize,
    pub max_chars_per_turn: usize,
    /// Recent turns that feed relevance scoring
    pub relevance_window: usize,
    /// Latest Debate turns whose speakers take the cool-down penalty
    pub repeat_cooldown: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Phase name to persona ids allowed to speak in it
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub eligible: BTreeMap<Phase, Vec<String>>,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let settings = DiscussionSettings::default();
        let caller = CallerSettings::default();
        Self {
            opening_turns: settings.opening_turns,
            debate_turns: settings.debate_turns,
            synthesis_turns: settings.synthesis_turns,
            unbounded: settings.unbounded,
            max_turns: settings.max_turns,
            context_turns: settings.context.max_turns,
            max_chars_per_turn: settings.context.max_chars_per_turn,
            relevance_window: settings.selector.recent_window,
            repeat_cooldown: settings.selector.repeat_cooldown,
            max_tokens: caller.max_tokens,
            temperature: caller.temperature,
            eligible: BTreeMap::new(),
        }
    }
}

impl FileDiscussionConfig {
    /// Names of phase targets set to zero
    pub fn zero_targets(&self) -> Vec<&'static str> {
        let mut zero = Vec::new();
        if self.opening_turns == 0 {
            zero.push("opening_turns");
        }
        if self.debate_turns == 0 && !self.unbounded {
            zero.push("debate_turns");
        }
        if self.synthesis_turns == 0 {
            zero.push("synthesis_turns");
        }
        zero
    }

    pub fn to_settings(&self) -> DiscussionSettings {
        DiscussionSettings {
            opening_turns: self.opening_turns,
            debate_turns: self.debate_turns,
            synthesis_turns: self.synthesis_turns,
            unbounded: self.unbounded,
            max_turns: self.max_turns,
            selector: SelectorConfig {
                recent_window: self.relevance_window,
                repeat_cooldown: self.repeat_cooldown,
            },
            context: ContextWindow {
                max_turns: self.context_turns,
                max_chars_per_turn: self.max_chars_per_turn,
            },
            eligible: self
                .eligible
                .iter()
                .map(|(phase, ids)| (*phase, ids.iter().map(PersonaId::new).collect()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_into_settings() {
        let settings = FileDiscussionConfig::default().to_settings();
        assert_eq!(settings, DiscussionSettings::default());
    }

    #[test]
    fn test_eligible_table() {
        let config: FileDiscussionConfig = toml::from_str(
            r#"
debate_turns = 6

[eligible]
synthesis = ["ceo", "cto"]
"#,
        )
        .unwrap();
        let settings = config.to_settings();
        assert_eq!(settings.debate_turns, 6);
        assert_eq!(
            settings.eligible.get(&Phase::Synthesis),
            Some(&vec![PersonaId::new("ceo"), PersonaId::new("cto")])
        );
    }

    #[test]
    fn test_zero_targets() {
        let config = FileDiscussionConfig {
            opening_turns: 0,
            debate_turns: 0,
            ..Default::default()
        };
        assert_eq!(config.zero_targets(), vec!["opening_turns", "debate_turns"]);

        let unbounded = FileDiscussionConfig {
            debate_turns: 0,
            unbounded: true,
            ..Default::default()
        };
        assert!(unbounded.zero_targets().is_empty());
    }
}
