//! Prompt templates for board turns

use crate::core::string::truncate;
use crate::discussion::entities::{Discussion, Turn};
use crate::discussion::phase::Phase;
use crate::persona::entities::Persona;
use crate::persona::registry::PersonaRegistry;
use crate::session::entities::Message;
use serde::{Deserialize, Serialize};

/// How much of the transcript a speaker gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWindow {
    /// Most recent turns included, oldest first
    pub max_turns: usize,
    /// Per-turn character cap; longer turns are cut with `...`
    pub max_chars_per_turn: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_chars_per_turn: 1_200,
        }
    }
}

/// Templates for generating the messages of a single turn
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instructions specific to the active phase
    pub fn phase_instructions(phase: Phase) -> &'static str {
        match phase {
            Phase::Opening => {
                "This is the OPENING phase. Present your initial position and key concerns. \
                 Be concise and establish your perspective."
            }
            Phase::Debate => {
                "This is the DEBATE phase. Engage with others' points, challenge assumptions, \
                 and defend your position with specific examples and reasoning."
            }
            Phase::Synthesis => {
                "This is the SYNTHESIS phase. Work toward consensus, summarize key insights, \
                 and propose concrete next steps or recommendations."
            }
            Phase::Done => "The discussion has concluded.",
        }
    }

    /// System prompt putting the model in character
    pub fn persona_system(persona: &Persona, topic: &str, phase: Phase) -> String {
        format!(
            r#"You are {name}, the {role} in a boardroom discussion.

Your personality: {style}
Your expertise: {expertise}

You are participating in a structured boardroom debate about: "{topic}"

{instructions}

Guidelines:
- Stay in character as {name}
- Provide thoughtful insights from your role's perspective
- Keep responses concise (2-3 paragraphs max)
- Be professional but show your personality
- Build on or respectfully challenge previous points when relevant
- Focus on actionable insights and business implications"#,
            name = persona.name,
            role = persona.role,
            style = persona.style,
            expertise = persona.expertise_summary(),
            topic = topic,
            instructions = Self::phase_instructions(phase),
        )
    }

    /// Closing instruction when nobody has spoken yet
    pub fn initial_prompt(topic: &str) -> String {
        format!("Please provide your initial thoughts on this topic: {}", topic)
    }

    /// Closing instruction once the transcript is non-empty
    pub fn continue_prompt() -> &'static str {
        "Please provide your response to the ongoing discussion."
    }

    /// Render one transcript entry as `[Name - Role] (phase): content`
    pub fn render_turn(turn: &Turn, registry: &PersonaRegistry, max_chars: usize) -> String {
        let (name, role) = match registry.get(&turn.speaker) {
            Some(p) => (p.name.as_str(), p.role.as_str()),
            None => (turn.speaker.as_str(), turn.speaker.as_str()),
        };
        format!(
            "[{} - {}] ({}): {}",
            name,
            role,
            turn.phase,
            truncate(&turn.content, max_chars)
        )
    }

    /// Full message list for `speaker`'s next turn.
    ///
    /// The speaker's own earlier turns go in as `assistant` messages,
    /// everyone else's as `user` messages.
    pub fn build_messages(
        speaker: &Persona,
        discussion: &Discussion,
        registry: &PersonaRegistry,
        window: &ContextWindow,
    ) -> Vec<Message> {
        let topic = discussion.topic().content();
        let recent = discussion.recent_turns(window.max_turns);

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(Self::persona_system(
            speaker,
            topic,
            discussion.phase(),
        )));

        for turn in recent {
            let text = Self::render_turn(turn, registry, window.max_chars_per_turn);
            if turn.speaker == speaker.id {
                messages.push(Message::assistant(text));
            } else {
                messages.push(Message::user(text));
            }
        }

        if discussion.turns().is_empty() {
            messages.push(Message::user(Self::initial_prompt(topic)));
        } else {
            messages.push(Message::user(Self::continue_prompt()));
        }

        messages
    }
}
