//! Console output formatter for board discussions

use crate::output::formatter::{TranscriptFormatter, model_note, phase_groups, speaker_label};
use crate::output::summary::ParticipationSummary;
use boardroom_application::DiscussionSummary;
use boardroom_domain::{Discussion, DiscussionStatus, Model, Phase, PersonaRegistry};
use colored::Colorize;

/// Formats discussions for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Full transcript grouped by phase
    pub fn format(discussion: &Discussion, registry: &PersonaRegistry) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Board Discussion"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Topic:".cyan().bold(),
            discussion.topic()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Board:".cyan().bold(),
            Self::board(discussion, registry)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status(discussion)
        ));

        if discussion.turns().is_empty() {
            output.push_str(&format!("\n{}\n", "No turns yet.".dimmed()));
        }

        for group in phase_groups(discussion.turns()) {
            output.push_str(&Self::section_header(Self::phase_title(group[0].phase)));
            for turn in group {
                output.push_str(&format!(
                    "\n{} {}\n{}\n",
                    format!("── [{}] {} ──", turn.sequence, speaker_label(turn, registry))
                        .yellow()
                        .bold(),
                    format!("({})", model_note(turn)).dimmed(),
                    turn.content
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Participation summary as a short report
    pub fn format_summary(discussion: &Discussion, registry: &PersonaRegistry) -> String {
        let summary = ParticipationSummary::of(discussion, registry);
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Board Participation ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n", "Topic:".bold(), summary.topic));
        output.push_str(&format!(
            "{} {} turns, {}\n\n",
            "Total:".bold(),
            summary.total_turns,
            summary.status
        ));

        output.push_str(&format!("{}\n", "By member:".cyan().bold()));
        for p in &summary.participants {
            let label = if p.role.is_empty() {
                p.name.clone()
            } else {
                format!("{} ({})", p.name, p.role)
            };
            output.push_str(&format!("  * {}: {} turns, {} words\n", label, p.turns, p.words));
        }

        output.push_str(&format!("\n{}\n", "By phase:".cyan().bold()));
        for phase in Phase::SPEAKING {
            if let Some(count) = summary.by_phase.get(&phase) {
                output.push_str(&format!("  * {}: {} turns\n", phase.display_name(), count));
            }
        }

        output.push_str(&format!("\n{}\n", "Models:".cyan().bold()));
        for (model, count) in &summary.models_used {
            output.push_str(&format!("  * {}: {} turns\n", model, count));
        }
        if summary.fallback_turns > 0 {
            output.push_str(&format!(
                "  {}\n",
                format!("{} turns answered by a fallback model", summary.fallback_turns).yellow()
            ));
        }

        output.push_str(&format!(
            "\n{} {} words, {:.1} per turn, {} tokens\n",
            "Volume:".bold(),
            summary.total_words,
            summary.avg_words_per_turn,
            summary.total_tokens
        ));
        output
    }

    /// Stored discussions, one per line
    pub fn format_listing(summaries: &[DiscussionSummary]) -> String {
        if summaries.is_empty() {
            return format!("{}\n", "No stored discussions.".dimmed());
        }

        let mut output = String::new();
        for s in summaries {
            output.push_str(&format!(
                "{}  {}  {:<9}  {:>3} turns  {}\n",
                s.id.to_string().yellow(),
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.status.as_str(),
                s.turn_count,
                Self::first_line(&s.topic)
            ));
        }
        output
    }

    /// Model ids, one per line
    pub fn format_models(models: &[Model]) -> String {
        let mut output = format!("{}\n", "Available models:".cyan().bold());
        for model in models {
            output.push_str(&format!("  {}\n", model));
        }
        output
    }

    fn board(discussion: &Discussion, registry: &PersonaRegistry) -> String {
        discussion
            .participants()
            .iter()
            .map(|id| {
                registry
                    .get(id)
                    .map(|p| p.label())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn status(discussion: &Discussion) -> String {
        let turns = discussion.turns().len();
        match (discussion.status(), discussion.failure()) {
            (DiscussionStatus::Failed, Some(reason)) => {
                format!("{} after {} turns: {}", "failed".red(), turns, reason)
            }
            (DiscussionStatus::Active, _) => format!(
                "{} in {} ({} turns so far)",
                "active".green(),
                discussion.phase().display_name(),
                turns
            ),
            (status, _) => format!("{} ({} turns)", status, turns),
        }
    }

    fn phase_title(phase: Phase) -> &'static str {
        match phase {
            Phase::Opening => "Opening Statements",
            Phase::Debate => "Debate",
            Phase::Synthesis => "Synthesis",
            Phase::Done => "Done",
        }
    }

    fn first_line(topic: &str) -> String {
        topic.lines().next().unwrap_or_default().to_string()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl TranscriptFormatter for ConsoleFormatter {
    fn format(&self, discussion: &Discussion, registry: &PersonaRegistry) -> String {
        Self::format(discussion, registry)
    }
}

/// Participation summary in place of the transcript
pub struct SummaryFormatter;

impl TranscriptFormatter for SummaryFormatter {
    fn format(&self, discussion: &Discussion, registry: &PersonaRegistry) -> String {
        ConsoleFormatter::format_summary(discussion, registry)
    }
}
