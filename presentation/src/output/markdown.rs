//! Markdown export

use crate::output::formatter::{TranscriptFormatter, model_note, phase_groups, speaker_label};
use crate::output::summary::ParticipationSummary;
use boardroom_domain::{Discussion, PersonaRegistry};

/// Renders a discussion as a standalone Markdown document
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn format(discussion: &Discussion, registry: &PersonaRegistry) -> String {
        let summary = ParticipationSummary::of(discussion, registry);
        let mut out = String::new();

        out.push_str(&format!("# Board Discussion: {}\n\n", discussion.topic()));
        out.push_str(&format!("- **Discussion:** `{}`\n", discussion.id()));
        out.push_str(&format!(
            "- **Started:** {}\n",
            discussion.created_at().format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&format!(
            "- **Status:** {} ({} turns)\n",
            discussion.status(),
            discussion.turns().len()
        ));
        if let Some(reason) = discussion.failure() {
            out.push_str(&format!("- **Failure:** {}\n", reason));
        }

        out.push_str("\n## Participation\n\n");
        out.push_str("| Member | Role | Turns | Words |\n");
        out.push_str("|--------|------|------:|------:|\n");
        for p in &summary.participants {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&p.name),
                escape_cell(&p.role),
                p.turns,
                p.words
            ));
        }

        for group in phase_groups(discussion.turns()) {
            out.push_str(&format!("\n## {}\n", group[0].phase.display_name()));
            for turn in group {
                out.push_str(&format!(
                    "\n### {}. {}\n\n_{}_\n\n{}\n",
                    turn.sequence,
                    speaker_label(turn, registry),
                    model_note(turn),
                    turn.content.trim()
                ));
            }
        }

        out
    }
}

/// Keep table cells on one row
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl TranscriptFormatter for MarkdownFormatter {
    fn format(&self, discussion: &Discussion, registry: &PersonaRegistry) -> String {
        Self::format(discussion, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_fixtures::board_discussion;

    #[test]
    fn test_markdown_document() {
        let (discussion, registry) = board_discussion();
        let md = MarkdownFormatter::format(&discussion, &registry);

        assert!(md.starts_with("# Board Discussion: Should we hire more developers?"));
        assert!(md.contains("| Alexandra Stone | CEO | 2 |"));
        assert!(md.contains("## Opening"));
        assert!(md.contains("## Debate"));
        assert!(md.contains("### 1. Alexandra Stone - CEO"));
        assert!(md.contains("_openai/gpt-3.5-turbo, fallback from openai/gpt-4_"));
        assert!(md.find("## Opening").unwrap() < md.find("## Debate").unwrap());
    }

    #[test]
    fn test_cells_escaped() {
        assert_eq!(escape_cell("R&D | Ops\nLead"), "R&D \\| Ops Lead");
    }
}
