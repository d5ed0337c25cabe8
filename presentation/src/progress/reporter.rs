//! Progress reporting for board discussions

use boardroom_application::DiscussionProgress;
use boardroom_domain::{Discussion, DiscussionStatus, Model, Persona, Phase, Turn};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner while each member is speaking
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_heading(phase: Phase, target: Option<u32>) -> String {
        match target {
            Some(n) => format!("{} ({} turns)", phase.display_name(), n),
            None => format!("{} (open-ended)", phase.display_name()),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionProgress for ProgressReporter {
    fn on_discussion_start(&self, discussion: &Discussion) {
        eprintln!(
            "{} {} ({})",
            "Board convened:".cyan().bold(),
            discussion.topic(),
            discussion.id().to_string().dimmed()
        );
    }

    fn on_phase_start(&self, phase: Phase, target: Option<u32>) {
        eprintln!("{} {}", "->".cyan(), Self::phase_heading(phase, target).bold());
    }

    fn on_turn_start(&self, persona: &Persona, phase: Phase) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(persona.label());
        pb.set_message(format!("is speaking ({})", phase.display_name()));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_turn_complete(&self, persona: &Persona, turn: &Turn) {
        let line = if turn.used_fallback() {
            format!(
                "{} [{}] {} via {}",
                "v".green(),
                turn.sequence,
                persona.label(),
                turn.model.to_string().yellow()
            )
        } else {
            format!("{} [{}] {}", "v".green(), turn.sequence, persona.label())
        };
        match self.take_spinner() {
            Some(pb) => pb.finish_with_message(line),
            None => eprintln!("{}", line),
        }
    }

    fn on_model_fallback(&self, persona: &Persona, failed: &Model, reason: &str) {
        let note = format!("{} {} failed for {}: {}", "!".yellow(), failed, persona.name, reason);
        match self.spinner.lock().ok().and_then(|slot| slot.clone()) {
            Some(pb) => pb.println(note),
            None => eprintln!("{}", note),
        }
    }

    fn on_discussion_end(&self, discussion: &Discussion) {
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        let status = match discussion.status() {
            DiscussionStatus::Completed => "completed".green(),
            DiscussionStatus::Failed => "failed".red(),
            DiscussionStatus::Active => "paused".yellow(),
        };
        eprintln!(
            "{} {} after {} turns\n",
            "Board adjourned:".cyan().bold(),
            status,
            discussion.turns().len()
        );
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DiscussionProgress for SimpleProgress {
    fn on_discussion_start(&self, discussion: &Discussion) {
        eprintln!("{} {}", "Topic:".bold(), discussion.topic());
    }

    fn on_phase_start(&self, phase: Phase, target: Option<u32>) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::phase_heading(phase, target).bold()
        );
    }

    fn on_turn_start(&self, persona: &Persona, _phase: Phase) {
        eprintln!("  .. {}", persona.label());
    }

    fn on_turn_complete(&self, _persona: &Persona, turn: &Turn) {
        eprintln!(
            "  {} turn {} by {} ({}, {} ms)",
            "v".green(),
            turn.sequence,
            turn.speaker,
            turn.model,
            turn.latency_ms
        );
    }

    fn on_model_fallback(&self, persona: &Persona, failed: &Model, reason: &str) {
        eprintln!("  {} {} failed for {}: {}", "x".red(), failed, persona.id, reason);
    }

    fn on_discussion_end(&self, discussion: &Discussion) {
        eprintln!("{} {}\n", "Finished:".bold(), discussion.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_heading() {
        assert_eq!(
            ProgressReporter::phase_heading(Phase::Opening, Some(3)),
            "Opening (3 turns)"
        );
        assert_eq!(
            ProgressReporter::phase_heading(Phase::Debate, None),
            "Debate (open-ended)"
        );
    }
}
