//! JSON export

use crate::output::formatter::TranscriptFormatter;
use crate::output::summary::ParticipationSummary;
use boardroom_domain::{Discussion, PersonaRegistry};
use serde::Serialize;

#[derive(Serialize)]
struct Export<'a> {
    discussion: &'a Discussion,
    summary: ParticipationSummary,
}

/// Full discussion record plus its participation summary
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(discussion: &Discussion, registry: &PersonaRegistry) -> String {
        let export = Export {
            discussion,
            summary: ParticipationSummary::of(discussion, registry),
        };
        serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
    }
}

impl TranscriptFormatter for JsonFormatter {
    fn format(&self, discussion: &Discussion, registry: &PersonaRegistry) -> String {
        Self::format(discussion, registry)
    }
}
