//! Output formatting for board discussions

pub mod console;
pub mod formatter;
pub mod json;
pub mod markdown;
pub mod summary;

use crate::cli::commands::OutputFormat;
use console::{ConsoleFormatter, SummaryFormatter};
use formatter::TranscriptFormatter;
use json::JsonFormatter;
use markdown::MarkdownFormatter;

/// Pick the formatter for an `--output` choice
pub fn formatter_for(format: OutputFormat) -> Box<dyn TranscriptFormatter> {
    match format {
        OutputFormat::Transcript => Box::new(ConsoleFormatter),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Summary => Box::new(SummaryFormatter),
    }
}
