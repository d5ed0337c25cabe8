//! Presentation layer for ai-boardroom
//!
//! This crate contains CLI definitions, transcript formatters,
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::{ConsoleFormatter, SummaryFormatter};
pub use output::formatter::TranscriptFormatter;
pub use output::formatter_for;
pub use output::json::JsonFormatter;
pub use output::markdown::MarkdownFormatter;
pub use output::summary::{ParticipantStats, ParticipationSummary};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
