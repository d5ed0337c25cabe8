//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full transcript grouped by phase
    Transcript,
    /// Markdown document
    Markdown,
    /// Discussion record and participation summary as JSON
    Json,
    /// Participation statistics only
    Summary,
}

/// CLI arguments for ai-boardroom
#[derive(Parser, Debug)]
#[command(name = "ai-boardroom")]
#[command(author, version, about = "AI Boardroom - a board of AI executives discusses your topic")]
#[command(long_about = r#"
AI Boardroom seats a board of AI personas around a topic and lets them
talk it through.

The discussion has three phases:
1. Opening: every member states an initial position
2. Debate: the most relevant member takes the floor, turn by turn
3. Synthesis: members converge on recommendations

Each persona calls its models through a fallback chain, so a failing
model hands the turn to the next one instead of stopping the board.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./boardroom.toml    Project-level config
3. ~/.config/ai-boardroom/config.toml   Global config

Example:
  ai-boardroom "Should we hire more developers?"
  ai-boardroom -p ceo -p cto --max-turns 6 "Do we migrate to Rust?"
  ai-boardroom --resume 7f3c2a10-... -o markdown
"#)]
pub struct Cli {
    /// The topic to put before the board
    pub topic: Option<String>,

    /// Board members to seat, by id or role (can be specified multiple times)
    #[arg(short, long, value_name = "PERSONA")]
    pub persona: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "transcript")]
    pub output: OutputFormat,

    /// Continue a stored discussion
    #[arg(long, value_name = "ID", conflicts_with = "topic")]
    pub resume: Option<String>,

    /// List stored discussions and exit
    #[arg(long)]
    pub list: bool,

    /// List models available upstream and exit
    #[arg(long)]
    pub models: bool,

    /// Keep debating until stopped (Ctrl+C or --max-turns)
    #[arg(long)]
    pub unbounded: bool,

    /// Stop after this many turns in total
    #[arg(long, value_name = "N")]
    pub max_turns: Option<u32>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
