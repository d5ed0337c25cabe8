//! On-disk locations from TOML (`[storage]` and `[logging]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where discussions are persisted.
///
/// ```toml
/// [storage]
/// directory = "~/.local/share/ai-boardroom/discussions"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Defaults to the platform data directory
    pub directory: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("ai-boardroom").join("discussions"))
                .unwrap_or_else(|| PathBuf::from(".boardroom").join("discussions"))
        })
    }
}

/// Diagnostic and transcript logs.
///
/// ```toml
/// [logging]
/// file = true
/// directory = "logs"
/// conversation_log = "logs/conversation.jsonl"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write diagnostics to a daily log file as well as stderr
    pub file: bool,
    pub directory: PathBuf,
    /// JSONL transcript of discussion events; off when unset
    pub conversation_log: Option<PathBuf>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            directory: PathBuf::from("logs"),
            conversation_log: None,
        }
    }
}
