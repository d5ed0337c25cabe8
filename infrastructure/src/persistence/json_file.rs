//! JSON file discussion store
//!
//! Layout inside the store directory, per discussion:
//!
//! - `<id>.json`: latest full snapshot, replaced atomically
//! - `<id>.turns.jsonl`: every committed turn, one JSON object per line
//!
//! A crash between appending a turn and rewriting the snapshot loses
//! nothing: `load` replays logged turns the snapshot has not seen yet.

use super::replay_pending;
use async_trait::async_trait;
use boardroom_application::{DiscussionStore, DiscussionSummary, StoreError};
use boardroom_domain::{Discussion, DiscussionId, Turn};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const SNAPSHOT_EXT: &str = "json";
const TURNS_SUFFIX: &str = ".turns.jsonl";

/// File-backed store, one snapshot and one turn log per discussion
pub struct JsonFileDiscussionStore {
    directory: PathBuf,
}

impl JsonFileDiscussionStore {
    /// Create the store, creating `directory` if needed
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).await?;
        debug!(directory = %directory.display(), "Opened discussion store");
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Ids become file names, so only plain identifiers are accepted
    fn checked(id: &DiscussionId) -> Result<&str, StoreError> {
        let raw = id.as_str();
        let plain = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if plain {
            Ok(raw)
        } else {
            Err(StoreError::NotFound(raw.to_string()))
        }
    }

    fn snapshot_path(&self, id: &DiscussionId) -> Result<PathBuf, StoreError> {
        let name = Self::checked(id)?;
        Ok(self.directory.join(format!("{}.{}", name, SNAPSHOT_EXT)))
    }

    fn turns_path(&self, id: &DiscussionId) -> Result<PathBuf, StoreError> {
        let name = Self::checked(id)?;
        Ok(self.directory.join(format!("{}{}", name, TURNS_SUFFIX)))
    }

    async fn read_snapshot(&self, id: &DiscussionId) -> Result<Discussion, StoreError> {
        let path = self.snapshot_path(id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    async fn read_turns(&self, id: &DiscussionId) -> Result<Vec<Turn>, StoreError> {
        let path = self.turns_path(id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        parse_turn_log(&text, &path)
    }
}

/// Parse a turn log.
///
/// A malformed final line is a write cut short by a crash and is dropped;
/// a malformed line anywhere else means the log is corrupt.
fn parse_turn_log(text: &str, path: &Path) -> Result<Vec<Turn>, StoreError> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut turns = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        match serde_json::from_str::<Turn>(line) {
            Ok(turn) => turns.push(turn),
            Err(e) if i + 1 == lines.len() => {
                warn!(path = %path.display(), error = %e, "Dropping truncated final turn record");
            }
            Err(e) => {
                return Err(StoreError::Corrupt(format!(
                    "{} line {}: {}",
                    path.display(),
                    i + 1,
                    e
                )));
            }
        }
    }
    Ok(turns)
}

#[async_trait]
impl DiscussionStore for JsonFileDiscussionStore {
    async fn save(&self, discussion: &Discussion) -> Result<(), StoreError> {
        let path = self.snapshot_path(discussion.id())?;
        let json = serde_json::to_string_pretty(discussion)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Write then rename so a reader never sees a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        debug!(id = %discussion.id(), turns = discussion.turns().len(), "Saved snapshot");
        Ok(())
    }

    async fn load(&self, id: &DiscussionId) -> Result<Discussion, StoreError> {
        let snapshot = self.read_snapshot(id).await?;
        let logged = self.read_turns(id).await?;
        replay_pending(snapshot, logged)
    }

    async fn append_turn(&self, id: &DiscussionId, turn: &Turn) -> Result<(), StoreError> {
        let path = self.turns_path(id)?;
        let mut line =
            serde_json::to_string(turn).map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DiscussionSummary>, StoreError> {
        let mut entries = fs::read_dir(&self.directory).await?;
        let mut summaries = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(&DiscussionId::new(stem)).await {
                Ok(discussion) => summaries.push(DiscussionSummary::of(&discussion)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable discussion"),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn delete(&self, id: &DiscussionId) -> Result<(), StoreError> {
        let snapshot = self.snapshot_path(id)?;
        match fs::remove_file(&snapshot).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        match fs::remove_file(self.turns_path(id)?).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
