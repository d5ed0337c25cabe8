//! JSONL transcript log for discussion events.
//!
//! Every [`ConversationEvent`] becomes one line: the event payload's fields
//! plus `event`, a per-logger `seq` counter and an RFC 3339 `timestamp`.
//! The file is opened in append mode, so one log can span many runs.

use boardroom_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

/// Appends discussion events to a JSONL file.
///
/// Write failures are reported through `tracing` and otherwise ignored;
/// the discussion keeps running.
pub struct JsonlConversationLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Flatten an event into one JSON object
fn record(event: ConversationEvent, seq: u64, timestamp: String) -> Value {
    let mut map = match event.payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("event".to_string(), Value::from(event.event_type));
    map.insert("seq".to_string(), Value::from(seq));
    map.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.seq += 1;
        let line = record(event, sink.seq, timestamp).to_string();

        // Flushed per line: the transcript must survive a crash mid-discussion
        let written = writeln!(sink.writer, "{}", line).and_then(|_| sink.writer.flush());
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "Could not write conversation log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_events_become_flat_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("conversation.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "turn_committed",
            json!({"discussion_id": "d-1", "turn": {"sequence": 1, "speaker": "ceo"}}),
        ));
        logger.log(ConversationEvent::new(
            "model_fallback",
            json!({"discussion_id": "d-1", "model": "openai/gpt-4"}),
        ));

        let records = lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "turn_committed");
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[0]["turn"]["speaker"], "ceo");
        assert_eq!(records[1]["event"], "model_fallback");
        assert_eq!(records[1]["seq"], 2);

        let stamp = records[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new("note", json!("just a string")));
        logger.log(ConversationEvent::new("empty", Value::Null));

        let records = lines(&path);
        assert_eq!(records[0]["data"], "just a string");
        assert_eq!(records[1]["event"], "empty");
        assert!(records[1].get("data").is_none());
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.jsonl");

        for _ in 0..2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("discussion_started", json!({})));
        }

        assert_eq!(lines(&path).len(), 2);
    }
}
