use crate::common::{EventEnvelope, EventJournal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Event journal stored as JSON Lines, one file per aggregate
/// (`<base>/<aggregate_id>.events.jsonl`).
pub struct FileEventJournal {
    base_path: PathBuf,
}

impl FileEventJournal {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn journal_path(&self, aggregate_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.events.jsonl", aggregate_id))
    }

    async fn read_journal(path: &Path) -> Result<Vec<EventEnvelope>, String> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(format!("Failed to open journal {}: {}", path.display(), e)),
        };

        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();
        let mut line_number = 0usize;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read journal {}: {}", path.display(), e))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: EventEnvelope = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to decode {} line {}: {}", path.display(), line_number, e)
            })?;
            events.push(event);
        }

        Ok(events)
    }
}

#[async_trait]
impl EventJournal for FileEventJournal {
    async fn append_events(
        &self,
        aggregate_id: &str,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create journal directory: {}", e))?;

        let mut buffer = Vec::new();
        for event in &events {
            serde_json::to_writer(&mut buffer, event)
                .map_err(|e| format!("Failed to encode event: {}", e))?;
            buffer.push(b'\n');
        }

        let path = self.journal_path(aggregate_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| format!("Failed to open journal {}: {}", path.display(), e))?;

        // One write per batch keeps a batch contiguous in the file.
        file.write_all(&buffer)
            .await
            .map_err(|e| format!("Failed to append to {}: {}", path.display(), e))?;
        file.flush()
            .await
            .map_err(|e| format!("Failed to flush {}: {}", path.display(), e))?;

        Ok(())
    }

    async fn load_events(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, String> {
        Self::read_journal(&self.journal_path(aggregate_id)).await
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        let mut dir = match tokio::fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(format!("Failed to read journal directory: {}", e)),
        };

        let mut matching = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read journal directory entry: {}", e))?
        {
            let path = entry.path();
            let is_journal = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".events.jsonl"));
            if !is_journal {
                continue;
            }

            matching.extend(
                Self::read_journal(&path)
                    .await?
                    .into_iter()
                    .filter(|e| e.event_type == event_type)
                    .filter(|e| from_timestamp.map_or(true, |from| e.occurred_at >= from)),
            );
        }

        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EventMetadata;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn envelope(aggregate_id: &str, event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: "Fleet".to_string(),
            aggregate_version: 1,
            event_type: event_type.to_string(),
            event_version: 1,
            event_data: serde_json::json!({"path_id": "path-1"}),
            metadata: EventMetadata {
                correlation_id: Some(Uuid::new_v4()),
                source: "test".to_string(),
            },
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn appends_and_reads_back_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let journal = FileEventJournal::new(temp_dir.path().join("journal"));

        let first = envelope("default", "PathCreated");
        let second = envelope("default", "WaypointAppended");
        journal
            .append_events("default", vec![first.clone()])
            .await
            .unwrap();
        journal
            .append_events("default", vec![second.clone()])
            .await
            .unwrap();

        let loaded = journal.load_events("default").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].event_id, first.event_id);
        assert_eq!(loaded[1].event_id, second.event_id);

        let by_type = journal
            .load_events_by_type("WaypointAppended", None)
            .await
            .unwrap();
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].event_id, second.event_id);
    }

    #[tokio::test]
    async fn missing_journal_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let journal = FileEventJournal::new(temp_dir.path().join("nothing-here"));
        assert!(journal.load_events("default").await.unwrap().is_empty());
        assert!(journal
            .load_events_by_type("PathCreated", None)
            .await
            .unwrap()
            .is_empty());
    }
}
