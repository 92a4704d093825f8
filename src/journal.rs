use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::model::{MoveCategory, MoveRecord};

/// Journal entry status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    Recorded,
    Undone,
}

/// A single journal entry (NDJSON line). One line per real move; undo
/// appends a matching `undone` line rather than rewriting history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique move ID, shared between the recorded and undone lines.
    pub id: Uuid,
    /// Timestamp (ISO 8601).
    pub ts: DateTime<Utc>,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: MoveCategory,
    pub status: JournalStatus,
}

impl JournalEntry {
    pub fn recorded(record: &MoveRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            ts: Utc::now(),
            source: record.source.clone(),
            destination: record.destination.clone(),
            category: record.category,
            status: JournalStatus::Recorded,
        }
    }

    pub fn undone(&self) -> Self {
        Self {
            ts: Utc::now(),
            status: JournalStatus::Undone,
            ..self.clone()
        }
    }
}

/// Journal writer that appends NDJSON lines, flushed per record.
pub struct JournalWriter {
    file: std::fs::File,
}

impl JournalWriter {
    /// Open journal file for appending.
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self { file })
    }

    /// Write a journal entry.
    pub fn write(&mut self, entry: &JournalEntry) -> anyhow::Result<()> {
        let line = serde_json::to_string(entry)?;
        use std::io::Write;
        writeln!(&mut self.file, "{}", line)?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Read journal entries from a file.
pub fn read_journal(path: PathBuf) -> anyhow::Result<Vec<JournalEntry>> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<JournalEntry> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| anyhow::anyhow!("invalid journal line: {}", e))
        })
        .collect::<anyhow::Result<_>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        let record = MoveRecord {
            source: "/tmp/sub/a.txt".into(),
            destination: "/tmp/a.txt".into(),
            category: MoveCategory::File,
        };
        let entry = JournalEntry::recorded(&record);
        let mut writer = JournalWriter::open(path.clone()).unwrap();
        writer.write(&entry).unwrap();
        writer.write(&entry.undone()).unwrap();

        let entries = read_journal(path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entries[1].id);
        assert_eq!(entries[0].status, JournalStatus::Recorded);
        assert_eq!(entries[1].status, JournalStatus::Undone);
        assert_eq!(entries[1].source, record.source);
    }

    #[test]
    fn test_read_journal_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        std::fs::write(&path, "not json\n").unwrap();
        assert!(read_journal(path).is_err());
    }
}
