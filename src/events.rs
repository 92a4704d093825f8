use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::OperationStats;

/// Action taken for one file or archive entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    Move,
    Overwrite,
    Skip,
}

/// Structured event emitted while a flatten run executes. Fire-and-forget:
/// the engine never reads anything back from the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    Scan {
        current: usize,
        total: usize,
        bytes_total: u64,
        message: String,
    },
    ExtractScan {
        total: usize,
        message: String,
    },
    Extract {
        archive: PathBuf,
        index: usize,
        total: usize,
        message: String,
    },
    ExtractFile {
        archive: PathBuf,
        file: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        dest: Option<PathBuf>,
        action: MoveAction,
    },
    Move {
        current: usize,
        total: usize,
        file: PathBuf,
        dest: PathBuf,
        action: MoveAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        moved: usize,
        skipped: usize,
        errors: usize,
        bytes_moved: u64,
        bytes_total: u64,
    },
    ArchiveMove {
        source: PathBuf,
        dest: PathBuf,
    },
    Error {
        file: String,
        error: String,
    },
    Done {
        stats: OperationStats,
        message: String,
    },
}

/// One-directional consumer of [`ProgressEvent`]s. Implementations must not
/// block indefinitely; the engine runs on a single thread and emits inline.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}

/// Sink that forwards events over an mpsc channel, for callers that run the
/// engine on a worker thread and drain progress on their own schedule.
/// Send failures are ignored: a hung consumer must not stall the run.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub std::sync::mpsc::Sender<ProgressEvent>);

impl ProgressSink for ChannelSink {
    fn emit(&mut self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_tagged_by_phase() {
        let event = ProgressEvent::ExtractScan {
            total: 2,
            message: "found 2 zip archive(s) to extract".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["phase"], "extract_scan");
        assert_eq!(json["total"], 2);

        let event = ProgressEvent::Error {
            file: "a.zip:secret.txt".into(),
            error: "encrypted entry skipped".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["phase"], "error");
    }

    #[test]
    fn test_move_event_omits_empty_reason() {
        let event = ProgressEvent::Move {
            current: 1,
            total: 1,
            file: "/tmp/sub/a.txt".into(),
            dest: "/tmp/a.txt".into(),
            action: MoveAction::Move,
            reason: None,
            moved: 1,
            skipped: 0,
            errors: 0,
            bytes_moved: 10,
            bytes_total: 10,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("reason"));
        assert!(json.contains("\"action\":\"move\""));
    }
}
