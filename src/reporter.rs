use crate::events::{ProgressEvent, ProgressSink};

/// Sink for the CLI: keeps every event and, in JSON mode, streams each one
/// to stdout as an NDJSON line.
pub struct Reporter {
    events: Vec<ProgressEvent>,
    json_mode: bool,
}

impl Reporter {
    pub fn new(json_mode: bool) -> Self {
        Self {
            events: Vec::new(),
            json_mode,
        }
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }
}

impl ProgressSink for Reporter {
    fn emit(&mut self, event: ProgressEvent) {
        if self.json_mode {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
        }
        self.events.push(event);
    }
}

/// Terminal progress bar driven by the event stream.
#[cfg(feature = "cli")]
pub struct ProgressBarSink {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl ProgressBarSink {
    pub fn new() -> Self {
        Self {
            bar: indicatif::ProgressBar::hidden(),
        }
    }
}

#[cfg(feature = "cli")]
impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressSink for ProgressBarSink {
    fn emit(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Scan { total, .. } => {
                self.bar = indicatif::ProgressBar::new(total as u64);
            }
            ProgressEvent::Move { current, file, .. } => {
                self.bar.set_position(current as u64);
                self.bar.set_message(file.display().to_string());
            }
            ProgressEvent::Done { message, .. } => {
                self.bar.finish_with_message(message);
            }
            _ => {}
        }
    }
}
