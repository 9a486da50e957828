//! In-memory log capture.

use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use std::sync::{Arc, Mutex};

/// Read side of a memory-backed [`Logger`](crate::Logger).
///
/// Lets callers observe failures that are only ever reported through the
/// log, such as a request for a file the peer does not hold.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<LogMessage>>>,
}

impl LogCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, message: LogMessage) {
        if let Ok(mut records) = self.records.lock() {
            records.push(message);
        }
    }

    /// All captured records, formatted like file output but without the newline.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| {
                records
                    .iter()
                    .map(|r| r.format().trim_end().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Whether any record at exactly `level` contains `needle`.
    pub fn contains_at(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .map(|records| {
                records
                    .iter()
                    .any(|r| r.level == level && r.message.contains(needle))
            })
            .unwrap_or(false)
    }

    /// Number of captured records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}
