//! Level-filtered, component-tagged logger.
//!
//! Cloning a [`Logger`] or deriving one with [`Logger::for_component`] never
//! opens a second file: every derived logger feeds the same sink.

use crate::capture::LogCapture;
use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::spawn_writer_thread;
use std::path::Path;
use std::sync::mpsc::Sender;

#[derive(Clone)]
enum Sink {
    File(Sender<LogMessage>),
    Memory(LogCapture),
    Discard,
}

/// Non-blocking logger.
///
/// # Examples
///
/// ```
/// use logging::{LogLevel, Logger};
///
/// let (logger, capture) = Logger::memory(LogLevel::Info);
/// let transfer = logger.for_component("Transfer");
/// transfer.warn("file not found: notes.txt");
/// assert!(capture.contains("[Transfer]: file not found"));
/// ```
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
    level: LogLevel,
    component: Option<String>,
    console_output: bool,
}

impl Logger {
    /// Creates a logger appending to `log_path` from a dedicated writer thread.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new(log_path: &Path, level: LogLevel) -> Result<Self> {
        Ok(Logger {
            sink: Sink::File(spawn_writer_thread(log_path)?),
            level,
            component: None,
            console_output: false,
        })
    }

    /// Creates a file logger tagged with `component`, optionally echoing to stdout.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn with_component(
        log_path: &Path,
        level: LogLevel,
        component: &str,
        console_output: bool,
    ) -> Result<Self> {
        Ok(Logger {
            sink: Sink::File(spawn_writer_thread(log_path)?),
            level,
            component: Some(component.to_string()),
            console_output,
        })
    }

    /// Creates a logger that only writes to stdout.
    pub fn console(level: LogLevel, component: &str) -> Self {
        Logger {
            sink: Sink::Discard,
            level,
            component: Some(component.to_string()),
            console_output: true,
        }
    }

    /// Creates a logger recording into memory, plus the handle to read it back.
    pub fn memory(level: LogLevel) -> (Self, LogCapture) {
        let capture = LogCapture::new();
        let logger = Logger {
            sink: Sink::Memory(capture.clone()),
            level,
            component: None,
            console_output: false,
        };
        (logger, capture)
    }

    /// Creates a logger that drops everything.
    pub fn disabled() -> Self {
        Logger {
            sink: Sink::Discard,
            level: LogLevel::Error,
            component: None,
            console_output: false,
        }
    }

    /// Derives a logger for another component sharing this logger's sink.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            component: Some(component.to_string()),
            ..self.clone()
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        let msg = LogMessage::new(level, self.component.clone(), message.to_string());

        if self.console_output {
            print!("{}", msg.format());
        }

        match &self.sink {
            // A closed writer thread only loses the record.
            Sink::File(sender) => {
                let _ = sender.send(msg);
            }
            Sink::Memory(capture) => capture.push(msg),
            Sink::Discard => {}
        }
    }
}
