//! Background log file writer.

use crate::error::Result;
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};

pub(crate) struct LogWriter {
    file: File,
}

impl LogWriter {
    /// Opens or creates the file in append mode.
    pub fn new(log_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self { file })
    }

    fn write_message(&mut self, message: &LogMessage) {
        if let Err(e) = self.file.write_all(message.format().as_bytes()) {
            eprintln!("Error writing log: {}", e);
            return;
        }
        if let Err(e) = self.file.flush() {
            eprintln!("Error flushing log: {}", e);
        }
    }

    /// Runs until every sender is dropped.
    pub fn run(mut self, receiver: Receiver<LogMessage>) {
        for message in receiver {
            self.write_message(&message);
        }
    }
}

/// Opens the log file and spawns its writer thread, returning the feeding end.
pub(crate) fn spawn_writer_thread(log_path: &Path) -> Result<Sender<LogMessage>> {
    let writer = LogWriter::new(log_path)?;
    let (sender, receiver) = channel();
    std::thread::spawn(move || writer.run(receiver));
    Ok(sender)
}
