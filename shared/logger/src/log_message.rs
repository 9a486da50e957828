//! Internal log message structure.

use crate::log_level::LogLevel;
use chrono::Local;

/// Internal representation of a log message.
#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, component: Option<String>, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            component,
            message,
        }
    }

    /// Formats as `[timestamp] LEVEL [component]: message\n`
    pub fn format(&self) -> String {
        match &self.component {
            Some(component) => format!(
                "[{}] {} [{}]: {}\n",
                self.timestamp,
                self.level.as_str(),
                component,
                self.message
            ),
            None => format!(
                "[{}] {}: {}\n",
                self.timestamp,
                self.level.as_str(),
                self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_component() {
        let msg = LogMessage::new(
            LogLevel::Warn,
            Some("Transfer".to_string()),
            "file not found".to_string(),
        );
        let formatted = msg.format();

        assert!(formatted.contains("WARN [Transfer]: file not found"));
        assert!(formatted.ends_with('\n'));
    }

    #[test]
    fn test_format_without_component() {
        let msg = LogMessage::new(LogLevel::Info, None, "started".to_string());
        assert!(msg.format().contains("INFO: started"));
    }

    #[test]
    fn test_timestamp_format() {
        let msg = LogMessage::new(LogLevel::Info, None, "Test".to_string());
        let ts = &msg.timestamp;

        // YYYY-MM-DD HH:MM:SS.mmm
        assert_eq!(ts.len(), 23);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[19..20], ".");
    }
}
