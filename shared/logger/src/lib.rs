//! Component-tagged logging shared by every crate in the workspace.
//!
//! A [`Logger`] filters by [`LogLevel`] and forwards records to one sink:
//! a background writer thread appending to a file, an in-memory buffer
//! inspected through [`LogCapture`], or nowhere at all. Loggers derived
//! with [`Logger::for_component`] share their parent's sink.

mod capture;
pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use capture::LogCapture;
pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
