//! Message contract with the signaling relay.

mod message;

pub use message::{RelayCommand, RelayEvent};

use std::io;

/// Outbound half of the relay connection.
pub trait SignalingSink {
    /// Sends one command. An error means the relay is unreachable.
    fn send(&mut self, command: RelayCommand) -> io::Result<()>;
}
