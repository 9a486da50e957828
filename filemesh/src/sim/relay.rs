//! In-memory signaling relay.

use super::hub::{Envelope, SharedHub};
use crate::domain::PeerId;
use crate::signaling::{RelayCommand, RelayEvent, SignalingSink};
use logging::Logger;
use std::io;

/// One node's connection to the shared relay.
///
/// `send-signal` is forwarded to its target as `signal-relayed`, and
/// `return-signal` goes back to the caller as `signal-returned` naming the
/// responder. Commands for peers that are no longer on the roster are dropped.
pub struct MemoryRelay {
    local_id: PeerId,
    hub: SharedHub,
    logger: Logger,
}

impl MemoryRelay {
    pub(crate) fn new(local_id: &str, hub: SharedHub, logger: Logger) -> Self {
        Self {
            local_id: local_id.to_string(),
            hub,
            logger,
        }
    }
}

impl SignalingSink for MemoryRelay {
    fn send(&mut self, command: RelayCommand) -> io::Result<()> {
        let mut hub = self.hub.borrow_mut();
        if !hub.is_online(&self.local_id) {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "relay connection is down",
            ));
        }

        let (to, event) = match command {
            RelayCommand::SendSignal {
                target_peer_id,
                caller_id,
                signal,
            } => (
                target_peer_id,
                RelayEvent::SignalRelayed {
                    from_peer_id: caller_id,
                    signal,
                },
            ),
            RelayCommand::ReturnSignal { signal, caller_id } => (
                caller_id,
                RelayEvent::SignalReturned {
                    peer_id: self.local_id.clone(),
                    signal,
                },
            ),
        };

        if !hub.is_online(&to) {
            self.logger
                .debug(&format!("Relay dropped signal for absent peer {}", to));
            return Ok(());
        }
        hub.push(Envelope::Relay { to, event });
        Ok(())
    }
}
