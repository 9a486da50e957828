//! Seam to the peer-to-peer transport.
//!
//! The mesh never negotiates ICE/DTLS itself. It asks a [`TransportFactory`]
//! for a channel, feeds it remote signals and frames, and is told what the
//! channel did through [`TransportEvent`]s delivered by the host.

mod signal;

pub use signal::Signal;

use crate::domain::{LinkId, Role};
use std::io;

/// Something a transport channel reports back to the node.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Local signaling data that must reach the remote peer through the relay.
    Signal(Signal),
    /// The channel is open.
    Connect,
    /// One frame from the remote peer, delivered in send order.
    Data(Vec<u8>),
    /// The channel closed.
    Close,
    /// The channel failed.
    Error(String),
}

/// One point-to-point channel to a remote peer.
pub trait TransportChannel {
    /// Feeds signaling data received from the remote peer.
    fn signal(&mut self, signal: &Signal);

    /// Queues one frame for delivery.
    fn send(&mut self, frame: Vec<u8>) -> io::Result<()>;

    /// Tears the channel down. No events for this link are expected afterwards.
    fn close(&mut self);
}

/// Opens transport channels on behalf of the orchestrator.
pub trait TransportFactory {
    /// Creates the channel identified by `link`. An Initiator channel starts
    /// producing its offer on its own; a Responder waits for [`TransportChannel::signal`].
    fn open(&mut self, link: &LinkId, role: Role) -> Box<dyn TransportChannel>;
}
