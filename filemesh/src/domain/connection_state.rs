//! Per-connection lifecycle

/// `Signaling -> Connected -> {Closed | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Exchanging offer/answer through the relay
    Signaling,
    /// Transport open, eligible for catalog exchange and transfers
    Connected,
    /// Peer left or the channel closed
    Closed,
    /// The transport reported an error
    Failed,
}

impl ConnectionState {
    /// Closed and Failed connections are purged and never reused.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Signaling => write!(f, "Signaling"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}
