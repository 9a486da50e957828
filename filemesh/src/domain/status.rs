//! Node-level status shown by the UI

/// Coarse status of the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Waiting for the relay roster
    Connecting,
    /// Roster received, offers sent to present peers
    Searching,
    /// A newcomer joined and is expected to send an offer
    PeerJoining,
    /// At least one connection is usable
    Connected { peers: usize },
    /// The relay was lost; established connections keep working
    SignalingUnavailable,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Connecting => write!(f, "Connecting to network..."),
            NodeStatus::Searching => write!(f, "Network active. Searching for peers..."),
            NodeStatus::PeerJoining => write!(f, "A new peer joined. Connecting..."),
            NodeStatus::Connected { peers } => {
                write!(f, "Connected to {} peer(s). Ready to share.", peers)
            }
            NodeStatus::SignalingUnavailable => write!(f, "Signaling relay unavailable"),
        }
    }
}
