//! Core value types shared by every component.

pub mod connection_state;
pub mod file_descriptor;
pub mod link;
pub mod role;
pub mod status;

pub use connection_state::ConnectionState;
pub use file_descriptor::{FileDescriptor, FileEntry};
pub use link::LinkId;
pub use role::Role;
pub use status::NodeStatus;

/// Identifier assigned to a peer by the signaling relay.
pub type PeerId = String;

/// Generates a local peer id when the relay does not assign one.
pub fn generate_peer_id() -> PeerId {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let random: u32 = rand::random();

    format!("peer_{}_{:08x}", timestamp, random)
}
