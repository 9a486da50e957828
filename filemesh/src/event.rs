use crate::domain::{ConnectionState, NodeStatus, PeerId};
use crate::transfer::ReceivedFile;
use std::path::PathBuf;

/// Events the node reports to its UI (Node -> View)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    StatusChanged(NodeStatus),

    // --- Peers ---
    PeerConnected(PeerId),
    /// The connection reached `Closed` or `Failed` and was purged.
    PeerDisconnected {
        peer_id: PeerId,
        state: ConnectionState,
    },

    // --- Catalog ---
    /// The merged remote catalog changed; re-read it from the node.
    CatalogUpdated,

    // --- File Transfer ---
    FileReceived {
        file: ReceivedFile,
        /// Where the file was written, when a download directory is configured.
        saved_to: Option<PathBuf>,
    },
    /// Serving a local file stopped because it could not be read.
    UploadAborted {
        peer_id: PeerId,
        name: String,
        reason: String,
    },
}
