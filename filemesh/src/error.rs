//! Error taxonomy for the mesh core.
//!
//! Most of these never reach a caller: they are handled where they are
//! detected and show up only in the log. `request_file`, local sharing and
//! configuration loading are the operations that return them.

use crate::domain::PeerId;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug)]
pub enum MeshError {
    /// The signaling relay could not be reached.
    SignalingUnavailable(String),
    /// No `Connected` connection exists for the peer.
    PeerUnavailable(PeerId),
    /// The transport reported an error or closed unexpectedly.
    PeerTransportFailed { peer_id: PeerId, reason: String },
    /// A frame or relay message could not be decoded.
    ProtocolParse(String),
    /// A request named a file that is not in the local file set.
    FileNotFound(String),
    /// Reading a file being served failed.
    TransferAborted { name: String, reason: String },
    /// A receive session for the same peer and file already exists.
    TransferInProgress { peer_id: PeerId, name: String },
    Io(io::Error),
    Config(String),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::SignalingUnavailable(reason) => {
                write!(f, "Signaling relay unavailable: {}", reason)
            }
            MeshError::PeerUnavailable(peer_id) => {
                write!(f, "Peer {} is not connected", peer_id)
            }
            MeshError::PeerTransportFailed { peer_id, reason } => {
                write!(f, "Transport to {} failed: {}", peer_id, reason)
            }
            MeshError::ProtocolParse(reason) => write!(f, "Malformed frame: {}", reason),
            MeshError::FileNotFound(name) => write!(f, "File not found: {}", name),
            MeshError::TransferAborted { name, reason } => {
                write!(f, "Transfer of {} aborted: {}", name, reason)
            }
            MeshError::TransferInProgress { peer_id, name } => {
                write!(f, "Already receiving {} from {}", name, peer_id)
            }
            MeshError::Io(err) => write!(f, "I/O error: {}", err),
            MeshError::Config(reason) => write!(f, "Configuration error: {}", reason),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MeshError {
    fn from(err: io::Error) -> Self {
        MeshError::Io(err)
    }
}

impl From<config_loader::ConfigError> for MeshError {
    fn from(err: config_loader::ConfigError) -> Self {
        MeshError::Config(err.to_string())
    }
}
