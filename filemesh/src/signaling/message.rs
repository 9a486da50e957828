//! Relay messages, JSON-encoded and tagged by `type`.

use crate::domain::PeerId;
use crate::error::{MeshError, Result};
use crate::transport::Signal;
use serde::{Deserialize, Serialize};

/// Relay to node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelayEvent {
    /// Sent once to a newcomer, listing peers already present.
    RosterSnapshot {
        #[serde(rename = "peerIDs")]
        peer_ids: Vec<PeerId>,
    },
    /// Sent to present peers when someone joins.
    PeerJoined {
        #[serde(rename = "peerID")]
        peer_id: PeerId,
    },
    /// An initiator's signal addressed to us.
    SignalRelayed {
        #[serde(rename = "fromPeerID")]
        from_peer_id: PeerId,
        signal: Signal,
    },
    /// A responder's answer to a signal we sent.
    SignalReturned {
        #[serde(rename = "peerID")]
        peer_id: PeerId,
        signal: Signal,
    },
    PeerLeft {
        #[serde(rename = "peerID")]
        peer_id: PeerId,
    },
}

/// Node to relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelayCommand {
    SendSignal {
        #[serde(rename = "targetPeerID")]
        target_peer_id: PeerId,
        #[serde(rename = "callerID")]
        caller_id: PeerId,
        signal: Signal,
    },
    /// `caller_id` names the initiator the answer goes back to.
    ReturnSignal {
        signal: Signal,
        #[serde(rename = "callerID")]
        caller_id: PeerId,
    },
}

impl RelayEvent {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MeshError::ProtocolParse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MeshError::ProtocolParse(e.to_string()))
    }
}

impl RelayCommand {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MeshError::ProtocolParse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MeshError::ProtocolParse(e.to_string()))
    }
}
