use super::PeerId;
use std::fmt;

/// Names one concrete transport channel: the remote peer plus the generation
/// under which the channel was opened.
///
/// Generations increase for every connection a node creates, so an event from
/// a channel that has already been purged never matches the connection that
/// replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkId {
    pub peer_id: PeerId,
    pub generation: u64,
}

impl LinkId {
    pub fn new(peer_id: &str, generation: u64) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            generation,
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.peer_id, self.generation)
    }
}
