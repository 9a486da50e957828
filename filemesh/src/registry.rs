//! Registry of live peer connections.
//!
//! The registry is the only place a `PeerConnection` lives, and it holds at
//! most one per peer id. Connections in a terminal state are removed, never
//! kept around for reuse.

use crate::domain::{ConnectionState, LinkId, PeerId, Role};
use crate::transfer::WireFrame;
use crate::transport::{Signal, TransportChannel};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;

/// One connection to one remote peer.
pub struct PeerConnection {
    pub peer_id: PeerId,
    pub role: Role,
    pub state: ConnectionState,
    pub generation: u64,
    channel: Box<dyn TransportChannel>,
    fed_signals: HashSet<String>,
}

impl PeerConnection {
    pub fn new(
        peer_id: &str,
        role: Role,
        generation: u64,
        channel: Box<dyn TransportChannel>,
    ) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            role,
            state: ConnectionState::Signaling,
            generation,
            channel,
            fed_signals: HashSet::new(),
        }
    }

    pub fn link(&self) -> LinkId {
        LinkId::new(&self.peer_id, self.generation)
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Feeds a remote signal once. Returns false for a repeat delivery.
    pub fn feed_signal(&mut self, signal: &Signal) -> bool {
        if !self.fed_signals.insert(signal.fingerprint()) {
            return false;
        }
        self.channel.signal(signal);
        true
    }

    pub fn send_frame(&mut self, frame: &WireFrame) -> io::Result<()> {
        self.channel.send(frame.to_bytes()?)
    }

    pub fn close(&mut self) {
        self.channel.close();
    }
}

impl fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConnection")
            .field("peer_id", &self.peer_id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct PeerRegistry {
    connections: BTreeMap<PeerId, PeerConnection>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.connections.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &str) -> Option<&PeerConnection> {
        self.connections.get(peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &str) -> Option<&mut PeerConnection> {
        self.connections.get_mut(peer_id)
    }

    /// Looks up the connection only if it is the one `link` was opened for.
    pub fn get_link_mut(&mut self, link: &LinkId) -> Option<&mut PeerConnection> {
        self.connections
            .get_mut(&link.peer_id)
            .filter(|c| c.generation == link.generation)
    }

    /// The connection only if it is `Connected`.
    pub fn connected_mut(&mut self, peer_id: &str) -> Option<&mut PeerConnection> {
        self.connections
            .get_mut(peer_id)
            .filter(|c| c.is_connected())
    }

    /// Adds a connection. If the peer already has one, the new channel is
    /// closed and discarded, and the existing connection is kept.
    pub fn insert(&mut self, mut connection: PeerConnection) -> bool {
        if self.connections.contains_key(&connection.peer_id) {
            connection.close();
            return false;
        }
        self.connections
            .insert(connection.peer_id.clone(), connection);
        true
    }

    pub fn remove(&mut self, peer_id: &str) -> Option<PeerConnection> {
        self.connections.remove(peer_id)
    }

    pub fn state_of(&self, peer_id: &str) -> Option<ConnectionState> {
        self.connections.get(peer_id).map(|c| c.state)
    }

    pub fn role_of(&self, peer_id: &str) -> Option<Role> {
        self.connections.get(peer_id).map(|c| c.role)
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.connections.keys().cloned().collect()
    }

    pub fn connected_peer_ids(&self) -> Vec<PeerId> {
        self.connections
            .values()
            .filter(|c| c.is_connected())
            .map(|c| c.peer_id.clone())
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.connections.values().filter(|c| c.is_connected()).count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Removes every connection, handing them back for teardown.
    pub fn drain(&mut self) -> Vec<PeerConnection> {
        std::mem::take(&mut self.connections).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Tap {
        signals: usize,
        sent: Vec<Vec<u8>>,
        closed: bool,
    }

    struct TapChannel(Rc<RefCell<Tap>>);

    impl TransportChannel for TapChannel {
        fn signal(&mut self, _signal: &Signal) {
            self.0.borrow_mut().signals += 1;
        }

        fn send(&mut self, frame: Vec<u8>) -> io::Result<()> {
            self.0.borrow_mut().sent.push(frame);
            Ok(())
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed = true;
        }
    }

    fn connection(peer_id: &str, generation: u64) -> (PeerConnection, Rc<RefCell<Tap>>) {
        let tap = Rc::new(RefCell::new(Tap::default()));
        let channel = Box::new(TapChannel(tap.clone()));
        (
            PeerConnection::new(peer_id, Role::Initiator, generation, channel),
            tap,
        )
    }

    #[test]
    fn test_second_insert_for_same_peer_is_rejected_and_closed() {
        let mut registry = PeerRegistry::new();
        let (first, first_tap) = connection("bob", 1);
        let (second, second_tap) = connection("bob", 2);

        assert!(registry.insert(first));
        assert!(!registry.insert(second));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("bob").unwrap().generation, 1);
        assert!(!first_tap.borrow().closed);
        assert!(second_tap.borrow().closed);
    }

    #[test]
    fn test_duplicate_signal_is_fed_once() {
        let (mut conn, tap) = connection("bob", 1);
        let signal = Signal::new(serde_json::json!({"type": "answer"}));

        assert!(conn.feed_signal(&signal));
        assert!(!conn.feed_signal(&signal));
        assert_eq!(tap.borrow().signals, 1);
    }

    #[test]
    fn test_link_lookup_checks_generation() {
        let mut registry = PeerRegistry::new();
        let (conn, _) = connection("bob", 7);
        registry.insert(conn);

        assert!(registry.get_link_mut(&LinkId::new("bob", 7)).is_some());
        assert!(registry.get_link_mut(&LinkId::new("bob", 6)).is_none());
    }

    #[test]
    fn test_connected_filters() {
        let mut registry = PeerRegistry::new();
        let (a, _) = connection("a", 1);
        let (b, _) = connection("b", 2);
        registry.insert(a);
        registry.insert(b);
        registry.get_mut("b").unwrap().state = ConnectionState::Connected;

        assert_eq!(registry.connected_peer_ids(), vec!["b".to_string()]);
        assert_eq!(registry.connected_count(), 1);
        assert!(registry.connected_mut("a").is_none());
        assert!(registry.connected_mut("b").is_some());
    }
}
