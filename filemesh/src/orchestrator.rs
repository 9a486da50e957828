//! Turns relay roster churn into a duplicate-free set of peer connections.
//!
//! Only the joining peer initiates: a roster snapshot makes the newcomer an
//! Initiator towards everyone already present, while present peers create a
//! Responder connection only when a relayed signal arrives. Each unordered
//! pair therefore sees at most one connection attempt.

use crate::domain::{ConnectionState, LinkId, NodeStatus, PeerId, Role};
use crate::registry::{PeerConnection, PeerRegistry};
use crate::signaling::{RelayCommand, SignalingSink};
use crate::transport::{Signal, TransportEvent, TransportFactory};
use logging::Logger;

/// Lifecycle change the rest of the node must react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerLifecycle {
    Connected(PeerId),
    /// The connection reached a terminal state and has been purged.
    Departed {
        peer_id: PeerId,
        state: ConnectionState,
    },
}

/// Result of handling one transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Nothing,
    Lifecycle(PeerLifecycle),
    /// A frame from a connected peer, to be dispatched by the node.
    Data { peer_id: PeerId, bytes: Vec<u8> },
}

pub struct ConnectionOrchestrator {
    local_id: PeerId,
    registry: PeerRegistry,
    transports: Box<dyn TransportFactory>,
    signaling: Box<dyn SignalingSink>,
    next_generation: u64,
    status: NodeStatus,
    logger: Logger,
}

impl ConnectionOrchestrator {
    pub fn new(
        local_id: &str,
        transports: Box<dyn TransportFactory>,
        signaling: Box<dyn SignalingSink>,
        logger: Logger,
    ) -> Self {
        Self {
            local_id: local_id.to_string(),
            registry: PeerRegistry::new(),
            transports,
            signaling,
            next_generation: 1,
            status: NodeStatus::Connecting,
            logger,
        }
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PeerRegistry {
        &mut self.registry
    }

    // ===== Relay events =====

    /// Newcomer side: initiate towards every peer already present.
    pub fn on_roster_snapshot(&mut self, peer_ids: &[PeerId]) {
        self.logger.info(&format!(
            "Roster snapshot with {} peer(s)",
            peer_ids.len()
        ));
        self.set_status(NodeStatus::Searching);

        for peer_id in peer_ids {
            if *peer_id == self.local_id {
                continue;
            }
            if self.registry.contains(peer_id) {
                self.logger.debug(&format!(
                    "Already have a connection to {}, not initiating",
                    peer_id
                ));
                continue;
            }
            self.open_connection(peer_id, Role::Initiator);
        }
    }

    /// Present-peer side: the newcomer will send the offer, so nothing is opened here.
    pub fn on_peer_joined(&mut self, peer_id: &str) {
        if peer_id == self.local_id {
            return;
        }
        self.logger
            .info(&format!("{} joined, waiting for its offer", peer_id));
        self.set_status(NodeStatus::PeerJoining);
    }

    /// Creates a Responder connection on first contact, then feeds the signal.
    pub fn on_signal_relayed(&mut self, from_peer_id: &str, signal: &Signal) {
        if from_peer_id == self.local_id {
            self.logger.warn("Ignoring a signal relayed from our own id");
            return;
        }
        if !self.registry.contains(from_peer_id) {
            self.open_connection(from_peer_id, Role::Responder);
        }
        let Some(connection) = self.registry.get_mut(from_peer_id) else {
            return;
        };
        if !connection.feed_signal(signal) {
            self.logger.debug(&format!(
                "Duplicate signal from {} ignored",
                from_peer_id
            ));
        }
    }

    /// Feeds an answer to our Initiator connection; anything else is ignored.
    pub fn on_signal_returned(&mut self, peer_id: &str, signal: &Signal) {
        match self.registry.get_mut(peer_id) {
            Some(connection) if connection.role == Role::Initiator => {
                if !connection.feed_signal(signal) {
                    self.logger
                        .debug(&format!("Duplicate answer from {} ignored", peer_id));
                }
            }
            Some(_) => self.logger.warn(&format!(
                "Returned signal from {} but we are not the initiator",
                peer_id
            )),
            None => self.logger.debug(&format!(
                "Returned signal from {} with no connection, ignored",
                peer_id
            )),
        }
    }

    pub fn on_peer_left(&mut self, peer_id: &str) -> Option<PeerLifecycle> {
        self.purge(peer_id, ConnectionState::Closed, "left the relay")
    }

    /// The relay is gone. Established connections are kept; nothing is retried.
    pub fn on_signaling_lost(&mut self) {
        self.logger
            .error("Signaling relay lost; no new connections can be set up");
        self.status = NodeStatus::SignalingUnavailable;
    }

    // ===== Transport events =====

    pub fn on_transport_event(&mut self, link: &LinkId, event: TransportEvent) -> LinkOutcome {
        let Some(connection) = self.registry.get_link_mut(link) else {
            self.logger
                .debug(&format!("Event for stale link {} ignored", link));
            return LinkOutcome::Nothing;
        };
        let peer_id = connection.peer_id.clone();
        let role = connection.role;
        let state = connection.state;

        match event {
            TransportEvent::Signal(signal) => {
                self.route_signal(&peer_id, role, signal);
                LinkOutcome::Nothing
            }
            TransportEvent::Connect => {
                if state != ConnectionState::Signaling {
                    return LinkOutcome::Nothing;
                }
                connection.state = ConnectionState::Connected;
                self.logger
                    .info(&format!("Connected to {} as {}", peer_id, role));
                self.refresh_connected_status();
                LinkOutcome::Lifecycle(PeerLifecycle::Connected(peer_id))
            }
            TransportEvent::Data(bytes) => {
                if state != ConnectionState::Connected {
                    self.logger.warn(&format!(
                        "Dropping {}-byte frame from {} before connect",
                        bytes.len(),
                        peer_id
                    ));
                    return LinkOutcome::Nothing;
                }
                LinkOutcome::Data { peer_id, bytes }
            }
            TransportEvent::Close => self
                .purge(&peer_id, ConnectionState::Closed, "channel closed")
                .map(LinkOutcome::Lifecycle)
                .unwrap_or(LinkOutcome::Nothing),
            TransportEvent::Error(reason) => self
                .purge(&peer_id, ConnectionState::Failed, &reason)
                .map(LinkOutcome::Lifecycle)
                .unwrap_or(LinkOutcome::Nothing),
        }
    }

    /// Closes and forgets every connection.
    pub fn shutdown(&mut self) -> Vec<PeerId> {
        let mut closed = Vec::new();
        for mut connection in self.registry.drain() {
            connection.state = ConnectionState::Closed;
            connection.close();
            closed.push(connection.peer_id);
        }
        if !closed.is_empty() {
            self.logger
                .info(&format!("Closed {} connection(s)", closed.len()));
        }
        closed
    }

    // ===== Internals =====

    fn open_connection(&mut self, peer_id: &str, role: Role) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let link = LinkId::new(peer_id, generation);
        let channel = self.transports.open(&link, role);
        if self
            .registry
            .insert(PeerConnection::new(peer_id, role, generation, channel))
        {
            self.logger
                .info(&format!("Opened {} link {}", role, link));
        }
    }

    fn route_signal(&mut self, peer_id: &str, role: Role, signal: Signal) {
        let command = match role {
            Role::Initiator => RelayCommand::SendSignal {
                target_peer_id: peer_id.to_string(),
                caller_id: self.local_id.clone(),
                signal,
            },
            Role::Responder => RelayCommand::ReturnSignal {
                signal,
                caller_id: peer_id.to_string(),
            },
        };
        match self.signaling.send(command) {
            Ok(()) => self
                .logger
                .debug(&format!("Relayed {} signal for {}", role, peer_id)),
            Err(e) => {
                self.logger.error(&format!(
                    "Could not relay signal for {}: {}",
                    peer_id, e
                ));
                self.status = NodeStatus::SignalingUnavailable;
            }
        }
    }

    fn purge(
        &mut self,
        peer_id: &str,
        state: ConnectionState,
        reason: &str,
    ) -> Option<PeerLifecycle> {
        debug_assert!(state.is_terminal(), "purge with live state {}", state);
        let mut connection = self.registry.remove(peer_id)?;
        connection.state = state;
        connection.close();
        self.logger.info(&format!(
            "Connection to {} is {} ({})",
            peer_id, state, reason
        ));
        self.refresh_connected_status();
        Some(PeerLifecycle::Departed {
            peer_id: peer_id.to_string(),
            state,
        })
    }

    fn refresh_connected_status(&mut self) {
        let peers = self.registry.connected_count();
        if peers > 0 {
            self.set_status(NodeStatus::Connected { peers });
        } else {
            self.set_status(NodeStatus::Searching);
        }
    }

    /// Status changes never clear a lost relay.
    fn set_status(&mut self, status: NodeStatus) {
        if self.status != NodeStatus::SignalingUnavailable {
            self.status = status;
        }
    }
}
