//! In-process mesh simulator.
//!
//! [`LocalMesh`] runs any number of [`FileMeshNode`]s on the current thread,
//! joined through an in-memory relay and in-memory transports. Everything a
//! node emits is queued and delivered in order by [`LocalMesh::run_until_idle`],
//! which also pumps outbound transfers until no node has work left.

mod hub;
mod relay;
mod transport;

pub use relay::MemoryRelay;
pub use transport::{MemoryChannel, MemoryTransportFactory};

use crate::config::TransferConfig;
use crate::domain::{LinkId, PeerId, generate_peer_id};
use crate::node::FileMeshNode;
use crate::signaling::RelayEvent;
use crate::transport::TransportEvent;
use hub::{Envelope, Hub, SharedHub};
use logging::Logger;
use std::collections::BTreeMap;

/// Upper bound on deliveries per `run_until_idle` call.
const MAX_STEPS: usize = 1_000_000;

pub struct LocalMesh {
    hub: SharedHub,
    nodes: BTreeMap<PeerId, FileMeshNode>,
    config: TransferConfig,
    root_logger: Logger,
    logger: Logger,
}

impl LocalMesh {
    pub fn new(config: TransferConfig, logger: &Logger) -> Self {
        Self {
            hub: Hub::shared(),
            nodes: BTreeMap::new(),
            config,
            root_logger: logger.clone(),
            logger: logger.for_component("Sim"),
        }
    }

    /// Creates a node and joins it to the relay. Returns false if the id is taken.
    pub fn add_peer(&mut self, peer_id: &str) -> bool {
        if self.nodes.contains_key(peer_id) {
            self.logger
                .warn(&format!("Peer {} already exists", peer_id));
            return false;
        }

        let node = FileMeshNode::new(
            peer_id,
            &self.config,
            Box::new(MemoryRelay::new(
                peer_id,
                self.hub.clone(),
                self.logger.clone(),
            )),
            Box::new(MemoryTransportFactory::new(peer_id, self.hub.clone())),
            &self.root_logger,
        );
        self.nodes.insert(peer_id.to_string(), node);
        self.hub.borrow_mut().join(peer_id);
        self.logger.info(&format!("{} joined the mesh", peer_id));
        true
    }

    /// Joins a node under a freshly generated id and returns that id.
    pub fn add_generated_peer(&mut self) -> PeerId {
        loop {
            let peer_id = generate_peer_id();
            if self.add_peer(&peer_id) {
                return peer_id;
            }
        }
    }

    /// Removes a node as a closed tab would: it leaves the relay and its
    /// channels close.
    pub fn remove_peer(&mut self, peer_id: &str) -> Option<FileMeshNode> {
        let mut node = self.nodes.remove(peer_id)?;
        self.hub.borrow_mut().leave(peer_id);
        node.shutdown();
        self.logger.info(&format!("{} left the mesh", peer_id));
        Some(node)
    }

    pub fn node(&self, peer_id: &str) -> Option<&FileMeshNode> {
        self.nodes.get(peer_id)
    }

    pub fn node_mut(&mut self, peer_id: &str) -> Option<&mut FileMeshNode> {
        self.nodes.get_mut(peer_id)
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.nodes.keys().cloned().collect()
    }

    /// Peers currently on the relay roster.
    pub fn relay_roster(&self) -> Vec<PeerId> {
        self.hub.borrow().roster().to_vec()
    }

    /// The newest channel `owner` holds towards `remote`, if any.
    pub fn current_link(&self, owner: &str, remote: &str) -> Option<LinkId> {
        self.hub.borrow().current_link(owner, remote)
    }

    // ===== Fault injection =====

    /// Fails the channel between `owner` and `remote` on both ends.
    pub fn fail_link(&mut self, owner: &str, remote: &str) -> bool {
        self.hub
            .borrow_mut()
            .fail(owner, remote, "simulated transport failure")
    }

    /// Cuts `peer_id`'s relay connection. Its existing channels stay up.
    pub fn disconnect_relay(&mut self, peer_id: &str) {
        self.hub.borrow_mut().cut_relay(peer_id);
    }

    /// Queues a relay event for `to` as if the relay had sent it.
    pub fn inject_relay_event(&mut self, to: &str, event: RelayEvent) {
        self.hub.borrow_mut().push(Envelope::Relay {
            to: to.to_string(),
            event,
        });
    }

    /// Queues a transport event for `to` on an arbitrary link.
    pub fn inject_transport_event(&mut self, to: &str, link: &LinkId, event: TransportEvent) {
        self.hub.borrow_mut().push(Envelope::Transport {
            to: to.to_string(),
            link: link.clone(),
            event,
        });
    }

    /// Queues raw frame bytes for `to` on its newest channel from `from`.
    pub fn inject_data(&mut self, to: &str, from: &str, bytes: Vec<u8>) -> bool {
        let Some(link) = self.current_link(to, from) else {
            return false;
        };
        self.inject_transport_event(to, &link, TransportEvent::Data(bytes));
        true
    }

    // ===== Driving =====

    /// Delivers one queued envelope, or pumps every node once when the queue
    /// is empty. Returns false when there was nothing to do.
    pub fn step(&mut self) -> bool {
        let next = self.hub.borrow_mut().pop();
        match next {
            Some(envelope) => {
                self.deliver(envelope);
                true
            }
            None => self.pump_all(),
        }
    }

    /// Runs until no envelope is queued and no upload is pending. Returns the
    /// number of steps taken.
    pub fn run_until_idle(&mut self) -> usize {
        let mut steps = 0;
        while steps < MAX_STEPS {
            if !self.step() {
                return steps;
            }
            steps += 1;
        }
        self.logger.warn(&format!(
            "Still busy after {} steps, {} envelope(s) queued",
            steps,
            self.hub.borrow().pending()
        ));
        steps
    }

    fn pump_all(&mut self) -> bool {
        let mut busy = false;
        for node in self.nodes.values_mut() {
            if node.has_pending_uploads() && !node.pump_transfers().is_idle() {
                busy = true;
            }
        }
        busy
    }

    fn deliver(&mut self, envelope: Envelope) {
        let to = match &envelope {
            Envelope::Relay { to, .. }
            | Envelope::Transport { to, .. }
            | Envelope::SignalingLost { to } => to.clone(),
        };
        let Some(node) = self.nodes.get_mut(&to) else {
            self.logger
                .debug(&format!("Dropping envelope for departed peer {}", to));
            return;
        };

        match envelope {
            Envelope::Relay { event, .. } => node.handle_relay_event(event),
            Envelope::Transport { link, event, .. } => node.handle_transport_event(&link, event),
            Envelope::SignalingLost { .. } => node.handle_signaling_lost(),
        }
    }
}
