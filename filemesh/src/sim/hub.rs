//! Shared state behind the in-memory relay and transports.

use crate::domain::{LinkId, PeerId};
use crate::signaling::RelayEvent;
use crate::transport::TransportEvent;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

pub(crate) type SharedHub = Rc<RefCell<Hub>>;

/// Something waiting to be delivered to a node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Envelope {
    Relay {
        to: PeerId,
        event: RelayEvent,
    },
    Transport {
        to: PeerId,
        link: LinkId,
        event: TransportEvent,
    },
    SignalingLost {
        to: PeerId,
    },
}

/// One side of a simulated channel.
#[derive(Debug)]
pub(crate) struct Endpoint {
    pub connected: bool,
    /// The remote endpoint this one is paired with once connected.
    pub partner: Option<(PeerId, LinkId)>,
}

#[derive(Debug, Default)]
pub(crate) struct Hub {
    queue: VecDeque<Envelope>,
    roster: Vec<PeerId>,
    offline: HashSet<PeerId>,
    endpoints: HashMap<(PeerId, LinkId), Endpoint>,
}

impl Hub {
    pub fn shared() -> SharedHub {
        Rc::new(RefCell::new(Hub::default()))
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.queue.push_back(envelope);
    }

    pub fn pop(&mut self) -> Option<Envelope> {
        self.queue.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    // ===== Relay =====

    pub fn roster(&self) -> &[PeerId] {
        &self.roster
    }

    pub fn is_online(&self, peer_id: &str) -> bool {
        self.roster.iter().any(|p| p == peer_id) && !self.offline.contains(peer_id)
    }

    /// Snapshot to the newcomer, join notices to everyone present.
    pub fn join(&mut self, peer_id: &str) {
        let present: Vec<PeerId> = self
            .roster
            .iter()
            .filter(|p| !self.offline.contains(*p))
            .cloned()
            .collect();

        self.push(Envelope::Relay {
            to: peer_id.to_string(),
            event: RelayEvent::RosterSnapshot {
                peer_ids: present.clone(),
            },
        });
        for other in present {
            self.push(Envelope::Relay {
                to: other,
                event: RelayEvent::PeerJoined {
                    peer_id: peer_id.to_string(),
                },
            });
        }
        self.offline.remove(peer_id);
        self.roster.push(peer_id.to_string());
    }

    pub fn leave(&mut self, peer_id: &str) {
        self.roster.retain(|p| p != peer_id);
        self.offline.remove(peer_id);
        let remaining: Vec<PeerId> = self.roster.clone();
        for other in remaining {
            self.push(Envelope::Relay {
                to: other,
                event: RelayEvent::PeerLeft {
                    peer_id: peer_id.to_string(),
                },
            });
        }
    }

    /// Cuts one peer's relay connection. Other peers are not told.
    pub fn cut_relay(&mut self, peer_id: &str) {
        if self.offline.insert(peer_id.to_string()) {
            self.push(Envelope::SignalingLost {
                to: peer_id.to_string(),
            });
        }
    }

    // ===== Transport =====

    pub fn add_endpoint(&mut self, owner: &str, link: &LinkId) {
        self.endpoints.insert(
            (owner.to_string(), link.clone()),
            Endpoint {
                connected: false,
                partner: None,
            },
        );
    }

    pub fn endpoint(&self, owner: &str, link: &LinkId) -> Option<&Endpoint> {
        self.endpoints.get(&(owner.to_string(), link.clone()))
    }

    pub fn remove_endpoint(&mut self, owner: &str, link: &LinkId) -> Option<Endpoint> {
        self.endpoints.remove(&(owner.to_string(), link.clone()))
    }

    /// The newest endpoint `owner` holds towards `remote`.
    pub fn current_link(&self, owner: &str, remote: &str) -> Option<LinkId> {
        self.endpoints
            .keys()
            .filter(|(o, link)| o == owner && link.peer_id == remote)
            .map(|(_, link)| link.clone())
            .max_by_key(|link| link.generation)
    }

    /// Pairs the initiator endpoint with the responder's newest endpoint and
    /// tells both sides the channel is open.
    pub fn connect(&mut self, owner: &str, link: &LinkId) -> bool {
        let Some(remote_link) = self.current_link(&link.peer_id, owner) else {
            return false;
        };
        let remote = link.peer_id.clone();

        for (who, own_link, partner) in [
            (owner.to_string(), link.clone(), (remote.clone(), remote_link.clone())),
            (remote.clone(), remote_link.clone(), (owner.to_string(), link.clone())),
        ] {
            if let Some(endpoint) = self.endpoints.get_mut(&(who.clone(), own_link.clone())) {
                endpoint.connected = true;
                endpoint.partner = Some(partner);
            }
            self.push(Envelope::Transport {
                to: who,
                link: own_link,
                event: TransportEvent::Connect,
            });
        }
        true
    }

    /// Tears down `owner`'s newest channel to `remote` and its partner,
    /// reporting `reason` as a transport error on both ends.
    pub fn fail(&mut self, owner: &str, remote: &str, reason: &str) -> bool {
        let Some(link) = self.current_link(owner, remote) else {
            return false;
        };
        let Some(endpoint) = self.remove_endpoint(owner, &link) else {
            return false;
        };

        let mut ends = vec![(owner.to_string(), link)];
        if let Some((partner, partner_link)) = endpoint.partner
            && self.remove_endpoint(&partner, &partner_link).is_some()
        {
            ends.push((partner, partner_link));
        }
        for (to, link) in ends {
            self.push(Envelope::Transport {
                to,
                link,
                event: TransportEvent::Error(reason.to_string()),
            });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_sends_snapshot_and_notices() {
        let mut hub = Hub::default();
        hub.join("a");
        hub.join("b");

        let delivered: Vec<Envelope> = std::iter::from_fn(|| hub.pop()).collect();
        assert_eq!(
            delivered,
            vec![
                Envelope::Relay {
                    to: "a".to_string(),
                    event: RelayEvent::RosterSnapshot { peer_ids: vec![] }
                },
                Envelope::Relay {
                    to: "b".to_string(),
                    event: RelayEvent::RosterSnapshot {
                        peer_ids: vec!["a".to_string()]
                    }
                },
                Envelope::Relay {
                    to: "a".to_string(),
                    event: RelayEvent::PeerJoined {
                        peer_id: "b".to_string()
                    }
                },
            ]
        );
    }

    #[test]
    fn test_current_link_prefers_newest_generation() {
        let mut hub = Hub::default();
        hub.add_endpoint("a", &LinkId::new("b", 1));
        hub.add_endpoint("a", &LinkId::new("b", 4));
        hub.add_endpoint("a", &LinkId::new("c", 9));

        assert_eq!(hub.current_link("a", "b"), Some(LinkId::new("b", 4)));
        assert_eq!(hub.current_link("b", "a"), None);
    }

    #[test]
    fn test_cut_relay_notifies_once() {
        let mut hub = Hub::default();
        hub.join("a");
        hub.pop();
        hub.cut_relay("a");
        hub.cut_relay("a");

        assert!(!hub.is_online("a"));
        assert_eq!(hub.pending(), 1);
    }
}
