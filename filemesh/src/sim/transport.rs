//! In-memory transport with a minimal offer/answer handshake.

use super::hub::{Envelope, SharedHub};
use crate::domain::{LinkId, PeerId, Role};
use crate::transport::{Signal, TransportChannel, TransportEvent, TransportFactory};
use serde_json::json;
use std::io;

/// Opens [`MemoryChannel`]s owned by one node.
pub struct MemoryTransportFactory {
    owner: PeerId,
    hub: SharedHub,
}

impl MemoryTransportFactory {
    pub(crate) fn new(owner: &str, hub: SharedHub) -> Self {
        Self {
            owner: owner.to_string(),
            hub,
        }
    }
}

impl TransportFactory for MemoryTransportFactory {
    fn open(&mut self, link: &LinkId, role: Role) -> Box<dyn TransportChannel> {
        let mut hub = self.hub.borrow_mut();
        hub.add_endpoint(&self.owner, link);
        if role == Role::Initiator {
            hub.push(Envelope::Transport {
                to: self.owner.clone(),
                link: link.clone(),
                event: TransportEvent::Signal(Signal::new(json!({
                    "type": "offer",
                    "sdp": format!("offer {} -> {}", self.owner, link),
                }))),
            });
        }

        Box::new(MemoryChannel {
            owner: self.owner.clone(),
            link: link.clone(),
            role,
            hub: self.hub.clone(),
        })
    }
}

/// One end of a simulated channel.
///
/// A Responder answers the first offer it is fed. An Initiator fed an answer
/// opens both ends. Frames are delivered in order to the paired endpoint, and
/// closing one end closes the other.
pub struct MemoryChannel {
    owner: PeerId,
    link: LinkId,
    role: Role,
    hub: SharedHub,
}

impl TransportChannel for MemoryChannel {
    fn signal(&mut self, signal: &Signal) {
        let mut hub = self.hub.borrow_mut();
        if hub.endpoint(&self.owner, &self.link).is_none() {
            return;
        }

        match (self.role, signal.kind()) {
            (Role::Responder, Some("offer")) => hub.push(Envelope::Transport {
                to: self.owner.clone(),
                link: self.link.clone(),
                event: TransportEvent::Signal(Signal::new(json!({
                    "type": "answer",
                    "sdp": format!("answer {} -> {}", self.owner, self.link),
                }))),
            }),
            (Role::Initiator, Some("answer")) => {
                if !hub.connect(&self.owner, &self.link) {
                    hub.push(Envelope::Transport {
                        to: self.owner.clone(),
                        link: self.link.clone(),
                        event: TransportEvent::Error("remote endpoint vanished".to_string()),
                    });
                }
            }
            _ => {}
        }
    }

    fn send(&mut self, frame: Vec<u8>) -> io::Result<()> {
        let mut hub = self.hub.borrow_mut();
        let partner = match hub.endpoint(&self.owner, &self.link) {
            Some(endpoint) if endpoint.connected => endpoint.partner.clone(),
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "channel not open yet",
                ));
            }
            None => None,
        };

        let Some((remote, remote_link)) = partner else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "channel closed"));
        };
        if hub.endpoint(&remote, &remote_link).is_none() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "remote end closed"));
        }

        hub.push(Envelope::Transport {
            to: remote,
            link: remote_link,
            event: TransportEvent::Data(frame),
        });
        Ok(())
    }

    fn close(&mut self) {
        let mut hub = self.hub.borrow_mut();
        let Some(endpoint) = hub.remove_endpoint(&self.owner, &self.link) else {
            return;
        };
        if let Some((remote, remote_link)) = endpoint.partner
            && hub.endpoint(&remote, &remote_link).is_some()
        {
            hub.push(Envelope::Transport {
                to: remote,
                link: remote_link,
                event: TransportEvent::Close,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hub::Hub;

    fn drain(hub: &SharedHub) -> Vec<Envelope> {
        std::iter::from_fn(|| hub.borrow_mut().pop()).collect()
    }

    #[test]
    fn test_handshake_connects_both_ends() {
        let hub = Hub::shared();
        let a_link = LinkId::new("b", 1);
        let b_link = LinkId::new("a", 1);

        let mut a = MemoryTransportFactory::new("a", hub.clone()).open(&a_link, Role::Initiator);
        let offer = match drain(&hub).pop() {
            Some(Envelope::Transport {
                event: TransportEvent::Signal(signal),
                ..
            }) => signal,
            other => panic!("expected offer, got {:?}", other),
        };

        let mut b = MemoryTransportFactory::new("b", hub.clone()).open(&b_link, Role::Responder);
        b.signal(&offer);
        let answer = match drain(&hub).pop() {
            Some(Envelope::Transport {
                event: TransportEvent::Signal(signal),
                ..
            }) => signal,
            other => panic!("expected answer, got {:?}", other),
        };
        assert_eq!(answer.kind(), Some("answer"));

        a.signal(&answer);
        let connects = drain(&hub);
        assert_eq!(connects.len(), 2);

        a.send(vec![7]).unwrap();
        assert_eq!(
            drain(&hub),
            vec![Envelope::Transport {
                to: "b".to_string(),
                link: b_link.clone(),
                event: TransportEvent::Data(vec![7])
            }]
        );

        a.close();
        assert_eq!(
            drain(&hub),
            vec![Envelope::Transport {
                to: "b".to_string(),
                link: b_link,
                event: TransportEvent::Close
            }]
        );
        assert!(a.send(vec![1]).is_err());
    }

    #[test]
    fn test_send_before_connect_fails() {
        let hub = Hub::shared();
        let mut a = MemoryTransportFactory::new("a", hub).open(&LinkId::new("b", 1), Role::Initiator);
        let err = a.send(vec![1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
