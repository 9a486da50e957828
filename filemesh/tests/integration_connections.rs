//! Integration tests for connection orchestration
//!
//! Tests the peer connection lifecycle including:
//! - One connection per pair, whatever the join order
//! - Joiner-initiates role assignment
//! - Redundant relay deliveries
//! - Transport failures and stale channel events
//! - Loss of the signaling relay

use filemesh::{
    ConnectionState, LocalMesh, MeshEvent, NodeStatus, RelayEvent, Role, TransferConfig,
    TransportEvent,
};
use logging::{LogLevel, Logger};

fn mesh_with(peers: &[&str]) -> LocalMesh {
    let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
    for peer in peers {
        mesh.add_peer(peer);
        mesh.run_until_idle();
    }
    mesh
}

#[test]
fn test_every_pair_gets_exactly_one_connection() {
    let peers = ["p1", "p2", "p3", "p4", "p5"];
    let mesh = mesh_with(&peers);

    for (i, a) in peers.iter().enumerate() {
        let node = mesh.node(a).unwrap();
        assert_eq!(node.known_peers().len(), peers.len() - 1);
        assert_eq!(node.peers().len(), peers.len() - 1);
        assert_eq!(
            node.status(),
            NodeStatus::Connected {
                peers: peers.len() - 1
            }
        );

        for b in &peers[i + 1..] {
            assert_eq!(node.connection_state(b), Some(ConnectionState::Connected));
            assert_eq!(
                mesh.node(b).unwrap().connection_state(a),
                Some(ConnectionState::Connected)
            );
        }
    }
}

#[test]
fn test_joiner_is_initiator_towards_present_peers() {
    let mesh = mesh_with(&["first", "second", "third"]);

    let first = mesh.node("first").unwrap();
    let second = mesh.node("second").unwrap();
    let third = mesh.node("third").unwrap();

    assert_eq!(first.connection_role("second"), Some(Role::Responder));
    assert_eq!(first.connection_role("third"), Some(Role::Responder));
    assert_eq!(second.connection_role("first"), Some(Role::Initiator));
    assert_eq!(second.connection_role("third"), Some(Role::Responder));
    assert_eq!(third.connection_role("first"), Some(Role::Initiator));
    assert_eq!(third.connection_role("second"), Some(Role::Initiator));
}

#[test]
fn test_joins_without_settling_still_converge() {
    let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
    for peer in ["a", "b", "c"] {
        mesh.add_peer(peer);
        mesh.node_mut(peer)
            .unwrap()
            .share_bytes(&format!("{}.txt", peer), vec![0u8; peer.len()])
            .unwrap();
    }
    mesh.run_until_idle();

    for peer in ["a", "b", "c"] {
        let node = mesh.node(peer).unwrap();
        assert_eq!(node.peers().len(), 2);
        assert_eq!(node.catalog().len(), 2);
        for other in ["a", "b", "c"].into_iter().filter(|other| *other != peer) {
            assert!(node.catalog().get(other, &format!("{}.txt", other)).is_some());
        }
    }
}

#[test]
fn test_generated_peers_connect() {
    let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
    let first = mesh.add_generated_peer();
    let second = mesh.add_generated_peer();
    mesh.run_until_idle();

    assert_ne!(first, second);
    assert!(first.starts_with("peer_"));
    assert_eq!(mesh.node(&first).unwrap().peers(), vec![second.clone()]);
    assert_eq!(mesh.node(&second).unwrap().connection_role(&first), Some(Role::Initiator));
}

#[test]
fn test_repeated_relay_events_do_not_duplicate_connections() {
    let mut mesh = mesh_with(&["a", "b"]);
    let link_before = mesh.current_link("b", "a").unwrap();

    mesh.inject_relay_event(
        "b",
        RelayEvent::RosterSnapshot {
            peer_ids: vec!["a".to_string(), "b".to_string()],
        },
    );
    mesh.inject_relay_event(
        "a",
        RelayEvent::PeerJoined {
            peer_id: "b".to_string(),
        },
    );
    mesh.run_until_idle();

    let b = mesh.node("b").unwrap();
    assert_eq!(b.known_peers(), vec!["a".to_string()]);
    assert_eq!(b.connection_role("a"), Some(Role::Initiator));
    assert_eq!(mesh.current_link("b", "a"), Some(link_before));
    assert_eq!(mesh.node("a").unwrap().known_peers(), vec!["b".to_string()]);
}

#[test]
fn test_second_offer_reuses_existing_connection() {
    let mut mesh = mesh_with(&["a", "b"]);

    mesh.inject_relay_event(
        "a",
        RelayEvent::SignalRelayed {
            from_peer_id: "b".to_string(),
            signal: filemesh::Signal::new(serde_json::json!({"type": "offer", "sdp": "again"})),
        },
    );
    mesh.run_until_idle();

    let a = mesh.node("a").unwrap();
    assert_eq!(a.known_peers().len(), 1);
    assert_eq!(a.connection_state("b"), Some(ConnectionState::Connected));
    assert_eq!(
        mesh.node("b").unwrap().connection_state("a"),
        Some(ConnectionState::Connected)
    );
}

#[test]
fn test_transport_failure_purges_both_sides() {
    let mut mesh = mesh_with(&["a", "b", "c"]);
    mesh.node_mut("a").unwrap().drain_events();

    assert!(mesh.fail_link("a", "b"));
    mesh.run_until_idle();

    let a = mesh.node_mut("a").unwrap();
    assert_eq!(a.connection_state("b"), None);
    assert_eq!(a.connection_state("c"), Some(ConnectionState::Connected));
    assert_eq!(a.status(), NodeStatus::Connected { peers: 1 });
    assert!(a.drain_events().contains(&MeshEvent::PeerDisconnected {
        peer_id: "b".to_string(),
        state: ConnectionState::Failed,
    }));
    assert_eq!(mesh.node("b").unwrap().connection_state("a"), None);
}

#[test]
fn test_events_from_stale_link_are_ignored() {
    let mut mesh = mesh_with(&["a", "b"]);
    let old_link = mesh.current_link("b", "a").unwrap();

    mesh.fail_link("b", "a");
    mesh.run_until_idle();
    assert_eq!(mesh.node("b").unwrap().connection_state("a"), None);

    // The relay re-announces a, so b initiates a fresh connection.
    mesh.inject_relay_event(
        "b",
        RelayEvent::RosterSnapshot {
            peer_ids: vec!["a".to_string()],
        },
    );
    mesh.run_until_idle();

    let new_link = mesh.current_link("b", "a").unwrap();
    assert!(new_link.generation > old_link.generation);
    assert_eq!(
        mesh.node("b").unwrap().connection_state("a"),
        Some(ConnectionState::Connected)
    );

    mesh.inject_transport_event("b", &old_link, TransportEvent::Close);
    mesh.inject_transport_event("b", &old_link, TransportEvent::Error("late".to_string()));
    mesh.run_until_idle();

    assert_eq!(
        mesh.node("b").unwrap().connection_state("a"),
        Some(ConnectionState::Connected)
    );
}

#[test]
fn test_peer_leaving_closes_connections_everywhere() {
    let mut mesh = mesh_with(&["a", "b", "c"]);

    let removed = mesh.remove_peer("a").unwrap();
    mesh.run_until_idle();

    assert!(removed.known_peers().is_empty());
    for peer in ["b", "c"] {
        let node = mesh.node_mut(peer).unwrap();
        assert_eq!(node.connection_state("a"), None);
        assert_eq!(node.peers().len(), 1);
        assert!(node.drain_events().contains(&MeshEvent::PeerDisconnected {
            peer_id: "a".to_string(),
            state: ConnectionState::Closed,
        }));
    }
    assert_eq!(mesh.relay_roster(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn test_last_peer_leaving_returns_to_searching() {
    let mut mesh = mesh_with(&["a", "b"]);
    mesh.remove_peer("b");
    mesh.run_until_idle();

    assert_eq!(mesh.node("a").unwrap().status(), NodeStatus::Searching);
}

#[test]
fn test_relay_loss_keeps_existing_connections() {
    let (logger, capture) = Logger::memory(LogLevel::Info);
    let mut mesh = LocalMesh::new(TransferConfig::default(), &logger);
    mesh.add_peer("a");
    mesh.add_peer("b");
    mesh.run_until_idle();

    mesh.disconnect_relay("a");
    mesh.run_until_idle();

    let a = mesh.node_mut("a").unwrap();
    assert_eq!(a.status(), NodeStatus::SignalingUnavailable);
    assert_eq!(a.connection_state("b"), Some(ConnectionState::Connected));
    assert!(
        a.drain_events()
            .contains(&MeshEvent::StatusChanged(NodeStatus::SignalingUnavailable))
    );
    assert!(capture.contains_at(LogLevel::Error, "Signaling relay lost"));

    // A newcomer is never told about a, and a never learns about it.
    mesh.add_peer("c");
    mesh.run_until_idle();
    assert_eq!(mesh.node("c").unwrap().peers(), vec!["b".to_string()]);
    assert_eq!(mesh.node("a").unwrap().known_peers(), vec!["b".to_string()]);

    // Files still flow over the surviving connection.
    mesh.node_mut("a")
        .unwrap()
        .share_bytes("still.txt", b"up".to_vec())
        .unwrap();
    mesh.run_until_idle();
    assert!(
        mesh.node("b")
            .unwrap()
            .catalog()
            .get("a", "still.txt")
            .is_some()
    );
}

#[test]
fn test_malformed_relay_message_is_dropped() {
    let (logger, capture) = Logger::memory(LogLevel::Debug);
    let mut mesh = LocalMesh::new(TransferConfig::default(), &logger);
    mesh.add_peer("a");
    mesh.run_until_idle();

    let a = mesh.node_mut("a").unwrap();
    a.handle_relay_message(r#"{"type": "no-such-event"}"#);
    a.handle_relay_message(r#"{"type": "peer-joined", "peerID": "z"}"#);

    assert!(capture.contains_at(LogLevel::Warn, "Dropping relay message"));
    assert_eq!(a.status(), NodeStatus::PeerJoining);
    assert!(a.known_peers().is_empty());
}
