//! Integration tests for catalog synchronization
//!
//! Tests how shared-file lists spread through the mesh:
//! - Lists sent on connect, including to late joiners, in any join order
//! - Full replacement on every update
//! - Eviction when the owner disconnects

use filemesh::{FileDescriptor, LocalMesh, MeshEvent, TransferConfig};
use logging::Logger;

fn mesh_with(peers: &[&str]) -> LocalMesh {
    let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
    for peer in peers {
        mesh.add_peer(peer);
        mesh.run_until_idle();
    }
    mesh
}

fn share(mesh: &mut LocalMesh, peer: &str, name: &str, size: usize) {
    mesh.node_mut(peer)
        .unwrap()
        .share_bytes(name, vec![0u8; size])
        .unwrap();
}

const JOIN_ORDERS: [[&str; 3]; 6] = [
    ["a", "b", "c"],
    ["a", "c", "b"],
    ["b", "a", "c"],
    ["b", "c", "a"],
    ["c", "a", "b"],
    ["c", "b", "a"],
];

fn files_of(peer: &str) -> &'static [(&'static str, usize)] {
    match peer {
        "a" => &[("a1.txt", 10), ("a2.txt", 20)],
        "b" => &[("b1.txt", 30)],
        _ => &[("c1.txt", 40)],
    }
}

#[test]
fn test_three_peers_converge_on_each_others_files() {
    for order in JOIN_ORDERS {
        let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
        for peer in order {
            mesh.add_peer(peer);
            for (name, size) in files_of(peer) {
                share(&mut mesh, peer, name, *size);
            }
            mesh.run_until_idle();
        }

        let a = mesh.node("a").unwrap();
        assert_eq!(
            a.catalog().all(),
            vec![
                &FileDescriptor::new("b1.txt", 30, "b"),
                &FileDescriptor::new("c1.txt", 40, "c"),
            ],
            "join order {:?}",
            order
        );

        let b = mesh.node("b").unwrap();
        assert_eq!(b.catalog().len(), 3, "join order {:?}", order);
        assert_eq!(b.catalog().files_of("a").len(), 2);
        assert!(b.catalog().files_of("b").is_empty());

        let c = mesh.node("c").unwrap();
        assert_eq!(c.catalog().get("a", "a2.txt").map(|d| d.size), Some(20));
        assert_eq!(c.catalog().get("b", "b1.txt").map(|d| d.size), Some(30));
        assert!(c.catalog().files_of("c").is_empty());
    }
}

#[test]
fn test_late_joiner_receives_existing_lists() {
    let mut mesh = mesh_with(&["a", "b"]);
    share(&mut mesh, "a", "old.txt", 5);
    share(&mut mesh, "b", "older.txt", 6);
    mesh.run_until_idle();

    mesh.add_peer("late");
    mesh.run_until_idle();

    let late = mesh.node("late").unwrap();
    assert!(late.catalog().get("a", "old.txt").is_some());
    assert!(late.catalog().get("b", "older.txt").is_some());
}

#[test]
fn test_file_list_replaces_previous_subset() {
    let mut mesh = mesh_with(&["a", "b"]);
    share(&mut mesh, "a", "keep.txt", 1);
    share(&mut mesh, "a", "drop.txt", 2);
    mesh.run_until_idle();
    assert_eq!(mesh.node("b").unwrap().catalog().files_of("a").len(), 2);

    assert!(mesh.node_mut("a").unwrap().remove_local_file("drop.txt"));
    mesh.run_until_idle();

    let b = mesh.node("b").unwrap();
    assert_eq!(
        b.catalog().files_of("a"),
        vec![&FileDescriptor::new("keep.txt", 1, "a")]
    );

    assert!(mesh.node_mut("a").unwrap().remove_local_file("keep.txt"));
    mesh.run_until_idle();
    assert!(mesh.node("b").unwrap().catalog().is_empty());
}

#[test]
fn test_resharing_a_name_updates_its_size() {
    let mut mesh = mesh_with(&["a", "b"]);
    share(&mut mesh, "a", "doc.txt", 3);
    mesh.run_until_idle();
    share(&mut mesh, "a", "doc.txt", 300);
    mesh.run_until_idle();

    let b = mesh.node("b").unwrap();
    assert_eq!(b.catalog().len(), 1);
    assert_eq!(b.catalog().get("a", "doc.txt").map(|d| d.size), Some(300));
}

#[test]
fn test_same_name_from_two_owners_is_kept_apart() {
    let mut mesh = mesh_with(&["a", "b", "c"]);
    share(&mut mesh, "a", "report.pdf", 100);
    share(&mut mesh, "b", "report.pdf", 200);
    mesh.run_until_idle();

    let c = mesh.node("c").unwrap();
    assert_eq!(c.catalog().len(), 2);
    assert_eq!(
        c.catalog().owners_of("report.pdf"),
        vec![&"a".to_string(), &"b".to_string()]
    );
}

#[test]
fn test_departed_peer_is_evicted() {
    let mut mesh = mesh_with(&["a", "b", "c"]);
    share(&mut mesh, "a", "a.txt", 1);
    share(&mut mesh, "b", "b.txt", 1);
    mesh.run_until_idle();
    mesh.node_mut("c").unwrap().drain_events();

    mesh.remove_peer("a");
    mesh.run_until_idle();

    let c = mesh.node_mut("c").unwrap();
    assert!(c.catalog().files_of("a").is_empty());
    assert!(c.catalog().get("b", "b.txt").is_some());
    assert!(c.catalog().owners_of("a.txt").is_empty());

    let events = c.drain_events();
    assert!(events.contains(&MeshEvent::CatalogUpdated));
    assert!(
        events
            .iter()
            .all(|e| !matches!(e, MeshEvent::PeerConnected(_)))
    );
}

#[test]
fn test_failed_link_evicts_only_on_the_failed_pair() {
    let mut mesh = mesh_with(&["a", "b", "c"]);
    share(&mut mesh, "a", "a.txt", 1);
    mesh.run_until_idle();

    mesh.fail_link("a", "b");
    mesh.run_until_idle();

    assert!(mesh.node("b").unwrap().catalog().files_of("a").is_empty());
    assert!(mesh.node("c").unwrap().catalog().get("a", "a.txt").is_some());
}

#[test]
fn test_catalog_update_event_follows_remote_share() {
    let mut mesh = mesh_with(&["a", "b"]);
    mesh.node_mut("b").unwrap().drain_events();

    share(&mut mesh, "a", "new.txt", 9);
    mesh.run_until_idle();

    assert_eq!(
        mesh.node_mut("b").unwrap().drain_events(),
        vec![MeshEvent::CatalogUpdated]
    );
}

#[test]
fn test_shutdown_clears_remote_state() {
    let mut mesh = mesh_with(&["a", "b"]);
    share(&mut mesh, "b", "b.txt", 1);
    mesh.run_until_idle();

    let a = mesh.node_mut("a").unwrap();
    a.shutdown();
    assert!(a.catalog().is_empty());
    assert!(a.known_peers().is_empty());
    mesh.run_until_idle();

    assert!(mesh.node("b").unwrap().known_peers().is_empty());
}
