//! # FileMesh
//!
//! Peer-to-peer file sharing core. Peers meet through a signaling relay,
//! open one transport channel per pair, exchange their shared-file lists and
//! stream files to each other in 64 KiB chunks.
//!
//! ## Public API
//!
//! - **`FileMeshNode`** - One participant: feed it relay and transport events,
//!   poll it for `MeshEvent`s
//! - **`LocalMesh`** - Runs several nodes in-process over an in-memory relay
//!   and transport
//! - **`TransportChannel`** / **`TransportFactory`** - Seam to a real transport
//! - **`SignalingSink`** - Seam to a real relay connection
//! - **`MeshConfig`** - Transfer and logging configuration
//!
//! ## Example Usage
//!
//! ```
//! use filemesh::{LocalMesh, MeshEvent, TransferConfig};
//! use logging::Logger;
//!
//! let mut mesh = LocalMesh::new(TransferConfig::default(), &Logger::disabled());
//! mesh.add_peer("alice");
//! mesh.add_peer("bob");
//! mesh.run_until_idle();
//!
//! mesh.node_mut("alice").unwrap().share_bytes("notes.txt", b"hi".to_vec()).unwrap();
//! mesh.run_until_idle();
//!
//! let bob = mesh.node_mut("bob").unwrap();
//! assert!(bob.catalog().get("alice", "notes.txt").is_some());
//! bob.request_file("notes.txt", "alice").unwrap();
//! mesh.run_until_idle();
//!
//! let received = mesh
//!     .node_mut("bob")
//!     .unwrap()
//!     .drain_events()
//!     .into_iter()
//!     .any(|e| matches!(e, MeshEvent::FileReceived { ref file, .. } if file.data == b"hi"));
//! assert!(received);
//! ```

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod node;
pub mod orchestrator;
pub mod registry;
pub mod signaling;
pub mod sim;
pub mod transfer;
pub mod transport;

pub use catalog::{Catalog, DiskFile, FileSource, LocalFileSet, MemoryFile};
pub use config::{LoggingConfig, MeshConfig, TransferConfig};
pub use domain::{
    ConnectionState, FileDescriptor, FileEntry, LinkId, NodeStatus, PeerId, Role,
    generate_peer_id,
};
pub use error::{MeshError, Result};
pub use event::MeshEvent;
pub use node::FileMeshNode;
pub use signaling::{RelayCommand, RelayEvent, SignalingSink};
pub use sim::LocalMesh;
pub use transfer::{CHUNK_SIZE, ReceivedFile};
pub use transport::{Signal, TransportChannel, TransportEvent, TransportFactory};
