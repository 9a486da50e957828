use filemesh::{LocalMesh, MeshConfig, MeshEvent, PeerId, TransferConfig};
use logging::Logger;
use std::path::PathBuf;

const PEER_COUNT: usize = 3;

fn main() {
    println!("FileMesh - Starting local mesh...");

    // Load configuration
    let config = load_config();

    // Initialize logger
    let logger = initialize_logger(&config);
    logger.info("FileMesh demo starting...");

    let files: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    run_demo(&config.transfer, &files, &logger);
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &MeshConfig) -> Logger {
    match config.init_logger("Main") {
        Ok(logger) => {
            if config.logging.enable_file {
                println!(
                    "Logging initialized: {} (level: {})",
                    config.logging.log_file_path, config.logging.log_level
                );
            }
            logger
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            std::process::exit(1);
        }
    }
}

/// Loads configuration from the usual locations or returns default values
fn load_config() -> MeshConfig {
    match MeshConfig::find_and_load() {
        Ok(config) => {
            println!("Configuration loaded");
            config
        }
        Err(e) => {
            eprintln!("No configuration loaded ({}), using default values", e);
            MeshConfig::default()
        }
    }
}

/// Shares `files` from the first peer and downloads each on the others.
fn run_demo(transfer: &TransferConfig, files: &[PathBuf], logger: &Logger) {
    let mut mesh = LocalMesh::new(transfer.clone(), logger);
    let mut peers: Vec<PeerId> = Vec::with_capacity(PEER_COUNT);
    for _ in 0..PEER_COUNT {
        peers.push(mesh.add_generated_peer());
        mesh.run_until_idle();
    }

    let (owner, downloaders) = (peers[0].as_str(), &peers[1..]);
    let mut shared = Vec::new();
    if let Some(node) = mesh.node_mut(owner) {
        for path in files {
            match node.share_path(path) {
                Ok(name) => shared.push(name),
                Err(e) => eprintln!("Cannot share {}: {}", path.display(), e),
            }
        }
        if files.is_empty() {
            match node.share_bytes("hello.txt", b"Hello from FileMesh!\n".to_vec()) {
                Ok(_) => shared.push("hello.txt".to_string()),
                Err(e) => eprintln!("Cannot share sample file: {}", e),
            }
        }
    }
    mesh.run_until_idle();

    for peer in downloaders {
        let Some(node) = mesh.node_mut(peer) else {
            continue;
        };
        for name in &shared {
            if let Err(e) = node.request_file(name, owner) {
                eprintln!("{} cannot request '{}': {}", peer, name, e);
            }
        }
    }
    mesh.run_until_idle();

    for peer in &peers {
        let Some(node) = mesh.node_mut(peer) else {
            continue;
        };
        println!("[{}] {}", peer, node.status());
        for event in node.drain_events() {
            match event {
                MeshEvent::FileReceived { file, saved_to } => match saved_to {
                    Some(path) => println!(
                        "[{}] received '{}' ({} bytes) -> {}",
                        peer,
                        file.name,
                        file.data.len(),
                        path.display()
                    ),
                    None => println!(
                        "[{}] received '{}' ({} bytes)",
                        peer,
                        file.name,
                        file.data.len()
                    ),
                },
                MeshEvent::UploadAborted { peer_id, name, reason } => {
                    println!("[{}] upload of '{}' to {} aborted: {}", peer, name, peer_id, reason)
                }
                _ => {}
            }
        }
    }

    for peer in &peers {
        mesh.remove_peer(peer);
        mesh.run_until_idle();
    }
    logger.info("FileMesh demo finished");
}
