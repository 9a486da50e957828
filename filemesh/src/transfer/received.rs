//! Completed inbound file

use crate::domain::PeerId;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A file fully reconstructed from a peer's chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub peer_id: PeerId,
    pub name: String,
    pub data: Vec<u8>,
}

impl ReceivedFile {
    /// Writes the file into `dir` under the last component of its name.
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let file_name = Path::new(&self.name)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unusable file name: {:?}", self.name),
                )
            })?;

        let path = dir.join(file_name);
        let mut file = File::create(&path)?;
        file.write_all(&self.data)?;
        file.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_strips_directories() {
        let dir = tempdir().unwrap();
        let file = ReceivedFile {
            peer_id: "bob".to_string(),
            name: "../../etc/passwd".to_string(),
            data: b"hello".to_vec(),
        };

        let path = file.save_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("passwd"));
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let file = ReceivedFile {
            peer_id: "bob".to_string(),
            name: "..".to_string(),
            data: Vec::new(),
        };
        assert!(file.save_to(dir.path()).is_err());
    }
}
