//! Files held by this node

use crate::domain::FileEntry;
use crate::transfer::MAX_NAME_LEN;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Random-access read handle on a shared file.
pub trait FileSource {
    /// Current length in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Reads into `buf` starting at `offset`; returns the number of bytes read.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// File content handed over by the UI.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    data: Vec<u8>,
}

impl MemoryFile {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl FileSource for MemoryFile {
    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}

/// A file on disk, reopened for every read.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
}

impl DiskFile {
    /// Fails unless `path` is an existing regular file.
    pub fn open(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Not a file"));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the file is advertised under.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

impl FileSource for DiskFile {
    fn size(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }
}

/// A shared file: its handle plus the size captured when it was added.
#[derive(Clone)]
pub struct LocalFile {
    source: Rc<dyn FileSource>,
    size: u64,
}

impl LocalFile {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source(&self) -> Rc<dyn FileSource> {
        Rc::clone(&self.source)
    }
}

/// Name-keyed set of shared files.
///
/// Request handlers consult this set at the moment a request arrives, so a
/// file added after a connection was set up is still served.
#[derive(Clone, Default)]
pub struct LocalFileSet {
    files: BTreeMap<String, LocalFile>,
}

impl LocalFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `name`; returns its size.
    ///
    /// Names that are empty or too long to fit in a chunk frame are refused.
    pub fn insert(&mut self, name: &str, source: Rc<dyn FileSource>) -> io::Result<u64> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("File name must be 1 to {} bytes", MAX_NAME_LEN),
            ));
        }
        let size = source.size()?;
        self.files
            .insert(name.to_string(), LocalFile { source, size });
        Ok(size)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&LocalFile> {
        self.files.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Name and size of every file, ordered by name.
    pub fn entries(&self) -> Vec<FileEntry> {
        self.files
            .iter()
            .map(|(name, file)| FileEntry {
                name: name.clone(),
                size: file.size,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
