//! # Config Loader
//!
//! Locates and reads configuration files. Parsing is left to the caller.
//!
//! ```no_run
//! use config_loader::{ConfigSearch, load_config_file};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Search FILEMESH_CONFIG, ./config/filemesh.json, ./filemesh.json
//!     let content = ConfigSearch::new("filemesh.json")
//!         .env_var("FILEMESH_CONFIG")
//!         .load()?;
//!
//!     // Or read a known path
//!     let content = load_config_file("./config/filemesh.json")?;
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the whole file at `path` into a string.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Ordered list of places a configuration file may live.
///
/// Candidates are tried in this order:
/// 1. the path named by the configured environment variable, if set
/// 2. every extra directory added with [`ConfigSearch::dir`], in insertion order
/// 3. `./config/{filename}`
/// 4. `./{filename}`
#[derive(Debug, Clone)]
pub struct ConfigSearch {
    filename: String,
    env_var: Option<String>,
    dirs: Vec<PathBuf>,
}

impl ConfigSearch {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            env_var: None,
            dirs: Vec::new(),
        }
    }

    /// Environment variable holding an explicit path.
    pub fn env_var(mut self, name: &str) -> Self {
        self.env_var = Some(name.to_string());
        self
    }

    /// Extra directory searched before the defaults.
    pub fn dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Every path that would be tried, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(var) = &self.env_var
            && let Ok(path) = env::var(var)
        {
            paths.push(PathBuf::from(path));
        }
        for dir in &self.dirs {
            paths.push(dir.join(&self.filename));
        }
        paths.push(PathBuf::from("./config").join(&self.filename));
        paths.push(PathBuf::from("./").join(&self.filename));
        paths
    }

    /// First existing candidate.
    pub fn find(&self) -> Result<PathBuf> {
        let candidates = self.candidates();
        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| {
                let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
                ConfigError::FileNotFound(format!(
                    "'{}' (searched: {})",
                    self.filename,
                    tried.join(", ")
                ))
            })
    }

    /// Finds the first existing candidate and reads it.
    pub fn load(&self) -> Result<String> {
        load_config_file(self.find()?)
    }
}
