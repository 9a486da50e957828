//! What files exist where.
//!
//! [`LocalFileSet`] is the single, always-current record of what this node
//! shares. [`Catalog`] is the merged view of what connected peers share, and
//! [`CatalogSynchronizer`] keeps it in step with the connection lifecycle.

mod local_files;
mod synchronizer;
mod view;

pub use local_files::{DiskFile, FileSource, LocalFile, LocalFileSet, MemoryFile};
pub use synchronizer::CatalogSynchronizer;
pub use view::Catalog;
