mod abort;
mod classify;
pub mod config;
mod details;
mod events;
mod filter;
mod grouper;
mod index;
mod model;
mod registry;
mod searcher;
mod walker;

pub use abort::AbortHandle;
pub use classify::{classify, disc_kind_of, is_excluded_dir, is_skipped_file, DirClass};
pub use common::{DiscKind, FileGroup, MediaItem, MediaKind, ScanRoot};
pub use details::{DetailLoader, FileDetails};
pub use events::{SearchEvents, SilentEvents};
pub use filter::{FileFilter, DEFAULT_VIDEO_PATTERNS};
pub use grouper::{group_parts, split_part_marker};
pub use index::{IndexBatch, MediaIndex};
pub use model::MediaModel;
pub use registry::DirectoryRegistry;
pub use searcher::{FileSearcher, ReloadStats, SearchPhase};
pub use walker::DirectoryWalker;

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Redb(redb::Error),
    Bincode(Box<bincode::ErrorKind>),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Redb(err) => write!(f, "db error: {}", err),
            LibraryError::Bincode(err) => write!(f, "bincode error: {}", err),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<redb::Error> for LibraryError {
    fn from(err: redb::Error) -> Self {
        LibraryError::Redb(err)
    }
}

impl From<redb::DatabaseError> for LibraryError {
    fn from(err: redb::DatabaseError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<redb::TableError> for LibraryError {
    fn from(err: redb::TableError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<redb::TransactionError> for LibraryError {
    fn from(err: redb::TransactionError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<redb::StorageError> for LibraryError {
    fn from(err: redb::StorageError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<redb::CommitError> for LibraryError {
    fn from(err: redb::CommitError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<Box<bincode::ErrorKind>> for LibraryError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        LibraryError::Bincode(err)
    }
}
