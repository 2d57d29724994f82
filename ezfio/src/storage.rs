//! The storage layer: record keys, the per-key lock table and filesystem primitives.
//!
//! An EZFIO store is a directory tree:
//! ```text
//! - <root>/
//!   - .version            format version marker of the root
//!   - ezfio/
//!     - .version
//!     - creation          scalar records are plain text files
//!     - user
//!     - library
//!   - nuclei/
//!     - .version
//!     - nucl_num
//!     - nucl_coord.gz     array records are gzip compressed text files
//! ```
//! A root or section exists if and only if its `.version` marker can be read.

mod filesystem;
mod key_locks;
mod record_key;

use thiserror::Error;

pub use filesystem::{
    create_marked_dir, probe_file, read_file, read_version_marker, write_atomic, VERSION_MARKER,
};
pub use key_locks::{KeyLockGuard, KeyLocks};
pub use record_key::{RecordKey, RecordKeyError};

/// A storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write operation was attempted on a read only store.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An operation was attempted before the store root was set.
    #[error("the store root has not been set")]
    NotBound,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An invalid record key.
    #[error(transparent)]
    InvalidRecordKey(#[from] RecordKeyError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}
