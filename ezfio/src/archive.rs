//! Gzip compressed tar archives of stores, and batch edits of archived stores.
//!
//! A store travels between calculation steps as a `.tar.gz` archive holding the store directory under a single
//! top-level entry, [`DEFAULT_ENTRY`] by default.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use tar::{EntryType, Header};
use thiserror::Error;

use crate::{
    array::Nested,
    command::{CommandOutput, CommandRegistry},
    config::global_config,
    ezfio::{Ezfio, EzfioError},
    value::Value,
};

/// The name of the store directory inside a wavefunction archive.
pub const DEFAULT_ENTRY: &str = "aiida.ezfio";

/// An archive error.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A store error.
    #[error(transparent)]
    EzfioError(#[from] EzfioError),
    /// The archive does not hold the expected store directory.
    #[error("the archive has no store directory {0}")]
    MissingEntry(String),
}

impl From<walkdir::Error> for ArchiveError {
    fn from(err: walkdir::Error) -> Self {
        Self::IOError(err.into())
    }
}

/// Write the store at `root` to `writer` as a gzip compressed tar archive with the top-level directory `entry`.
///
/// Entries are written in sorted path order with zeroed ownership and timestamps, so the archive of a given
/// directory tree is deterministic. Symbolic links are skipped.
///
/// # Errors
/// Returns an IO error if the tree cannot be walked or read, or the archive cannot be written.
pub fn pack<W: Write>(root: &Path, entry: &str, writer: W) -> Result<W, ArchiveError> {
    let compression = Compression::new(global_config().gzip_compression_level().as_u32());
    let mut builder = tar::Builder::new(GzEncoder::new(writer, compression));
    builder.follow_symlinks(false);
    for dir_entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let dir_entry = dir_entry?;
        let Ok(relative) = dir_entry.path().strip_prefix(root) else {
            continue;
        };
        let path = Path::new(entry).join(relative);
        let metadata = dir_entry.metadata()?;
        let mut header = Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        if metadata.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, &path, std::io::empty())?;
        } else if metadata.is_file() {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(metadata.len());
            builder.append_data(&mut header, &path, File::open(dir_entry.path())?)?;
        } else {
            tracing::debug!(
                path = %dir_entry.path().display(),
                "skipping non-regular file during archive"
            );
        }
    }
    let writer = builder.into_inner()?.finish()?;
    tracing::debug!(root = %root.display(), entry, "packed store");
    Ok(writer)
}

/// Pack the store at `root` into an in-memory archive. See [`pack`].
///
/// # Errors
/// See [`pack`].
pub fn pack_to_vec(root: &Path, entry: &str) -> Result<Vec<u8>, ArchiveError> {
    pack(root, entry, Vec::new())
}

/// Extract a gzip compressed tar archive into `destination`.
///
/// Entries which would be written outside of `destination` are skipped.
///
/// # Errors
/// Returns an IO error if the archive is invalid or cannot be extracted.
pub fn unpack<R: Read>(reader: R, destination: &Path) -> Result<(), ArchiveError> {
    tar::Archive::new(GzDecoder::new(reader)).unpack(destination)?;
    tracing::debug!(destination = %destination.display(), "unpacked archive");
    Ok(())
}

/// An operation of a [wavefunction edit](edit_wavefunction).
#[derive(Clone, Debug, PartialEq)]
pub enum EditOperation {
    /// Read a variable (`<section>_<name>`).
    Get(String),
    /// Write a variable (`<section>_<name>`).
    Set(String, Nested),
}

/// The outcome of a [wavefunction edit](edit_wavefunction).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditOutcome {
    /// The values read by the `get` operations, in order.
    pub data: Vec<(String, Value)>,
    /// The repacked archive, if any `set` operation was applied.
    pub archive: Option<Vec<u8>>,
}

/// Apply `operations` in order to the store inside the wavefunction `archive`.
///
/// The archive is extracted into a temporary directory and the store under [`DEFAULT_ENTRY`] is opened.
/// Operations on variables without a matching command are skipped.
/// If any `set` operation was applied, the store is packed into a new archive.
///
/// # Errors
/// Returns [`ArchiveError::MissingEntry`] if the archive does not hold a store, or the first error of extracting,
/// of an operation or of repacking.
pub fn edit_wavefunction(
    archive: &[u8],
    operations: impl IntoIterator<Item = EditOperation>,
) -> Result<EditOutcome, ArchiveError> {
    let dir = tempfile::TempDir::new()?;
    unpack(archive, dir.path())?;
    let root = dir.path().join(DEFAULT_ENTRY);
    if !root.is_dir() {
        return Err(ArchiveError::MissingEntry(DEFAULT_ENTRY.to_string()));
    }

    let ezfio = Ezfio::open(&root)?;
    let registry = CommandRegistry::global();
    let mut outcome = EditOutcome::default();
    let mut changed = false;
    for operation in operations {
        match operation {
            EditOperation::Get(name) => {
                let Some(command) = registry.get(&format!("get_{name}")) else {
                    tracing::warn!(variable = %name, "skipping get of unknown variable");
                    continue;
                };
                if let CommandOutput::Value(value) = command.run(&ezfio, None)? {
                    outcome.data.push((name, value));
                }
            }
            EditOperation::Set(name, value) => {
                let Some(command) = registry.get(&format!("set_{name}")) else {
                    tracing::warn!(variable = %name, "skipping set of unknown variable");
                    continue;
                };
                command.run(&ezfio, Some(value))?;
                changed = true;
            }
        }
    }

    if changed {
        outcome.archive = Some(pack_to_vec(&root, DEFAULT_ENTRY)?);
    }
    Ok(outcome)
}
