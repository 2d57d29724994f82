//! The EZFIO store handle.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;
use thiserror::Error;

use crate::{
    array::{Array, ArrayCreateError, ArrayShape},
    codec::{decode_array, decode_scalar, encode_array, encode_scalar, CodecError, GzipCodec},
    config::global_config,
    kind::RecordKind,
    storage::{
        create_marked_dir, probe_file, read_file, read_version_marker, write_atomic, KeyLockGuard,
        KeyLocks, RecordKey, RecordKeyError, StorageError,
    },
    value::{IncompatibleValueError, Scalar},
};

/// The section holding the store metadata records.
pub const METADATA_SECTION: &str = "ezfio";

/// An EZFIO store error.
#[derive(Debug, Error)]
pub enum EzfioError {
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// The record has not been written.
    #[error("record {0} is not set")]
    RecordNotSet(RecordKey),
    /// The variable is not in the catalogue.
    #[error("unknown variable {0}")]
    UnknownVariable(String),
    /// A value is not compatible with the kind or shape of a variable.
    #[error(transparent)]
    KindMismatch(#[from] IncompatibleValueError),
    /// A value does not have the shape of the variable.
    #[error("invalid value for {0}: {1}")]
    InvalidShape(String, String),
    /// A governing value is not a valid array extent.
    #[error("{0} = {1} is not a valid array dimension")]
    InvalidDimension(String, String),
    /// The variable is derived from other records and cannot be written.
    #[error("{0} is derived from other records and cannot be written")]
    NotWritable(String),
}

impl From<RecordKeyError> for EzfioError {
    fn from(err: RecordKeyError) -> Self {
        Self::StorageError(StorageError::InvalidRecordKey(err))
    }
}

/// Options of an [`Ezfio`] handle.
#[derive(Clone, Debug, Default)]
pub struct EzfioOptions {
    read_only: bool,
}

impl EzfioOptions {
    /// Set the initial read only flag.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The initial read only flag.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

/// A handle to an EZFIO store.
///
/// The handle holds the bound root directory, the read only flag and the per-key lock table.
/// It is [`Sync`], so a single handle can be shared by reference between threads.
///
/// The low level record methods ([`read_scalar`](Ezfio::read_scalar), [`write_array`](Ezfio::write_array), ...)
/// do not lock; the variable accessors ([`get`](Ezfio::get), [`set`](Ezfio::set)) hold the
/// [record lock](Ezfio::lock_record) around them.
#[derive(Debug, Default)]
pub struct Ezfio {
    root: RwLock<Option<PathBuf>>,
    read_only: AtomicBool,
    locks: KeyLocks,
}

impl Ezfio {
    /// Create a new unbound handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new unbound handle with non-default options.
    #[must_use]
    pub fn with_options(options: &EzfioOptions) -> Self {
        Self {
            read_only: AtomicBool::new(options.read_only()),
            ..Self::default()
        }
    }

    /// Create a new handle bound to `root` with [`set_file`](Ezfio::set_file).
    ///
    /// # Errors
    /// See [`set_file`](Ezfio::set_file).
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EzfioError> {
        let ezfio = Self::new();
        ezfio.set_file(root)?;
        Ok(ezfio)
    }

    /// Bind the handle to `root`.
    ///
    /// If `root` has no `.version` marker, the root is created along with the metadata records
    /// `ezfio/creation`, `ezfio/user` and `ezfio/library`.
    /// The handle is bound even if initialisation fails.
    ///
    /// # Errors
    /// Returns [`StorageError::ReadOnly`] if the root must be created and the handle is read only, or an error
    /// if the root or its metadata cannot be written.
    pub fn set_file(&self, root: impl Into<PathBuf>) -> Result<(), EzfioError> {
        let root = root.into();
        *self.root.write() = Some(root.clone());
        if read_version_marker(&root)?.is_some() {
            tracing::debug!(root = %root.display(), "bound existing store");
            return Ok(());
        }

        self.check_writable()?;
        let (format_version, library) = {
            let config = global_config();
            (config.format_version().to_string(), config.library().to_string())
        };
        create_marked_dir(&root, &format_version)?;
        tracing::debug!(root = %root.display(), "created store");

        let creation = chrono::Utc::now()
            .format("%a %b %e %H:%M:%S UTC %Y")
            .to_string();
        let user = std::env::var("USER").unwrap_or_default();
        for (name, value) in [("creation", creation), ("user", user), ("library", library)] {
            let key = RecordKey::new(METADATA_SECTION, name)?;
            self.write_scalar(&key, RecordKind::Character, value.into())?;
        }
        Ok(())
    }

    /// The bound root, if any.
    #[must_use]
    pub fn filename(&self) -> Option<PathBuf> {
        self.root.read().clone()
    }

    /// The bound root.
    ///
    /// # Errors
    /// Returns [`StorageError::NotBound`] if [`set_file`](Ezfio::set_file) has not been called.
    pub fn root_path(&self) -> Result<PathBuf, StorageError> {
        self.root.read().clone().ok_or(StorageError::NotBound)
    }

    /// Set the read only flag. A read only handle rejects every write with [`StorageError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// The read only flag.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only() {
            Err(StorageError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Returns true if `dir` has a readable `.version` marker.
    ///
    /// # Errors
    /// Returns [`StorageError::IOError`] if the marker exists but cannot be read.
    pub fn exists(&self, dir: &Path) -> Result<bool, StorageError> {
        Ok(read_version_marker(dir)?.is_some())
    }

    /// Acquire the lock of the record `key`.
    ///
    /// The lock is released when the guard is dropped.
    pub fn lock_record(&self, key: &RecordKey) -> KeyLockGuard {
        self.locks.acquire(&key.to_string())
    }

    /// Returns the path of `section`, creating the section if it does not exist.
    ///
    /// The existence check and creation are serialised by the lock of the section.
    ///
    /// # Errors
    /// Returns [`StorageError::ReadOnly`] if the section must be created and the handle is read only,
    /// [`StorageError::NotBound`] if the handle is not bound, or an IO error.
    pub fn section_path(&self, section: &str) -> Result<PathBuf, StorageError> {
        let path = self.root_path()?.join(section);
        let _lock = self.locks.acquire(section);
        if !self.exists(&path)? {
            self.check_writable()?;
            create_marked_dir(&path, global_config().format_version())?;
            tracing::debug!(section, "created section");
        }
        Ok(path)
    }

    fn scalar_path(&self, key: &RecordKey) -> Result<PathBuf, StorageError> {
        Ok(self.root_path()?.join(key.section()).join(key.name()))
    }

    fn array_path(&self, key: &RecordKey) -> Result<PathBuf, StorageError> {
        Ok(self
            .root_path()?
            .join(key.section())
            .join(key.array_file_name()))
    }

    /// Read the scalar record `key` of `kind`.
    ///
    /// # Errors
    /// Returns [`EzfioError::RecordNotSet`] if the record file does not exist, a [`CodecError`] if it cannot be
    /// decoded, or a [`StorageError`].
    pub fn read_scalar(&self, key: &RecordKey, kind: RecordKind) -> Result<Scalar, EzfioError> {
        let bytes = read_file(&self.scalar_path(key)?)?
            .ok_or_else(|| EzfioError::RecordNotSet(key.clone()))?;
        Ok(decode_scalar(kind, &bytes)?)
    }

    /// Write the scalar record `key` of `kind`, creating its section if needed.
    ///
    /// # Errors
    /// Returns [`EzfioError::KindMismatch`] if `value` cannot be represented as `kind`, or a [`StorageError`].
    pub fn write_scalar(
        &self,
        key: &RecordKey,
        kind: RecordKind,
        value: Scalar,
    ) -> Result<(), EzfioError> {
        self.check_writable()?;
        let value = value.coerce(kind)?;
        let path = self.section_path(key.section())?.join(key.name());
        write_atomic(&path, &encode_scalar(&value))?;
        tracing::debug!(%key, "wrote scalar");
        Ok(())
    }

    /// Read the array record `key` of `kind`, which must have `shape`.
    ///
    /// # Errors
    /// Returns
    ///  - [`EzfioError::RecordNotSet`] if the record file does not exist,
    ///  - [`CodecError::RankMismatch`] or [`CodecError::ShapeMismatch`] if the stored header disagrees with `shape`,
    ///  - another [`CodecError`] if the record cannot be decoded, or a [`StorageError`].
    pub fn read_array(
        &self,
        key: &RecordKey,
        kind: RecordKind,
        shape: &[usize],
    ) -> Result<Array, EzfioError> {
        let bytes = read_file(&self.array_path(key)?)?
            .ok_or_else(|| EzfioError::RecordNotSet(key.clone()))?;
        Ok(decode_array(
            kind,
            bytes,
            shape.len(),
            shape,
            &GzipCodec::default(),
        )?)
    }

    /// Write the array record `key`, creating its section if needed.
    ///
    /// # Errors
    /// Returns a [`StorageError`], or a [`CodecError`] if compression fails.
    pub fn write_array(&self, key: &RecordKey, array: &Array) -> Result<(), EzfioError> {
        self.check_writable()?;
        let gzip = GzipCodec::from(global_config().gzip_compression_level());
        let bytes = encode_array(array, &gzip)?;
        let path = self.section_path(key.section())?.join(key.array_file_name());
        write_atomic(&path, &bytes)?;
        tracing::debug!(%key, shape = ?array.shape(), "wrote array");
        Ok(())
    }

    /// Write the array record `key` of `kind` and `shape` from elements in storage order.
    ///
    /// # Errors
    /// Returns [`EzfioError::InvalidShape`] if the number of elements is not the product of `shape`,
    /// [`EzfioError::KindMismatch`] if an element cannot be represented as `kind`, or see
    /// [`write_array`](Ezfio::write_array).
    pub fn write_array_elements(
        &self,
        key: &RecordKey,
        kind: RecordKind,
        shape: ArrayShape,
        elements: Vec<Scalar>,
    ) -> Result<(), EzfioError> {
        let array = Array::new(kind, shape, elements).map_err(|err| match err {
            ArrayCreateError::IncompatibleElement(err) => EzfioError::KindMismatch(err),
            err => EzfioError::InvalidShape(key.to_string(), err.to_string()),
        })?;
        self.write_array(key, &array)
    }

    /// Returns true if the scalar record `key` can be read.
    ///
    /// Takes no lock and never creates the section.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the handle is not bound or the record exists but cannot be opened.
    pub fn has_scalar(&self, key: &RecordKey) -> Result<bool, StorageError> {
        probe_file(&self.scalar_path(key)?)
    }

    /// Returns true if the array record `key` can be read.
    ///
    /// Takes no lock and never creates the section.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the handle is not bound or the record exists but cannot be opened.
    pub fn has_array(&self, key: &RecordKey) -> Result<bool, StorageError> {
        probe_file(&self.array_path(key)?)
    }
}
