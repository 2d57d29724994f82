//! Filesystem primitives for the store: reads, probes and atomic writes.

use std::{
    fs::File,
    io::{ErrorKind, Read, Write},
    path::Path,
};

use super::StorageError;

/// The name of the marker file evidencing the existence of a store root or section.
pub const VERSION_MARKER: &str = ".version";

/// Read the whole file at `path`.
///
/// Returns [`None`] if the file does not exist.
///
/// # Errors
/// Returns [`StorageError::IOError`] if the file exists but cannot be read.
pub fn read_file(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            if err.kind() == ErrorKind::NotFound {
                return Ok(None);
            }
            return Err(err.into());
        }
    };
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(Some(buffer))
}

/// Returns true if the file at `path` can be opened for reading.
///
/// # Errors
/// Returns [`StorageError::IOError`] if opening fails for any reason other than the file being absent.
pub fn probe_file(path: &Path) -> Result<bool, StorageError> {
    match File::open(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Write `value` to `path` atomically.
///
/// The value is written to a temporary sibling `.<name>.tmp-<random>` and then renamed over `path`,
/// so a reader never observes a partially written file under its real name.
/// The temporary file is removed if any step fails.
/// The file is created with the permissions of a plain new file (`0666` less the umask on unix).
///
/// # Errors
/// Returns [`StorageError::IOError`] if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, value: &[u8]) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::Other(format!("{} has no parent", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = format!(".{file_name}.tmp-");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix);
    // Records are shared like plain files: 0666 less the umask.
    #[cfg(unix)]
    builder.permissions(std::os::unix::fs::PermissionsExt::from_mode(0o666));
    let mut file = builder.tempfile_in(parent)?;
    file.write_all(value)?;
    file.as_file().sync_data()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Read the format version from the `.version` marker in `dir`.
///
/// Returns [`None`] if the marker does not exist.
///
/// # Errors
/// Returns [`StorageError::IOError`] if the marker exists but cannot be read.
pub fn read_version_marker(dir: &Path) -> Result<Option<String>, StorageError> {
    Ok(read_file(&dir.join(VERSION_MARKER))?
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string()))
}

/// Create `dir` if needed and write its `.version` marker.
///
/// A failure to create the directory because it already exists (for example, when another caller won a race
/// to create it) is ignored.
///
/// # Errors
/// Returns [`StorageError::IOError`] if the directory cannot be created or the marker cannot be written.
pub fn create_marked_dir(dir: &Path, version: &str) -> Result<(), StorageError> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        if err.kind() == ErrorKind::AlreadyExists && dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "directory created concurrently");
        } else {
            return Err(err.into());
        }
    }
    write_atomic(&dir.join(VERSION_MARKER), format!("{version}\n").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn read_write_atomic() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("value");
        assert_eq!(read_file(&path)?, None);
        assert!(!probe_file(&path)?);

        write_atomic(&path, b"first\n")?;
        assert_eq!(read_file(&path)?, Some(b"first\n".to_vec()));
        write_atomic(&path, b"second\n")?;
        assert_eq!(read_file(&path)?, Some(b"second\n".to_vec()));
        assert!(probe_file(&path)?);

        // No temporary files are left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
        assert_eq!(entries.len(), 1);
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    #[cfg_attr(miri, ignore)]
    fn write_atomic_permissions() -> Result<(), Box<dyn Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new()?;
        let plain = dir.path().join("plain");
        std::fs::write(&plain, b"x")?;
        let record = dir.path().join("record");
        write_atomic(&record, b"x")?;
        let mode = |path: &Path| -> std::io::Result<u32> {
            Ok(std::fs::metadata(path)?.permissions().mode() & 0o777)
        };
        assert_eq!(mode(&record)?, mode(&plain)?);
        // Overwriting keeps the mode of a plain file.
        write_atomic(&record, b"y")?;
        assert_eq!(mode(&record)?, mode(&plain)?);
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn write_atomic_missing_dir() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("missing").join("value");
        assert!(matches!(
            write_atomic(&path, b"x"),
            Err(StorageError::IOError(_))
        ));
        assert!(!dir.path().join("missing").exists());
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn version_marker() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::TempDir::new()?;
        let section = dir.path().join("section");
        assert_eq!(read_version_marker(&section)?, None);
        create_marked_dir(&section, "2.0.7")?;
        assert_eq!(read_version_marker(&section)?.as_deref(), Some("2.0.7"));
        // Creating again is benign.
        create_marked_dir(&section, "2.0.7")?;
        assert_eq!(
            std::fs::read_to_string(section.join(VERSION_MARKER))?,
            "2.0.7\n"
        );
        Ok(())
    }
}
