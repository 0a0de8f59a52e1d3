//! Atomic file operations for crash-safe persistence.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Writes data to a file atomically.
///
/// Data goes to a temporary file in the target directory, which is then
/// renamed over the target. Readers never observe a partial file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source: std::io::Error| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Writes JSON data to a file atomically.
pub fn atomic_write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file, returning `None` if the file
/// doesn't exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&data)?))
}
