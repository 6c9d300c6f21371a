//! DiskStore
//!
//! One file per key inside a single flat directory.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};
use crate::key::validate_key;

/// Flat-directory object files
#[derive(Debug, Clone)]
pub struct DiskStore {
    /// Directory where object files live
    dir: PathBuf,
}

impl DiskStore {
    /// Point at `path` without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { dir: path.into() }
    }

    /// Open the store, creating the directory if it does not exist
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new(path);
        store.create_dir()?;
        Ok(store)
    }

    /// Create the directory if missing
    ///
    /// Any creation error other than "already exists as a directory" is
    /// returned to the caller (startup treats it as fatal).
    pub fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Create or overwrite the file for `key`
    ///
    /// Not atomic: the file is truncated and rewritten in place.
    pub fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
        validate_key(key)?;
        fs::write(self.path_for(key), data)?;
        Ok(())
    }

    /// Read the whole file for `key`
    ///
    /// Returns:
    /// - `Ok(bytes)`: file exists
    /// - `Err(NotFound)`: no such file
    /// - `Err(Io(_))`: anything else (permissions, not a directory, ...)
    pub fn read_file(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        match fs::read(self.path_for(key)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(VaultError::NotFound),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    /// Names of every regular file that is also a valid key
    ///
    /// Subdirectories, symlinks, non-UTF-8 names and names that would fail
    /// key validation are skipped with a warning.
    pub fn list_directory(&self) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;

            if !entry.file_type()?.is_file() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(file = ?raw, "Skipping file with non UTF-8 name");
                    continue;
                }
            };

            if validate_key(&name).is_err() {
                tracing::warn!(file = %name, "Skipping file whose name is not a valid key");
                continue;
            }

            keys.insert(name);
        }

        Ok(keys)
    }

    /// Full path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Get the storage directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
