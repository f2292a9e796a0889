//! File-backed key/value store.
//!
//! Each key maps to one file `<dir>/<key>.json`. Values are replaced whole
//! on every write: the new value goes to a sibling temp file which is then
//! renamed over the old one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const VALUE_EXTENSION: &str = "json";

/// Directory-backed string store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the value for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }

    /// Read the value stored under `key`, `None` when absent.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Replace the value stored under `key`.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let temp_path = path.with_extension(format!("{VALUE_EXTENSION}.tmp"));
        std::fs::write(&temp_path, value)?;
        if let Err(error) = std::fs::rename(&temp_path, &path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(error.into());
        }

        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    /// Delete the value stored under `key`. Missing keys are ignored.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = key.trim().is_empty()
        || key.contains(['/', '\\'])
        || key.starts_with('.');
    if invalid {
        return Err(Error::InvalidInput(format!("invalid storage key '{key}'")));
    }
    Ok(())
}
