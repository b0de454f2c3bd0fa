//! One-file-per-key store on the local filesystem.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::store::KeyValueStore;

const RECORD_EXTENSION: &str = "json";

/// Stores each key as `<root>/<sanitized key>.json`.
///
/// Each write goes to its own uniquely named temp file in the same directory
/// and is renamed into place, so a reader never sees a half-written record
/// and concurrent writers never share a temp file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("File store opened at {}", root.display());
        Ok(Self { root })
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{RECORD_EXTENSION}", sanitize_key(key)))
    }
}

/// Maps a key onto a portable file stem: `,` becomes `_` and anything other
/// than ASCII alphanumerics, `-` and `_` becomes `~`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            ',' => '_',
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
            _ => '~',
        })
        .collect()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_data()?;
        // Replaces an existing record; the temp file is removed on failure.
        tmp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    }
}
