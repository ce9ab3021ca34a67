use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// String-keyed value storage underneath [`crate::storage::Store`].
///
/// Keys look like `lots_<userId>`; values are JSON documents. Implementations
/// only need single-key atomicity.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileBackend {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            quota_bytes: None,
        }
    }

    /// Cap the total size of all stored values.
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys carry user ids, which may contain path separators.
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }

    fn stored_bytes_except(&self, skip: &Path) -> io::Result<u64> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut total = 0;
        for entry in entries {
            let path = entry?.path();
            if path == skip || path.extension().map(|ext| ext != "json").unwrap_or(true) {
                continue;
            }
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::backend(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(limit) = self.quota_bytes {
            let others = self
                .stored_bytes_except(&path)
                .map_err(|e| StorageError::backend(key, e))?;
            if others + value.len() as u64 > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }

        fs::create_dir_all(&self.root).map_err(|e| StorageError::backend(key, e))?;
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| StorageError::backend(key, e))?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::backend(key, e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::backend(key, e))?;
        tracing::debug!(key, bytes = value.len(), "wrote value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::backend(key, e)),
        }
    }
}
