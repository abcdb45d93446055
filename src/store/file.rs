//! Filesystem-backed key-value store
//!
//! Each key maps to one file inside the store directory. Writes go to a
//! temporary sibling first and are renamed into place, so a reader never sees
//! a partially written record.

use directories::ProjectDirs;
use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use super::{validate_key, KeyValueStore, StoreError};

/// Stores values as files in an XDG-compliant data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where value files are stored
    dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the default data directory
    ///
    /// Uses `~/.local/share/mealday/` on Linux, or the equivalent platform path.
    /// Returns `None` if no home directory can be determined.
    pub fn new() -> Option<Self> {
        Self::default_dir().map(Self::with_dir)
    }

    /// Returns the default data directory, if one can be determined
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "mealday")?;
        Some(project_dirs.data_dir().to_path_buf())
    }

    /// Creates a FileStore rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the value files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.tmp", key))
    }

    async fn read_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        match fs::read_to_string(self.value_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir).await?;

        let temp = self.temp_path(key);
        fs::write(&temp, value).await?;
        if let Err(e) = fs::rename(&temp, self.value_path(key)).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!(key, error = %cleanup, "failed to remove temporary file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        match fs::remove_file(self.value_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>> {
        Box::pin(self.read_value(key))
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(self.write_value(key, value))
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(self.remove_value(key))
    }
}
