use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

/// Directory of JSON documents, one file per key
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a key
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a document; `Ok(None)` when it has never been written
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let value = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!("corrupt document {}: {}", path.display(), e))
        })?;
        Ok(Some(value))
    }

    /// Write a document, replacing any previous version
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path(key);
        let content = serde_json::to_string_pretty(value)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Storage(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        // Write to a sibling file and rename so readers never see half a document
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Storage(format!("failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Delete a document; deleting a missing document is not an error
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
