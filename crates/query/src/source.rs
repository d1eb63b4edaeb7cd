use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::QueryError;

/// Backend that hands out the raw documents of a named collection.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn documents(&self, collection: &str) -> Result<Vec<Value>, QueryError>;

    /// Cheap reachability probe used by health checks.
    async fn ping(&self) -> Result<(), QueryError> {
        Ok(())
    }
}

/// Fixed in-memory collections. Unknown collections are empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, docs: Vec<Value>) -> Self {
        self.collections.insert(name.into(), docs);
        self
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn documents(&self, collection: &str) -> Result<Vec<Value>, QueryError> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}

/// Collections stored as JSON files on disk: `<root>/<collection>/*.json`.
///
/// A file holds either one document or an array of documents. Files are read
/// in file-name order. A missing collection directory is an empty collection.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, QueryError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(QueryError::InvalidCollection(collection.to_string()));
        }
        Ok(self.root.join(collection))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> QueryError {
    QueryError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn documents(&self, collection: &str) -> Result<Vec<Value>, QueryError> {
        let dir = self.collection_dir(collection)?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(collection, "collection directory missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut docs = Vec::new();
        for path in files {
            let raw = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
            let value: Value =
                serde_json::from_slice(&raw).map_err(|e| QueryError::Malformed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            match value {
                Value::Array(items) => docs.extend(items),
                other => docs.push(other),
            }
        }

        tracing::debug!(collection, count = docs.len(), "loaded content collection");
        Ok(docs)
    }

    async fn ping(&self) -> Result<(), QueryError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(QueryError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Err(QueryError::Unavailable(format!(
                "{}: {e}",
                self.root.display()
            ))),
        }
    }
}
