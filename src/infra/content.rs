//! Content store adapters backing template existence checks and dispatch.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use crate::{
    application::ports::{ContentStore, MalformedPath, StoreError},
    domain::paths::PATH_SEPARATOR,
    util::lock::{read_recovering, write_recovering},
};

const MEMORY_STORE: &str = "infra::content::MemoryStore";

/// Templates deployed as files under a root directory.
///
/// Store paths are `/`-separated and relative to the root; a leading `/` is
/// ignored. Paths that could escape the root or name a directory are
/// malformed.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &str) -> Result<PathBuf, MalformedPath> {
        let relative = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
        if relative.is_empty() {
            return Err(MalformedPath::new(path, "path is empty"));
        }
        if relative.ends_with(PATH_SEPARATOR) {
            return Err(MalformedPath::new(path, "path names a directory"));
        }
        if relative.contains(['\0', '\\']) {
            return Err(MalformedPath::new(path, "path contains a forbidden character"));
        }

        let mut located = self.root.clone();
        for segment in relative.split(PATH_SEPARATOR) {
            match segment {
                "" => return Err(MalformedPath::new(path, "path has an empty segment")),
                "." | ".." => {
                    return Err(MalformedPath::new(path, "path has a relative segment"));
                }
                segment => located.push(segment),
            }
        }
        Ok(located)
    }
}

#[async_trait]
impl ContentStore for DirectoryStore {
    async fn probe(&self, path: &str) -> Result<bool, MalformedPath> {
        let file = self.locate(path)?;
        let found = matches!(tokio::fs::metadata(&file).await, Ok(meta) if meta.is_file());
        trace!(path, file = %file.display(), found, "probed template");
        Ok(found)
    }

    async fn open(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        let file = self.locate(path)?;
        match tokio::fs::read(&file).await {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Templates held in memory, keyed by their exact store path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.insert(path, body);
        self
    }

    pub fn insert(&self, path: impl Into<String>, body: impl Into<Bytes>) {
        write_recovering(&self.entries, MEMORY_STORE, "insert").insert(path.into(), body.into());
    }

    pub fn remove(&self, path: &str) -> Option<Bytes> {
        write_recovering(&self.entries, MEMORY_STORE, "remove").remove(path)
    }

    pub fn len(&self) -> usize {
        read_recovering(&self.entries, MEMORY_STORE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_memory_path(path: &str) -> Result<(), MalformedPath> {
    if path.is_empty() {
        return Err(MalformedPath::new(path, "path is empty"));
    }
    if path.contains('\0') {
        return Err(MalformedPath::new(path, "path contains a forbidden character"));
    }
    Ok(())
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn probe(&self, path: &str) -> Result<bool, MalformedPath> {
        check_memory_path(path)?;
        Ok(read_recovering(&self.entries, MEMORY_STORE, "probe").contains_key(path))
    }

    async fn open(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        check_memory_path(path)?;
        Ok(read_recovering(&self.entries, MEMORY_STORE, "open")
            .get(path)
            .cloned())
    }
}
