//! Traits describing the collaborators the target resolver depends on.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::domain::paths::CandidatePath;

/// Failures raised while mapping an action result onto a candidate path.
///
/// The target resolver hands these back to its caller untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("action path must not be empty")]
    EmptyAction,
    #[error("unknown result alias `<{alias}>`")]
    UnknownAlias { alias: String },
    #[error("unterminated result alias in `{input}`")]
    UnterminatedAlias { input: String },
}

/// Turns an action and its optional result into a candidate template path.
pub trait ResultPathResolver: Send + Sync {
    fn resolve_result_path(
        &self,
        action: &str,
        result: Option<&str>,
    ) -> Result<CandidatePath, MappingError>;
}

/// A probed path the store cannot interpret.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed content path `{path}`: {reason}")]
pub struct MalformedPath {
    pub path: String,
    pub reason: &'static str,
}

impl MalformedPath {
    pub fn new(path: impl Into<String>, reason: &'static str) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Malformed(#[from] MalformedPath),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only view over deployed templates.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Report whether `path` names a stored resource.
    async fn probe(&self, path: &str) -> Result<bool, MalformedPath>;

    /// Existence check used by the resolver. Malformed input counts as absent.
    async fn exists(&self, path: &str) -> bool {
        match self.probe(path).await {
            Ok(found) => found,
            Err(err) => {
                debug!(
                    target: "viewroute::content",
                    path,
                    reason = err.reason,
                    "malformed path treated as missing"
                );
                false
            }
        }
    }

    /// Load the stored resource, `Ok(None)` when it is gone.
    async fn open(&self, path: &str) -> Result<Option<Bytes>, StoreError>;
}
