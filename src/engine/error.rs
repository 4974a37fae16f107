//! engine::error
//!
//! The engine's error type and its machine-readable kinds.

use serde::Serialize;
use thiserror::Error;

use crate::content::{EditError, ParseError};
use crate::core::config::ConfigError;
use crate::core::ops::LockError;
use crate::publish::PublishError;
use crate::workspace::{SyncError, WorkspaceError};

/// Category of an [`EngineError`], for callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Malformed path, disallowed location, or invalid edit
    Validation,
    NotFound,
    AlreadyExists,
    /// Corrupt frontmatter; the document was not modified
    Parse,
    /// The working copy could not be synchronized; retry later
    Sync,
    /// The remote rejected a push; resync before retrying
    PublishConflict,
    /// Another operation holds the lock
    Busy,
    /// Filesystem or Git internals
    Storage,
    /// Misconfiguration, including a protected publish branch
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not-found",
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::Parse => "parse",
            ErrorKind::Sync => "sync",
            ErrorKind::PublishConflict => "publish-conflict",
            ErrorKind::Busy => "busy",
            ErrorKind::Storage => "storage",
            ErrorKind::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A path or edit failed validation.
    #[error("{0}")]
    Validation(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem or Git failure on the working copy.
    #[error("{0}")]
    Storage(String),
}

impl EngineError {
    /// The category callers branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            EngineError::Parse { .. } => ErrorKind::Parse,
            EngineError::Sync(SyncError::Git(_) | SyncError::Io { .. }) => ErrorKind::Storage,
            EngineError::Sync(_) => ErrorKind::Sync,
            EngineError::Publish(PublishError::Conflict { .. }) => ErrorKind::PublishConflict,
            EngineError::Publish(PublishError::ProtectedBranch(_)) => ErrorKind::Config,
            EngineError::Publish(PublishError::Push(_)) => ErrorKind::Sync,
            EngineError::Publish(_) => ErrorKind::Storage,
            EngineError::Lock(LockError::Busy) => ErrorKind::Busy,
            EngineError::Lock(_) => ErrorKind::Storage,
            EngineError::Config(_) => ErrorKind::Config,
            EngineError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<WorkspaceError> for EngineError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::Sync(e) => EngineError::Sync(e),
            WorkspaceError::InvalidPath(reason) => EngineError::Validation(reason),
            WorkspaceError::NotFound(path) => EngineError::NotFound(path),
            WorkspaceError::AlreadyExists(path) => EngineError::AlreadyExists(path),
            WorkspaceError::Parse { path, source } => EngineError::Parse { path, source },
            other @ (WorkspaceError::Io { .. } | WorkspaceError::Git(_)) => {
                EngineError::Storage(other.to_string())
            }
        }
    }
}

impl From<EditError> for EngineError {
    fn from(err: EditError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
