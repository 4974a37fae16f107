//! workspace
//!
//! The single on-disk working copy of the remote content repository.
//!
//! # Architecture
//!
//! [`WorkingCopy`] owns the checkout under `<working_dir>/repo`. It clones
//! on first use, fast-forwards on later syncs, reads and atomically writes
//! documents, and can throw the whole checkout away and re-clone it.
//!
//! It does no locking of its own. Callers hold the repository's
//! [`OperationLock`](crate::core::ops::OperationLock) around every call.
//!
//! # Invariants
//!
//! - The local branch never merges or rebases; divergence is an error
//! - Document paths are validated before any filesystem access
//! - A write either fully replaces a document or leaves it untouched

mod copy;
pub mod site;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::content::ParseError;
use crate::git::GitError;

pub use copy::{SyncAction, SyncReport, WorkingCopy};

/// Failures bringing the working copy in line with the remote.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote rejected or demanded credentials.
    #[error("authentication with the remote failed: {0}")]
    Auth(String),

    /// The remote could not be reached.
    #[error("cannot reach the remote: {0}")]
    Network(String),

    /// The network deadline elapsed.
    #[error("timed out talking to the remote after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The remote has no such branch.
    #[error("remote has no branch '{0}'")]
    MissingBranch(String),

    /// The local branch cannot be fast-forwarded to the remote.
    #[error("working copy of '{branch}' cannot be fast-forwarded ({reason}); clear the cache to reset it")]
    Diverged {
        /// The configured branch
        branch: String,
        /// What blocked the fast-forward
        reason: String,
    },

    /// The checkout is not a site.
    #[error("not a valid site: {0}")]
    InvalidSite(String),

    /// Filesystem failure while preparing the checkout.
    #[error("cannot prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other Git failure.
    #[error(transparent)]
    Git(GitError),
}

impl From<GitError> for SyncError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::Auth { message } => SyncError::Auth(message),
            GitError::Network { message } => SyncError::Network(message),
            GitError::Timeout { after } => SyncError::Timeout(after),
            other => SyncError::Git(other),
        }
    }
}

/// Failures of document-level working copy operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The checkout could not be brought up to date.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The path failed validation.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No document at the path.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A document already exists at the path.
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// The document's frontmatter could not be parsed.
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    /// The document could not be read or written.
    #[error("cannot {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Git failure on an existing checkout.
    #[error(transparent)]
    Git(#[from] GitError),
}
