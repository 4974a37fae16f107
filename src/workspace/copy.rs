//! workspace::copy
//!
//! The working copy manager.
//!
//! # Sync Rules
//!
//! | Checkout state | `ensure_ready` | `ensure_present` |
//! |---|---|---|
//! | absent | clone | clone |
//! | leftover non-git directory | remove, clone | remove, clone |
//! | present, behind | fetch, fast-forward | untouched |
//! | present, diverged | `SyncError::Diverged` | untouched |

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{site, SyncError, WorkspaceError};
use crate::content::{self, ContentDocument};
use crate::core::config::{PathRule, RepositoryConfig};
use crate::core::paths::{WorkspacePaths, TEMP_PREFIX};
use crate::core::types::{BranchName, ContentPath, Oid, TypeError};
use crate::git::{FastForward, Git, GitError, RemoteOptions, REMOTE};

/// What a sync did to the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "action")]
pub enum SyncAction {
    /// A fresh clone was made.
    Cloned,
    /// The branch moved forward.
    Updated { from: Oid, to: Oid },
    /// Nothing to do.
    UpToDate,
    /// The local branch holds commits the remote lacks.
    Ahead,
}

/// State of the checkout after a sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub branch: BranchName,
    pub head: Oid,
    #[serde(flatten)]
    pub action: SyncAction,
    /// Uncommitted changes in the checkout
    pub pending_changes: usize,
}

/// The on-disk checkout of one remote repository.
#[derive(Debug)]
pub struct WorkingCopy {
    paths: WorkspacePaths,
    remote_url: String,
    branch: BranchName,
    remote: RemoteOptions,
    path_rule: Option<PathRule>,
}

impl WorkingCopy {
    /// Create a manager for the checkout described by `config`.
    ///
    /// Touches nothing on disk.
    pub fn new(config: &RepositoryConfig) -> Self {
        Self {
            paths: config.paths(),
            remote_url: config.remote_url.clone(),
            branch: config.branch.clone(),
            remote: RemoteOptions {
                credential: config.credential.clone(),
                timeout: config.network_timeout,
            },
            path_rule: config.path_rule.clone(),
        }
    }

    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Whether a checkout exists on disk.
    pub fn is_present(&self) -> bool {
        self.paths.has_checkout()
    }

    /// Open the existing checkout.
    pub fn open(&self) -> Result<Git, WorkspaceError> {
        Ok(Git::open(&self.paths.checkout_dir())?)
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Clone or fast-forward the checkout to the remote branch tip.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Auth`], [`SyncError::Network`], [`SyncError::Timeout`]
    ///   when the remote cannot be used
    /// - [`SyncError::Diverged`] when a fast-forward is impossible
    /// - [`SyncError::InvalidSite`] when the checkout is not a site
    pub fn ensure_ready(&self) -> Result<(Git, SyncReport), SyncError> {
        let git = match self.open_existing()? {
            Some(git) => git,
            None => return self.clone_fresh(),
        };

        self.check_remote(&git)?;

        debug!(branch = self.branch.as_str(), "fetching");
        let tip = git
            .fetch_branch(&self.branch, &self.remote)
            .map_err(|e| self.missing_branch(e))?;

        if git.current_branch()?.as_ref() != Some(&self.branch) {
            debug!(branch = self.branch.as_str(), "switching to configured branch");
            git.checkout_branch(&self.branch)
                .map_err(|e| self.blocked(e))?;
        }

        let action = match git
            .fast_forward(&self.branch, &tip)
            .map_err(|e| self.blocked(e))?
        {
            FastForward::UpToDate => SyncAction::UpToDate,
            FastForward::Advanced { from, to } => {
                info!(from = from.short(7), to = to.short(7), "working copy updated");
                SyncAction::Updated { from, to }
            }
            FastForward::Ahead => {
                warn!(
                    branch = self.branch.as_str(),
                    "working copy has commits the remote lacks"
                );
                SyncAction::Ahead
            }
            FastForward::Diverged => {
                return Err(SyncError::Diverged {
                    branch: self.branch.to_string(),
                    reason: "local and remote histories differ".to_string(),
                })
            }
        };

        self.validate_site()?;
        let report = self.report(&git, action)?;
        Ok((git, report))
    }

    /// Clone when no checkout exists; otherwise leave it as it is.
    pub fn ensure_present(&self) -> Result<Git, SyncError> {
        match self.open_existing()? {
            Some(git) => Ok(git),
            None => self.clone_fresh().map(|(git, _)| git),
        }
    }

    /// Discard the checkout and generated output, then clone again.
    ///
    /// Uncommitted and unpushed work is lost.
    pub fn reset_hard(&self) -> Result<(Git, SyncReport), SyncError> {
        for dir in [self.paths.checkout_dir(), self.paths.output_dir()] {
            if dir.exists() {
                debug!(path = %dir.display(), "removing");
                fs::remove_dir_all(&dir).map_err(|source| SyncError::Io { path: dir, source })?;
            }
        }
        self.clone_fresh()
    }

    fn open_existing(&self) -> Result<Option<Git>, SyncError> {
        if !self.paths.has_checkout() {
            return Ok(None);
        }
        match Git::open(&self.paths.checkout_dir()) {
            Ok(git) => Ok(Some(git)),
            Err(GitError::NotARepo { .. }) | Err(GitError::BareRepo) => {
                warn!("checkout is unreadable, cloning again");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn clone_fresh(&self) -> Result<(Git, SyncReport), SyncError> {
        let checkout = self.paths.checkout_dir();
        if checkout.exists() {
            warn!(path = %checkout.display(), "removing leftover directory");
            fs::remove_dir_all(&checkout).map_err(|source| SyncError::Io {
                path: checkout.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&self.paths.root).map_err(|source| SyncError::Io {
            path: self.paths.root.clone(),
            source,
        })?;

        info!(branch = self.branch.as_str(), "cloning working copy");
        let git = Git::clone_branch(&self.remote_url, &self.branch, &checkout, &self.remote)
            .map_err(|e| self.missing_branch(e))?;

        self.validate_site()?;
        let report = self.report(&git, SyncAction::Cloned)?;
        Ok((git, report))
    }

    fn check_remote(&self, git: &Git) -> Result<(), SyncError> {
        match git.remote_url(REMOTE)? {
            Some(url) if url == self.remote_url => Ok(()),
            other => Err(SyncError::Diverged {
                branch: self.branch.to_string(),
                reason: match other {
                    Some(url) => format!("checkout was cloned from {}", url),
                    None => "checkout has no origin remote".to_string(),
                },
            }),
        }
    }

    fn validate_site(&self) -> Result<(), SyncError> {
        site::check_layout(&self.paths.checkout_dir(), self.paths.content_dir_name())
            .map_err(SyncError::InvalidSite)
    }

    fn report(&self, git: &Git, action: SyncAction) -> Result<SyncReport, SyncError> {
        Ok(SyncReport {
            branch: self.branch.clone(),
            head: git.head_oid()?,
            action,
            pending_changes: git.worktree_status()?.pending(),
        })
    }

    fn missing_branch(&self, err: GitError) -> SyncError {
        match err {
            GitError::RefNotFound { .. } => SyncError::MissingBranch(self.branch.to_string()),
            other => other.into(),
        }
    }

    fn blocked(&self, err: GitError) -> SyncError {
        match err {
            GitError::Conflict { message } => SyncError::Diverged {
                branch: self.branch.to_string(),
                reason: message,
            },
            other => other.into(),
        }
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Normalize a path to an existing or future document.
    ///
    /// Applies the structural rules only; see [`validate_path`](Self::validate_path)
    /// for paths of new documents.
    pub fn content_path(&self, candidate: &str) -> Result<ContentPath, WorkspaceError> {
        ContentPath::new(candidate).map_err(|e| match e {
            TypeError::InvalidContentPath(reason) => WorkspaceError::InvalidPath(reason),
            other => WorkspaceError::InvalidPath(other.to_string()),
        })
    }

    /// Validate the path of a document about to be created.
    ///
    /// Adds the configured pattern, matched against the path without `.md`.
    pub fn validate_path(&self, candidate: &str) -> Result<ContentPath, WorkspaceError> {
        let path = self.content_path(candidate)?;

        if let Some(rule) = &self.path_rule {
            if !rule.pattern.is_match(path.stem()) {
                let mut reason = format!("'{}' is not an allowed location", path.stem());
                if let Some(hint) = &rule.hint {
                    reason.push_str(": ");
                    reason.push_str(hint);
                }
                return Err(WorkspaceError::InvalidPath(reason));
            }
        }

        Ok(path)
    }

    /// Absolute location of a document.
    pub fn document_path(&self, path: &ContentPath) -> PathBuf {
        path.to_path(&self.paths.content_dir())
    }

    /// Whether a document exists.
    pub fn exists(&self, path: &ContentPath) -> bool {
        self.document_path(path).is_file()
    }

    /// Find the document served at a site URL.
    pub fn resolve_url(&self, url_path: &str) -> Option<ContentPath> {
        site::url_candidates(url_path)
            .into_iter()
            .find(|candidate| self.exists(candidate))
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Reject a document path that passes through a symbolic link.
    ///
    /// Checks the content directory, each directory below it that exists,
    /// and the file itself.
    fn check_no_links(&self, path: &ContentPath) -> Result<(), WorkspaceError> {
        let content_dir = self.paths.content_dir();
        let target = self.document_path(path);
        let relative = target
            .strip_prefix(&content_dir)
            .map_err(|_| WorkspaceError::InvalidPath(path.to_string()))?;

        let mut current = content_dir.clone();
        let mut segments = relative.components();
        loop {
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    warn!(
                        path = %path,
                        link = %current.display(),
                        "symbolic link in document path"
                    );
                    return Err(WorkspaceError::InvalidPath(format!(
                        "'{}' passes through a symbolic link",
                        path
                    )));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(source) => {
                    return Err(WorkspaceError::Io {
                        action: "inspect",
                        path: current,
                        source,
                    })
                }
            }
            match segments.next() {
                Some(segment) => current.push(segment),
                None => return Ok(()),
            }
        }
    }

    /// Whether `dir` resolves to a location inside the content tree.
    fn resolves_into_content(&self, dir: &Path) -> io::Result<bool> {
        let real_content = fs::canonicalize(self.paths.content_dir())?;
        Ok(fs::canonicalize(dir)?.starts_with(real_content))
    }

    /// Read and parse a document.
    ///
    /// Paths through symbolic links are refused.
    pub fn read_document(&self, path: &ContentPath) -> Result<ContentDocument, WorkspaceError> {
        self.check_no_links(path)?;
        let file = self.document_path(path);
        let raw = match fs::read_to_string(&file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WorkspaceError::NotFound(path.to_string()))
            }
            Err(source) => {
                return Err(WorkspaceError::Io {
                    action: "read",
                    path: file,
                    source,
                })
            }
        };

        content::parse(&raw).map_err(|source| WorkspaceError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Atomically replace (or create) a document.
    ///
    /// The new text goes to a temporary file beside the target and is
    /// renamed over it, so readers see the old or the new document, never a
    /// mix. Parent directories are created as needed. Paths through
    /// symbolic links are refused, so nothing is written outside the
    /// content tree.
    pub fn write_document(
        &self,
        path: &ContentPath,
        doc: &ContentDocument,
    ) -> Result<(), WorkspaceError> {
        let target = self.document_path(path);
        if !self.paths.is_in_content(&target) {
            return Err(WorkspaceError::InvalidPath(path.to_string()));
        }
        self.check_no_links(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| WorkspaceError::InvalidPath(path.to_string()))?
            .to_path_buf();
        let io_err = |action: &'static str, path: PathBuf| {
            move |source: io::Error| WorkspaceError::Io {
                action,
                path,
                source,
            }
        };

        fs::create_dir_all(&parent).map_err(io_err("create", parent.clone()))?;
        if !self
            .resolves_into_content(&parent)
            .map_err(io_err("resolve", parent.clone()))?
        {
            return Err(WorkspaceError::InvalidPath(format!(
                "'{}' resolves outside the content directory",
                path
            )));
        }

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(io_err("create", parent.clone()))?;
        let permissions = match fs::metadata(&target) {
            Ok(meta) => Some(meta.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            temp.as_file()
                .set_permissions(permissions)
                .map_err(io_err("write", target.clone()))?;
        }

        temp.write_all(content::serialize(doc).as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(io_err("write", target.clone()))?;
        temp.persist(&target)
            .map_err(|e| io_err("write", target.clone())(e.error))?;

        debug!(path = %path, "document written");
        Ok(())
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
